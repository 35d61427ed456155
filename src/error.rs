//! Error types for the stopwatch.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// The display could not be set up for the stopwatch.
    #[error("initialization failed: {0}")]
    Init(String),

    /// A duration that cannot be rendered as a clock readout.
    #[error("invalid duration: {0} ms")]
    InvalidDuration(f64),

    /// I/O error while reading or writing the snapshot file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot could not be serialized or parsed.
    #[error("snapshot encoding error: {0}")]
    Snapshot(#[from] serde_json::Error),

    /// Snapshot parsed but holds values that cannot be restored.
    #[error("corrupt snapshot: {0}")]
    CorruptSnapshot(String),

    /// Snapshot is older than the staleness window.
    #[error("snapshot is stale ({age_ms} ms old)")]
    StaleSnapshot { age_ms: i64 },

    /// In-memory store configured to refuse writes.
    #[cfg(test)]
    #[error("store unavailable")]
    StoreUnavailable,
}

pub type Result<T> = std::result::Result<T, Error>;

//! Terminal stopwatch with lap times, persisted state and focus resync.
//!
//! Timing and lap bookkeeping live in `timer-core`; this crate wires them to
//! a clock, a snapshot store, a refresh pump and a ratatui front end.

pub mod alerts;
pub mod app;
pub mod clock;
pub mod config;
pub mod error;
pub mod input;
pub mod pump;
pub mod stopwatch;
pub mod storage;
pub mod ui;

pub use app::StopwatchApp;
pub use clock::{Clock, SystemClock};
pub use config::Config;
pub use error::{Error, Result};
pub use pump::{Pump, Refresh};
pub use stopwatch::{Control, StopwatchController, Surfaces};
pub use storage::{FileStore, PersistedSnapshot, SnapshotStore};

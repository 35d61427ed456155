//! Runtime configuration.

use std::path::PathBuf;
use std::time::Duration;

const APP_DIR: &str = "stopwatch";
const STATE_FILE: &str = "stopwatch-state.json";
const LOG_FILE: &str = "stopwatch.log";

/// Snapshots older than this are discarded on restore.
pub const DEFAULT_STALENESS: Duration = Duration::from_millis(86_400_000);

#[derive(Debug, Clone)]
pub struct Config {
    /// File holding the persisted snapshot.
    pub state_path: PathBuf,
    /// File receiving log output.
    pub log_path: PathBuf,
    /// Display refresh cadence while running.
    pub refresh_interval: Duration,
    /// Maximum snapshot age accepted by restore.
    pub staleness: Duration,
    /// How long an error banner stays visible.
    pub banner_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        let dir = data_dir();
        Self {
            state_path: dir.join(STATE_FILE),
            log_path: dir.join(LOG_FILE),
            refresh_interval: Duration::from_millis(50),
            staleness: DEFAULT_STALENESS,
            banner_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by `STOPWATCH_STATE_FILE`, `STOPWATCH_LOG` and
    /// `STOPWATCH_REFRESH_MS`.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Log file location alone, so logging can start before the rest of the
    /// environment is parsed.
    #[must_use]
    pub fn log_path_from_env() -> PathBuf {
        log_path_from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(path) = var("STOPWATCH_STATE_FILE").filter(|p| !p.is_empty()) {
            config.state_path = PathBuf::from(path);
        }
        config.log_path = log_path_from_vars(&var);
        if let Some(raw) = var("STOPWATCH_REFRESH_MS") {
            match raw.parse::<u64>() {
                Ok(ms) if ms > 0 => config.refresh_interval = Duration::from_millis(ms),
                _ => log::warn!("Ignoring STOPWATCH_REFRESH_MS={raw:?}"),
            }
        }
        config
    }

    #[must_use]
    pub fn with_state_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.state_path = path.into();
        self
    }

    #[must_use]
    pub const fn with_refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = interval;
        self
    }

    #[must_use]
    pub const fn with_staleness(mut self, staleness: Duration) -> Self {
        self.staleness = staleness;
        self
    }

    #[must_use]
    pub const fn with_banner_timeout(mut self, timeout: Duration) -> Self {
        self.banner_timeout = timeout;
        self
    }
}

fn log_path_from_vars(var: impl Fn(&str) -> Option<String>) -> PathBuf {
    var("STOPWATCH_LOG")
        .filter(|p| !p.is_empty())
        .map_or_else(|| data_dir().join(LOG_FILE), PathBuf::from)
}

/// `$XDG_DATA_HOME/stopwatch`, or `./stopwatch` when no data dir is known.
fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR)
}

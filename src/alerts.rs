use std::time::Duration;

/// Transient error message shown on top of the stopwatch.
#[derive(Clone, Debug, Default)]
pub struct ErrorBanner {
    message: Option<String>,
    shown_at_ms: f64,
}

impl ErrorBanner {
    pub fn show(&mut self, message: &str, now_ms: f64) {
        self.message = Some(message.to_string());
        self.shown_at_ms = now_ms;
    }

    /// Drops the message once `timeout` has passed. Returns true if it was dismissed.
    pub fn expire(&mut self, now_ms: f64, timeout: Duration) -> bool {
        if self.message.is_some() && now_ms - self.shown_at_ms >= timeout.as_secs_f64() * 1000.0 {
            self.message = None;
            return true;
        }
        false
    }

    pub fn dismiss(&mut self) {
        self.message = None;
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Time left before the banner disappears.
    pub fn remaining(&self, now_ms: f64, timeout: Duration) -> Option<Duration> {
        self.message.as_ref()?;
        let left = timeout.as_secs_f64() * 1000.0 - (now_ms - self.shown_at_ms);
        Some(Duration::from_secs_f64(left.max(0.0) / 1000.0))
    }
}

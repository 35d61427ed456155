//! Pure timing logic library with no platform dependencies.
//! Times are milliseconds as `f64`; callers supply the clock.

/// Readout used whenever a duration cannot be formatted.
pub const ZERO_DISPLAY: &str = "00:00:00.00";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    Stopped,
    Running,
}

pub struct TimerCore {
    pub state: TimerState,
    elapsed_ms: f64,
    start_ref_ms: f64,
}

impl Default for TimerCore {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerCore {
    pub fn new() -> Self {
        Self {
            state: TimerState::Stopped,
            elapsed_ms: 0.0,
            start_ref_ms: 0.0,
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn start(&mut self, now_ms: f64) {
        if self.is_running() {
            return;
        }
        self.start_ref_ms = now_ms - self.elapsed_ms;
        self.state = TimerState::Running;
    }

    /// Freezes elapsed time at `now_ms`.
    pub fn stop(&mut self, now_ms: f64) {
        if !self.is_running() {
            return;
        }
        self.tick(now_ms);
        self.state = TimerState::Stopped;
    }

    pub fn reset(&mut self) {
        self.elapsed_ms = 0.0;
        self.start_ref_ms = 0.0;
        self.state = TimerState::Stopped;
    }

    /// Brings the stored elapsed time up to `now_ms` while running.
    pub fn tick(&mut self, now_ms: f64) -> f64 {
        if self.is_running() {
            self.elapsed_ms = (now_ms - self.start_ref_ms).max(0.0);
        }
        self.elapsed_ms
    }

    /// Last computed elapsed time; frozen while stopped.
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed_ms
    }

    /// Reference point such that `now - start_ref == elapsed`. Only meaningful while running.
    pub fn start_ref_ms(&self) -> Option<f64> {
        self.is_running().then_some(self.start_ref_ms)
    }

    /// Replaces the timer with a previously saved value. A running timer is
    /// re-anchored so that `elapsed_ms` is current at `now_ms`.
    pub fn restore(&mut self, elapsed_ms: f64, running: bool, now_ms: f64) {
        self.elapsed_ms = elapsed_ms.max(0.0);
        if running {
            self.start_ref_ms = now_ms - self.elapsed_ms;
            self.state = TimerState::Running;
        } else {
            self.start_ref_ms = 0.0;
            self.state = TimerState::Stopped;
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LapRecord {
    pub number: u32,
    pub split_ms: f64,
    pub total_ms: f64,
}

pub struct LapLog {
    laps: Vec<LapRecord>,
    next_number: u32,
}

impl Default for LapLog {
    fn default() -> Self {
        Self::new()
    }
}

impl LapLog {
    pub fn new() -> Self {
        Self {
            laps: Vec::new(),
            next_number: 1,
        }
    }

    /// Appends a lap ending at `total_ms`. The split is measured from the previous lap.
    pub fn record(&mut self, total_ms: f64) -> &LapRecord {
        let previous = self.laps.last().map_or(0.0, |lap| lap.total_ms);
        let total_ms = total_ms.max(previous);
        self.laps.push(LapRecord {
            number: self.next_number,
            split_ms: total_ms - previous,
            total_ms,
        });
        self.next_number += 1;
        &self.laps[self.laps.len() - 1]
    }

    pub fn clear(&mut self) {
        self.laps.clear();
        self.next_number = 1;
    }

    /// Replaces the log. The counter never falls behind the last lap number.
    pub fn restore(&mut self, laps: Vec<LapRecord>, next_number: u32) {
        let floor = laps.last().map_or(1, |lap| lap.number.saturating_add(1));
        self.laps = laps;
        self.next_number = next_number.max(floor);
    }

    pub fn laps(&self) -> &[LapRecord] {
        &self.laps
    }

    pub fn next_number(&self) -> u32 {
        self.next_number
    }

    pub fn is_empty(&self) -> bool {
        self.laps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.laps.len()
    }
}

/// Format milliseconds as "HH:MM:SS.cs" (centiseconds).
///
/// Returns `None` for non-finite or negative input.
pub fn format_hms_cs(ms: f64) -> Option<String> {
    if !ms.is_finite() || ms < 0.0 {
        return None;
    }
    let ms = ms.floor() as u64;
    let total_secs = ms / 1000;
    let cs = (ms % 1000) / 10;
    let h = total_secs / 3600;
    let m = (total_secs % 3600) / 60;
    let s = total_secs % 60;
    Some(format!("{:02}:{:02}:{:02}.{:02}", h, m, s, cs))
}

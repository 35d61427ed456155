#[cfg(test)]
use std::cell::Cell;
#[cfg(test)]
use std::rc::Rc;
use std::time::Instant;

/// Time sources for the stopwatch.
///
/// `now_ms` is monotonic and drives the running timer. `wall_ms` is epoch
/// milliseconds and stamps snapshots so they can be aged across restarts.
pub trait Clock {
    fn now_ms(&self) -> f64;
    fn wall_ms(&self) -> i64;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        self.origin.elapsed().as_secs_f64() * 1000.0
    }

    fn wall_ms(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Hand-driven clock; clones share the same time.
#[cfg(test)]
#[derive(Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<f64>>,
    wall: Rc<Cell<i64>>,
}

#[cfg(test)]
impl ManualClock {
    pub fn at_wall(wall_ms: i64) -> Self {
        let clock = Self::default();
        clock.wall.set(wall_ms);
        clock
    }

    /// Moves both clocks forward.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get() + f64::from(ms));
        self.wall.set(self.wall.get() + i64::from(ms));
    }

    /// Moves only the wall clock, like a process that was not running.
    pub fn advance_wall(&self, ms: i64) {
        self.wall.set(self.wall.get() + ms);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now_ms(&self) -> f64 {
        self.now.get()
    }

    fn wall_ms(&self) -> i64 {
        self.wall.get()
    }
}

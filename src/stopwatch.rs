//! The stopwatch controller: timer state, lap history, persistence and the
//! display surfaces the terminal renders.

use std::time::Duration;

use timer_core::{format_hms_cs, LapLog, LapRecord, TimerCore, TimerState, ZERO_DISPLAY};

use crate::alerts::ErrorBanner;
use crate::clock::Clock;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::pump::Refresh;
use crate::storage::{PersistedSnapshot, SavedLap, SnapshotStore};

/// Clickable controls.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Control {
    StartStop,
    Reset,
    Lap,
    ClearLaps,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ButtonState {
    pub label: &'static str,
    pub accessible_name: &'static str,
    pub enabled: bool,
    pub visible: bool,
}

impl ButtonState {
    const fn new(label: &'static str, accessible_name: &'static str, enabled: bool) -> Self {
        Self {
            label,
            accessible_name,
            enabled,
            visible: true,
        }
    }
}

/// What the rendering layer shows.
#[derive(Clone, Debug)]
pub struct Surfaces {
    pub readout: String,
    pub start_stop: ButtonState,
    pub reset: ButtonState,
    pub lap: ButtonState,
    pub clear_laps: ButtonState,
    /// Rendered lap rows, oldest first.
    pub lap_rows: Vec<String>,
    /// Rows skipped from the newest end when drawing.
    pub lap_scroll_offset: usize,
    pub banner: ErrorBanner,
}

impl Default for Surfaces {
    fn default() -> Self {
        let mut clear_laps = ButtonState::new("Clear laps", "Clear lap times", true);
        clear_laps.visible = false;
        Self {
            readout: ZERO_DISPLAY.to_string(),
            start_stop: ButtonState::new("Start", "Start timer", true),
            reset: ButtonState::new("Reset", "Reset timer", false),
            lap: ButtonState::new("Lap", "Record lap", false),
            clear_laps,
            lap_rows: Vec::new(),
            lap_scroll_offset: 0,
            banner: ErrorBanner::default(),
        }
    }
}

impl Surfaces {
    pub fn button(&self, control: Control) -> &ButtonState {
        match control {
            Control::StartStop => &self.start_stop,
            Control::Reset => &self.reset,
            Control::Lap => &self.lap,
            Control::ClearLaps => &self.clear_laps,
        }
    }
}

pub struct StopwatchController<C, S, R> {
    timer: TimerCore,
    laps: LapLog,
    clock: C,
    store: S,
    refresh: R,
    surfaces: Surfaces,
    staleness: Duration,
    banner_timeout: Duration,
    hidden: bool,
    last_persist_ok: bool,
}

impl<C: Clock, S: SnapshotStore, R: Refresh> StopwatchController<C, S, R> {
    pub fn new(clock: C, store: S, refresh: R, config: &Config) -> Self {
        Self {
            timer: TimerCore::new(),
            laps: LapLog::new(),
            clock,
            store,
            refresh,
            surfaces: Surfaces::default(),
            staleness: config.staleness,
            banner_timeout: config.banner_timeout,
            hidden: false,
            last_persist_ok: true,
        }
    }

    pub fn state(&self) -> TimerState {
        self.timer.state
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.timer.elapsed_ms()
    }

    pub fn laps(&self) -> &[LapRecord] {
        self.laps.laps()
    }

    pub fn next_lap_number(&self) -> u32 {
        self.laps.next_number()
    }

    pub fn surfaces(&self) -> &Surfaces {
        &self.surfaces
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn refresh(&self) -> &R {
        &self.refresh
    }

    pub fn toggle_running(&mut self) {
        let now = self.clock.now_ms();
        if self.timer.is_running() {
            self.timer.stop(now);
            self.refresh.cancel();
            log::info!("Stopwatch stopped at {:.0} ms", self.timer.elapsed_ms());
        } else {
            self.timer.start(now);
            if !self.hidden {
                self.refresh.start();
            }
            log::info!("Stopwatch started from {:.0} ms", self.timer.elapsed_ms());
        }
        self.render_readout();
        self.render_controls();
        self.persist();
    }

    pub fn reset(&mut self) {
        self.refresh.cancel();
        self.timer.reset();
        self.laps.clear();
        self.render_readout();
        self.render_laps();
        self.render_controls();
        self.persist();
    }

    pub fn record_lap(&mut self) {
        if !self.timer.is_running() {
            return;
        }
        let total = self.timer.tick(self.clock.now_ms());
        let lap = self.laps.record(total).clone();
        log::debug!("Lap {} recorded at {:.0} ms", lap.number, lap.total_ms);
        let row = self.lap_row(&lap);
        self.surfaces.lap_rows.push(row);
        self.surfaces.lap_scroll_offset = 0;
        self.render_controls();
        self.persist();
    }

    pub fn clear_laps(&mut self) {
        self.laps.clear();
        self.render_laps();
        self.render_controls();
        self.persist();
    }

    /// A click on a control; disabled or hidden controls ignore it.
    pub fn click(&mut self, control: Control) {
        let button = self.surfaces.button(control);
        if !button.enabled || !button.visible {
            return;
        }
        match control {
            Control::StartStop => self.toggle_running(),
            Control::Reset => self.reset(),
            Control::Lap => self.record_lap(),
            Control::ClearLaps => self.clear_laps(),
        }
    }

    /// Pump tick. Ticks from a cancelled refresh generation are dropped.
    pub fn on_tick(&mut self, generation: u64) {
        if !self.refresh.is_active() || generation != self.refresh.generation() {
            return;
        }
        self.refresh_display();
    }

    pub fn refresh_display(&mut self) {
        if !self.timer.is_running() {
            self.refresh.cancel();
            return;
        }
        self.timer.tick(self.clock.now_ms());
        self.render_readout();
    }

    pub fn format_duration(&mut self, ms: f64) -> String {
        match format_hms_cs(ms) {
            Some(text) => text,
            None => {
                self.report_error(&format!("Time format error: {}", Error::InvalidDuration(ms)));
                ZERO_DISPLAY.to_string()
            }
        }
    }

    /// Saves the current state. Failures are logged and otherwise ignored.
    pub fn persist(&mut self) {
        match self.try_persist() {
            Ok(()) => self.last_persist_ok = true,
            Err(e) => {
                self.last_persist_ok = false;
                log::warn!("Saving stopwatch state failed: {e}");
            }
        }
    }

    fn try_persist(&mut self) -> Result<()> {
        let elapsed = self.timer.tick(self.clock.now_ms());
        let snapshot = PersistedSnapshot {
            elapsed_time: elapsed,
            running: self.timer.is_running(),
            start_time_reference: self.timer.start_ref_ms(),
            laps: self.laps.laps().iter().map(SavedLap::from).collect(),
            lap_counter: self.laps.next_number(),
            saved_at: self.clock.wall_ms(),
        };
        self.store.save(&snapshot.to_json()?)
    }

    /// Loads the saved snapshot, if any, and adopts it. A running snapshot
    /// catches up by the wall-clock time since it was saved.
    pub fn restore(&mut self) {
        let snapshot = match self.load_snapshot() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return,
            Err(Error::StaleSnapshot { age_ms }) => {
                log::info!("Discarding saved state from {age_ms} ms ago");
                self.discard_snapshot();
                return;
            }
            Err(e) => {
                log::warn!("Discarding unreadable saved state: {e}");
                self.discard_snapshot();
                return;
            }
        };

        let now = self.clock.now_ms();
        let gap = snapshot.age_ms(self.clock.wall_ms()).max(0);
        let running = snapshot.running && snapshot.start_time_reference.is_some();

        self.laps.restore(
            snapshot.laps.into_iter().map(LapRecord::from).collect(),
            snapshot.lap_counter,
        );
        if running {
            let caught_up = snapshot.elapsed_time + gap as f64;
            self.timer.restore(caught_up, true, now);
            if !self.hidden {
                self.refresh.start();
            }
            log::info!("Resumed running stopwatch at {caught_up:.0} ms");
        } else {
            self.timer.restore(snapshot.elapsed_time, false, now);
            self.refresh.cancel();
        }

        self.render_readout();
        self.render_laps();
        self.render_controls();
    }

    fn load_snapshot(&self) -> Result<Option<PersistedSnapshot>> {
        let Some(raw) = self.store.load()? else {
            return Ok(None);
        };
        let snapshot = PersistedSnapshot::from_json(&raw)?;
        let age_ms = snapshot.age_ms(self.clock.wall_ms());
        if age_ms > self.staleness.as_millis() as i64 {
            return Err(Error::StaleSnapshot { age_ms });
        }
        Ok(Some(snapshot))
    }

    fn discard_snapshot(&mut self) {
        if let Err(e) = self.store.remove() {
            log::warn!("Removing saved state failed: {e}");
        }
    }

    /// Focus changes of the hosting terminal.
    pub fn handle_visibility_change(&mut self, visible: bool) {
        self.hidden = !visible;
        if !self.timer.is_running() {
            return;
        }
        if visible {
            // A failed save leaves an older snapshot behind; trust the clock then.
            if self.last_persist_ok {
                self.restore();
            }
            // Restore may have discarded the snapshot and kept the in-memory timer.
            if self.timer.is_running() && !self.hidden {
                self.refresh.start();
                self.refresh_display();
            }
        } else {
            self.persist();
            self.refresh.cancel();
        }
    }

    /// Page unload: save and stop refreshing.
    pub fn unload(&mut self) {
        self.persist();
        self.refresh.cancel();
    }

    pub fn report_error(&mut self, message: &str) {
        log::error!("Stopwatch error: {message}");
        self.surfaces.banner.show(message, self.clock.now_ms());
    }

    /// Dismisses an expired banner. Returns true when the display changed.
    pub fn expire_banner(&mut self) -> bool {
        self.surfaces.banner.expire(self.clock.now_ms(), self.banner_timeout)
    }

    pub fn dismiss_banner(&mut self) {
        self.surfaces.banner.dismiss();
    }

    pub fn banner_remaining(&self) -> Option<Duration> {
        self.surfaces.banner.remaining(self.clock.now_ms(), self.banner_timeout)
    }

    /// Scrolls the lap list; positive `delta` moves towards older laps.
    pub fn scroll_laps(&mut self, delta: isize) {
        let max = self.surfaces.lap_rows.len().saturating_sub(1);
        let offset = self.surfaces.lap_scroll_offset.saturating_add_signed(delta);
        self.surfaces.lap_scroll_offset = offset.min(max);
    }

    fn render_readout(&mut self) {
        self.surfaces.readout = self.format_duration(self.timer.elapsed_ms());
    }

    fn render_controls(&mut self) {
        let running = self.timer.is_running();
        self.surfaces.start_stop = if running {
            ButtonState::new("Stop", "Stop timer", true)
        } else {
            ButtonState::new("Start", "Start timer", true)
        };
        self.surfaces.reset.enabled = !running && self.timer.elapsed_ms() > 0.0;
        self.surfaces.lap.enabled = running;
        self.surfaces.clear_laps.visible = !self.laps.is_empty();
    }

    fn render_laps(&mut self) {
        let laps = self.laps.laps().to_vec();
        self.surfaces.lap_rows = laps.iter().map(|lap| self.lap_row(lap)).collect();
        self.surfaces.lap_scroll_offset = 0;
    }

    fn lap_row(&mut self, lap: &LapRecord) -> String {
        let split = self.format_duration(lap.split_ms);
        let total = self.format_duration(lap.total_ms);
        format!("Lap {:>2}  +{}  {}", lap.number, split, total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::pump::RecordingRefresh;
    use crate::storage::MemoryStore;

    const DAY_MS: i64 = 86_400_000;

    type TestController = StopwatchController<ManualClock, MemoryStore, RecordingRefresh>;

    fn controller_with(store: MemoryStore) -> (TestController, ManualClock) {
        let clock = ManualClock::at_wall(1_700_000_000_000);
        let controller = StopwatchController::new(
            clock.clone(),
            store,
            RecordingRefresh::default(),
            &Config::default(),
        );
        (controller, clock)
    }

    fn controller() -> (TestController, ManualClock, MemoryStore) {
        let store = MemoryStore::new();
        let (controller, clock) = controller_with(store.clone());
        (controller, clock, store)
    }

    fn saved(store: &MemoryStore) -> PersistedSnapshot {
        PersistedSnapshot::from_json(&store.contents().unwrap()).unwrap()
    }

    #[test]
    fn initial_state() {
        let (sw, _, store) = controller();
        assert_eq!(sw.state(), TimerState::Stopped);
        assert_eq!(sw.elapsed_ms(), 0.0);
        let s = sw.surfaces();
        assert_eq!(s.readout, "00:00:00.00");
        assert_eq!(s.start_stop.label, "Start");
        assert!(!s.reset.enabled);
        assert!(!s.lap.enabled);
        assert!(!s.clear_laps.visible);
        assert_eq!(store.contents(), None);
    }

    #[test]
    fn start_wait_stop_accumulates() {
        let (mut sw, clock, _) = controller();
        sw.toggle_running();
        assert!(sw.is_running());
        assert!(sw.refresh().active);
        assert_eq!(sw.surfaces().start_stop.label, "Stop");
        assert_eq!(sw.surfaces().start_stop.accessible_name, "Stop timer");
        assert!(sw.surfaces().lap.enabled);
        assert!(!sw.surfaces().reset.enabled);

        clock.advance(1_500);
        sw.toggle_running();
        assert!(!sw.is_running());
        assert!(!sw.refresh().active);
        assert_eq!(sw.elapsed_ms(), 1_500.0);
        assert_eq!(sw.surfaces().readout, "00:00:01.50");
        assert!(sw.surfaces().reset.enabled);
        assert!(!sw.surfaces().lap.enabled);

        // Paused time does not count.
        clock.advance(10_000);
        sw.toggle_running();
        clock.advance(500);
        sw.toggle_running();
        assert_eq!(sw.elapsed_ms(), 2_000.0);
    }

    #[test]
    fn refresh_updates_readout_while_running() {
        let (mut sw, clock, _) = controller();
        sw.toggle_running();
        clock.advance(61_230);
        sw.refresh_display();
        assert_eq!(sw.surfaces().readout, "00:01:01.23");
    }

    #[test]
    fn stale_ticks_are_ignored() {
        let (mut sw, clock, _) = controller();
        sw.toggle_running();
        let first_generation = sw.refresh().generation;
        clock.advance(1_000);
        sw.toggle_running();
        sw.toggle_running();
        clock.advance(1_000);

        sw.on_tick(first_generation);
        assert_eq!(sw.surfaces().readout, "00:00:01.00");

        sw.on_tick(sw.refresh().generation);
        assert_eq!(sw.surfaces().readout, "00:00:02.00");

        sw.toggle_running();
        clock.advance(1_000);
        sw.on_tick(sw.refresh().generation);
        assert_eq!(sw.elapsed_ms(), 2_000.0);
    }

    #[test]
    fn every_action_persists() {
        let (mut sw, clock, store) = controller();
        sw.toggle_running();
        assert_eq!(store.writes(), 1);
        assert!(saved(&store).running);
        clock.advance(100);
        sw.record_lap();
        assert_eq!(store.writes(), 2);
        sw.clear_laps();
        assert_eq!(store.writes(), 3);
        sw.reset();
        assert_eq!(store.writes(), 4);
        let snapshot = saved(&store);
        assert!(!snapshot.running);
        assert_eq!(snapshot.start_time_reference, None);
        assert_eq!(snapshot.elapsed_time, 0.0);
    }

    #[test]
    fn laps_chain_splits() {
        let (mut sw, clock, store) = controller();
        sw.toggle_running();
        for gap in [1_000, 2_500, 300] {
            clock.advance(gap);
            sw.record_lap();
        }

        let laps = sw.laps();
        assert_eq!(laps.len(), 3);
        let mut previous = 0.0;
        for (i, lap) in laps.iter().enumerate() {
            assert_eq!(lap.number as usize, i + 1);
            assert_eq!(lap.split_ms + previous, lap.total_ms);
            previous = lap.total_ms;
        }
        assert_eq!(laps[1].split_ms, 2_500.0);
        assert_eq!(sw.surfaces().lap_rows[1], "Lap  2  +00:00:02.50  00:00:03.50");
        assert!(sw.surfaces().clear_laps.visible);
        assert_eq!(saved(&store).lap_counter, 4);
    }

    #[test]
    fn lap_while_stopped_does_nothing() {
        let (mut sw, clock, store) = controller();
        sw.record_lap();
        assert!(sw.laps().is_empty());
        assert_eq!(store.writes(), 0);

        sw.toggle_running();
        clock.advance(100);
        sw.toggle_running();
        let writes = store.writes();
        sw.record_lap();
        sw.click(Control::Lap);
        assert!(sw.laps().is_empty());
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn clear_laps_restarts_numbering() {
        let (mut sw, clock, _) = controller();
        sw.toggle_running();
        clock.advance(10);
        sw.record_lap();
        sw.record_lap();
        sw.clear_laps();
        assert!(sw.laps().is_empty());
        assert!(sw.surfaces().lap_rows.is_empty());
        assert!(!sw.surfaces().clear_laps.visible);
        assert!(sw.is_running());
        clock.advance(10);
        sw.record_lap();
        assert_eq!(sw.laps()[0].number, 1);
        assert_eq!(sw.laps()[0].total_ms, 20.0);
    }

    #[test]
    fn reset_is_idempotent() {
        let (mut sw, clock, _) = controller();
        sw.toggle_running();
        clock.advance(700);
        sw.record_lap();
        sw.reset();
        let once = (sw.state(), sw.elapsed_ms(), sw.laps().len(), sw.next_lap_number());
        sw.reset();
        let twice = (sw.state(), sw.elapsed_ms(), sw.laps().len(), sw.next_lap_number());
        assert_eq!(once, (TimerState::Stopped, 0.0, 0, 1));
        assert_eq!(once, twice);
        assert!(!sw.refresh().active);
        assert_eq!(sw.surfaces().readout, "00:00:00.00");
        assert!(!sw.surfaces().reset.enabled);
        assert!(!sw.surfaces().lap.enabled);
    }

    #[test]
    fn disabled_controls_ignore_clicks() {
        let (mut sw, clock, _) = controller();
        sw.click(Control::Reset);
        sw.click(Control::ClearLaps);
        assert_eq!(sw.refresh().cancels, 0);

        sw.click(Control::StartStop);
        clock.advance(300);
        sw.click(Control::Reset);
        assert!(sw.is_running());
        sw.click(Control::Lap);
        assert_eq!(sw.laps().len(), 1);
        sw.click(Control::StartStop);
        sw.click(Control::Reset);
        assert_eq!(sw.elapsed_ms(), 0.0);
        assert!(sw.laps().is_empty());
    }

    #[test]
    fn persist_failure_is_not_fatal() {
        let (mut sw, clock, store) = controller();
        store.set_fail_writes(true);
        sw.toggle_running();
        clock.advance(50);
        sw.record_lap();
        assert!(sw.is_running());
        assert_eq!(sw.laps().len(), 1);
        assert_eq!(sw.surfaces().banner.message(), None);
        assert_eq!(store.contents(), None);
    }

    #[test]
    fn restore_running_snapshot_catches_up() {
        let store = MemoryStore::new();
        let (mut first, clock) = controller_with(store.clone());
        first.toggle_running();
        clock.advance(1_000);
        first.record_lap();
        clock.advance(2_000);
        first.unload();

        // Saved 3 s after the shared start; reopened 5 s later.
        let (mut second, clock2) = controller_with(store.clone());
        clock2.advance_wall(3_000 + 5_000);
        second.restore();

        assert!(second.is_running());
        assert!(second.refresh().active);
        assert_eq!(second.elapsed_ms(), 8_000.0);
        assert_eq!(second.laps(), first.laps());
        assert_eq!(second.next_lap_number(), 2);
        assert_eq!(second.surfaces().readout, "00:00:08.00");
        assert_eq!(second.surfaces().lap_rows, first.surfaces().lap_rows);

        clock2.advance(500);
        second.refresh_display();
        assert_eq!(second.elapsed_ms(), 8_500.0);
    }

    #[test]
    fn restore_stopped_snapshot_keeps_frozen_time() {
        let store = MemoryStore::new();
        let (mut first, clock) = controller_with(store.clone());
        first.toggle_running();
        clock.advance(4_200);
        first.toggle_running();

        let (mut second, clock2) = controller_with(store);
        clock2.advance_wall(60_000);
        second.restore();
        assert!(!second.is_running());
        assert!(!second.refresh().active);
        assert_eq!(second.elapsed_ms(), 4_200.0);
        assert_eq!(second.surfaces().readout, "00:00:04.20");
        assert!(second.surfaces().reset.enabled);
    }

    #[test]
    fn stale_snapshot_is_discarded() {
        let store = MemoryStore::new();
        let (mut first, clock) = controller_with(store.clone());
        first.toggle_running();
        clock.advance(1_000);
        first.record_lap();
        first.unload();

        let (mut second, clock2) = controller_with(store.clone());
        clock2.advance_wall(1_000 + DAY_MS + 1);
        second.restore();
        assert!(!second.is_running());
        assert_eq!(second.elapsed_ms(), 0.0);
        assert!(second.laps().is_empty());
        assert_eq!(store.contents(), None);
    }

    #[test]
    fn snapshot_exactly_at_window_is_kept() {
        let store = MemoryStore::new();
        let (mut first, clock) = controller_with(store.clone());
        first.toggle_running();
        clock.advance(1_000);
        first.toggle_running();

        let (mut second, clock2) = controller_with(store);
        clock2.advance_wall(1_000 + DAY_MS);
        second.restore();
        assert_eq!(second.elapsed_ms(), 1_000.0);
    }

    #[test]
    fn corrupt_snapshot_falls_back_to_defaults() {
        let store = MemoryStore::with_contents("{\"elapsedTime\": ");
        let (mut sw, _) = controller_with(store.clone());
        sw.restore();
        assert_eq!(sw.state(), TimerState::Stopped);
        assert_eq!(sw.elapsed_ms(), 0.0);
        assert_eq!(store.contents(), None);
        assert_eq!(sw.surfaces().banner.message(), None);
    }

    #[test]
    fn restore_without_snapshot_is_noop() {
        let (mut sw, _, store) = controller();
        sw.restore();
        assert_eq!(sw.elapsed_ms(), 0.0);
        assert_eq!(store.writes(), 0);
    }

    #[test]
    fn running_flag_without_reference_restores_stopped() {
        let raw = r#"{"elapsedTime": 900, "running": true, "startTimeReference": null,
                      "savedAt": 1700000000000}"#;
        let (mut sw, _) = controller_with(MemoryStore::with_contents(raw));
        sw.restore();
        assert!(!sw.is_running());
        assert_eq!(sw.elapsed_ms(), 900.0);
    }

    #[test]
    fn hidden_then_visible_resyncs() {
        let (mut sw, clock, store) = controller();
        sw.toggle_running();
        clock.advance(1_000);
        sw.record_lap();

        sw.handle_visibility_change(false);
        assert!(sw.is_hidden());
        assert!(!sw.refresh().active);
        assert_eq!(saved(&store).elapsed_time, 1_000.0);

        clock.advance(30_000);
        sw.handle_visibility_change(true);
        assert!(sw.refresh().active);
        assert_eq!(sw.elapsed_ms(), 31_000.0);
        assert_eq!(sw.laps().len(), 1);
        assert_eq!(sw.surfaces().lap_rows.len(), 1);
        assert_eq!(sw.surfaces().readout, "00:00:31.00");
    }

    #[test]
    fn resync_with_stale_snapshot_keeps_running() {
        let (mut sw, clock, store) = controller();
        sw.toggle_running();
        clock.advance(1_000);
        sw.handle_visibility_change(false);

        // Suspended long enough for the saved snapshot to expire.
        clock.advance_wall(DAY_MS + 1);
        clock.advance(2_000);
        sw.handle_visibility_change(true);

        assert!(sw.is_running());
        assert!(sw.refresh().active);
        assert_eq!(store.contents(), None);
        assert_eq!(sw.elapsed_ms(), 3_000.0);
        assert_eq!(sw.surfaces().readout, "00:00:03.00");

        clock.advance(500);
        sw.on_tick(sw.refresh().generation);
        assert_eq!(sw.surfaces().readout, "00:00:03.50");
    }

    #[test]
    fn resync_with_corrupt_snapshot_keeps_running() {
        let (mut sw, clock, store) = controller();
        sw.toggle_running();
        clock.advance(1_000);
        sw.record_lap();
        sw.handle_visibility_change(false);

        let mut other_writer = store.clone();
        other_writer.save("{garbage").unwrap();
        clock.advance(1_000);
        sw.handle_visibility_change(true);

        assert!(sw.is_running());
        assert!(sw.refresh().active);
        assert_eq!(store.contents(), None);
        assert_eq!(sw.laps().len(), 1);
        assert_eq!(sw.elapsed_ms(), 2_000.0);

        clock.advance(250);
        sw.on_tick(sw.refresh().generation);
        assert_eq!(sw.surfaces().readout, "00:00:02.25");
    }

    #[test]
    fn banner_can_be_dismissed() {
        let (mut sw, _, _) = controller();
        sw.report_error("Display update error");
        assert!(sw.surfaces().banner.message().is_some());
        sw.dismiss_banner();
        assert_eq!(sw.surfaces().banner.message(), None);
        assert_eq!(sw.banner_remaining(), None);
    }

    #[test]
    fn visibility_while_stopped_only_tracks_focus() {
        let (mut sw, _, store) = controller();
        sw.handle_visibility_change(false);
        assert!(sw.is_hidden());
        sw.handle_visibility_change(true);
        assert!(!sw.is_hidden());
        assert_eq!(store.writes(), 0);
        assert_eq!(sw.refresh().starts, 0);
    }

    #[test]
    fn start_while_hidden_defers_refresh() {
        let (mut sw, clock, _) = controller();
        sw.handle_visibility_change(false);
        sw.toggle_running();
        assert!(!sw.refresh().active);
        clock.advance(2_000);
        sw.handle_visibility_change(true);
        assert!(sw.refresh().active);
        assert_eq!(sw.elapsed_ms(), 2_000.0);
    }

    #[test]
    fn resync_after_failed_persist_uses_clock() {
        let (mut sw, clock, store) = controller();
        sw.toggle_running();
        clock.advance(1_000);
        store.set_fail_writes(true);
        sw.record_lap();
        sw.handle_visibility_change(false);
        clock.advance(1_000);
        sw.handle_visibility_change(true);
        assert_eq!(sw.laps().len(), 1);
        assert_eq!(sw.elapsed_ms(), 2_000.0);
        assert!(sw.refresh().active);
    }

    #[test]
    fn invalid_duration_reports_error() {
        let (mut sw, clock, _) = controller();
        assert_eq!(sw.format_duration(f64::NAN), "00:00:00.00");
        let message = sw.surfaces().banner.message().unwrap();
        assert!(message.contains("invalid duration"));

        clock.advance(4_999);
        assert!(!sw.expire_banner());
        clock.advance(1);
        assert!(sw.expire_banner());
        assert_eq!(sw.surfaces().banner.message(), None);
    }

    #[test]
    fn format_fixtures() {
        let (mut sw, _, _) = controller();
        assert_eq!(sw.format_duration(0.0), "00:00:00.00");
        assert_eq!(sw.format_duration(61_230.0), "00:01:01.23");
        assert_eq!(sw.format_duration(3_661_000.0), "01:01:01.00");
        assert_eq!(sw.surfaces().banner.message(), None);
    }

    #[test]
    fn scroll_is_clamped() {
        let (mut sw, clock, _) = controller();
        sw.toggle_running();
        for _ in 0..3 {
            clock.advance(100);
            sw.record_lap();
        }
        sw.scroll_laps(10);
        assert_eq!(sw.surfaces().lap_scroll_offset, 2);
        sw.scroll_laps(-1);
        assert_eq!(sw.surfaces().lap_scroll_offset, 1);
        sw.scroll_laps(-5);
        assert_eq!(sw.surfaces().lap_scroll_offset, 0);
        sw.scroll_laps(1);
        clock.advance(100);
        sw.record_lap();
        assert_eq!(sw.surfaces().lap_scroll_offset, 0);
    }
}

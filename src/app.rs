use crate::clock::Clock;
use crate::input::Action;
use crate::pump::Refresh;
use crate::stopwatch::StopwatchController;
use crate::storage::SnapshotStore;

/// The controller plus the view state around it (help overlay, quit flag).
pub struct StopwatchApp<C, S, R> {
    pub controller: StopwatchController<C, S, R>,
    pub help_visible: bool,
    quit: bool,
}

impl<C: Clock, S: SnapshotStore, R: Refresh> StopwatchApp<C, S, R> {
    pub fn new(controller: StopwatchController<C, S, R>) -> Self {
        Self {
            controller,
            help_visible: false,
            quit: false,
        }
    }

    pub fn should_quit(&self) -> bool {
        self.quit
    }

    pub fn handle(&mut self, action: Action) {
        let sw = &mut self.controller;
        match action {
            Action::ToggleRunning => sw.toggle_running(),
            Action::Reset => sw.reset(),
            Action::Lap => sw.record_lap(),
            Action::Click(control) => sw.click(control),
            Action::ScrollLaps(delta) => sw.scroll_laps(delta),
            Action::DismissBanner => sw.dismiss_banner(),
            Action::ToggleHelp => self.help_visible = !self.help_visible,
            Action::CloseHelp => self.help_visible = false,
            Action::Visibility(visible) => sw.handle_visibility_change(visible),
            Action::Redraw => {}
            Action::Quit => {
                log::info!("Quit requested");
                sw.unload();
                self.quit = true;
            }
        }
    }
}

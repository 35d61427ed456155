//! Terminal events to stopwatch actions.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
};

use crate::stopwatch::Control;
use crate::ui::ControlAreas;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    ToggleRunning,
    Reset,
    Lap,
    Click(Control),
    ScrollLaps(isize),
    DismissBanner,
    ToggleHelp,
    CloseHelp,
    Visibility(bool),
    Redraw,
    Quit,
}

pub fn map_event(
    event: &Event,
    running: bool,
    help_visible: bool,
    controls: &ControlAreas,
) -> Option<Action> {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => {
            if help_visible {
                return Some(Action::CloseHelp);
            }
            map_key(key, running)
        }
        Event::Mouse(mouse) => map_mouse(mouse, controls),
        Event::FocusGained => Some(Action::Visibility(true)),
        Event::FocusLost => Some(Action::Visibility(false)),
        Event::Resize(_, _) => Some(Action::Redraw),
        _ => None,
    }
}

fn map_key(key: &KeyEvent, running: bool) -> Option<Action> {
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Some(Action::Quit),
            KeyCode::Char('r') => Some(Action::Reset),
            KeyCode::Char('l') if running => Some(Action::Lap),
            _ => None,
        };
    }
    match key.code {
        KeyCode::Char(' ') => Some(Action::ToggleRunning),
        KeyCode::Esc => Some(Action::Reset),
        KeyCode::Char('s') => Some(Action::Click(Control::StartStop)),
        KeyCode::Char('r') => Some(Action::Click(Control::Reset)),
        KeyCode::Char('l') => Some(Action::Click(Control::Lap)),
        KeyCode::Char('c') => Some(Action::Click(Control::ClearLaps)),
        KeyCode::Char('x') => Some(Action::DismissBanner),
        KeyCode::Up => Some(Action::ScrollLaps(-1)),
        KeyCode::Down => Some(Action::ScrollLaps(1)),
        KeyCode::Char('?') | KeyCode::F(1) => Some(Action::ToggleHelp),
        KeyCode::Char('q') => Some(Action::Quit),
        _ => None,
    }
}

fn map_mouse(mouse: &MouseEvent, controls: &ControlAreas) -> Option<Action> {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            controls.hit(mouse.column, mouse.row).map(Action::Click)
        }
        MouseEventKind::ScrollUp => Some(Action::ScrollLaps(-1)),
        MouseEventKind::ScrollDown => Some(Action::ScrollLaps(1)),
        _ => None,
    }
}

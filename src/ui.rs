//! All drawing / rendering functions.

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, Paragraph};

use crate::error::{Error, Result};
use crate::stopwatch::{ButtonState, Control, Surfaces};

pub const MIN_WIDTH: u16 = 60;
pub const MIN_HEIGHT: u16 = 14;
const BUTTON_WIDTH: u16 = 14;

const HELP_TEXT: &str = "STOPWATCH HELP\n\n\
     Space    Start/Stop\n\
     Ctrl+L   Lap (while running)\n\
     Ctrl+R   Reset\n\
     Esc      Reset\n\
     s r l c  Start-Stop, Reset, Lap, Clear laps\n\
     Up/Dn    Scroll laps\n\
     x        Dismiss error\n\
     ?/F1     Help\n\
     q        Quit";

/// Screen rectangles of the clickable controls.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlAreas {
    pub start_stop: Rect,
    pub reset: Rect,
    pub lap: Rect,
    pub clear_laps: Rect,
}

impl ControlAreas {
    pub fn hit(&self, column: u16, row: u16) -> Option<Control> {
        let pos = Position::new(column, row);
        [
            (self.start_stop, Control::StartStop),
            (self.reset, Control::Reset),
            (self.lap, Control::Lap),
            (self.clear_laps, Control::ClearLaps),
        ]
        .into_iter()
        .find(|(area, _)| area.contains(pos))
        .map(|(_, control)| control)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ScreenLayout {
    pub readout: Rect,
    pub controls: ControlAreas,
    pub laps: Rect,
    pub banner: Rect,
    pub footer: Rect,
}

/// Fails when the terminal cannot fit the stopwatch.
pub fn check_size(area: Rect) -> Result<()> {
    if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
        return Err(Error::Init(format!(
            "terminal is {}x{}, need at least {MIN_WIDTH}x{MIN_HEIGHT}",
            area.width, area.height
        )));
    }
    Ok(())
}

pub fn layout(area: Rect) -> ScreenLayout {
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Time readout
            Constraint::Length(3), // Controls
            Constraint::Min(3),    // Lap list
            Constraint::Length(1), // Error banner
            Constraint::Length(1), // Key hints
        ])
        .split(inner);

    let buttons = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Length(BUTTON_WIDTH),
            Constraint::Min(0),
        ])
        .split(rows[1]);

    ScreenLayout {
        readout: rows[0],
        controls: ControlAreas {
            start_stop: buttons[0],
            reset: buttons[1],
            lap: buttons[2],
            clear_laps: buttons[3],
        },
        laps: rows[2],
        banner: rows[3],
        footer: rows[4],
    }
}

pub fn draw(frame: &mut ratatui::Frame, surfaces: &Surfaces, help_visible: bool) {
    draw_stopwatch(frame, surfaces);
    if help_visible {
        draw_help(frame);
    }
}

pub fn draw_stopwatch(frame: &mut ratatui::Frame, surfaces: &Surfaces) {
    let area = frame.area();
    let screen = layout(area);

    let outer = Block::default()
        .title(" STOPWATCH ")
        .title_alignment(Alignment::Left)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(outer, area);

    let readout = Paragraph::new(surfaces.readout.as_str())
        .alignment(Alignment::Center)
        .style(Style::default().add_modifier(Modifier::BOLD))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(readout, screen.readout);

    draw_button(frame, screen.controls.start_stop, &surfaces.start_stop);
    draw_button(frame, screen.controls.reset, &surfaces.reset);
    draw_button(frame, screen.controls.lap, &surfaces.lap);
    draw_button(frame, screen.controls.clear_laps, &surfaces.clear_laps);

    // Most recent lap first
    let items: Vec<ListItem> = surfaces
        .lap_rows
        .iter()
        .rev()
        .skip(surfaces.lap_scroll_offset)
        .map(|row| ListItem::new(row.as_str()))
        .collect();
    let laps = List::new(items).block(Block::default().title(" Laps ").borders(Borders::ALL));
    frame.render_widget(laps, screen.laps);

    if let Some(message) = surfaces.banner.message() {
        let banner = Paragraph::new(Line::from(Span::styled(
            message,
            Style::default().fg(Color::White).bg(Color::Red),
        )));
        frame.render_widget(banner, screen.banner);
    }

    let footer = Paragraph::new("Space=start/stop  Ctrl+L=lap  Esc=reset  ?=help  q=quit")
        .style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, screen.footer);
}

fn draw_button(frame: &mut ratatui::Frame, area: Rect, button: &ButtonState) {
    if !button.visible {
        return;
    }
    let style = if button.enabled {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let widget = Paragraph::new(button.label)
        .alignment(Alignment::Center)
        .style(style)
        .block(Block::default().borders(Borders::ALL).border_style(style));
    frame.render_widget(widget, area);
}

pub fn draw_help(frame: &mut ratatui::Frame) {
    let area = centered(frame.area(), 50, 13);
    frame.render_widget(Clear, area);
    let help = Paragraph::new(HELP_TEXT)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Press any key to close "),
        );
    frame.render_widget(help, area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

//! Layout components (centered column, status bar)

use crate::app::App;
use crate::state::FormSnapshot;
use ratatui::{
    layout::{Constraint, Direction, Flex, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Width of the form column
const COLUMN_WIDTH: u16 = 64;

/// Reserve the bottom line for the status bar and center a column in the rest
pub fn create_layout(area: Rect) -> Rect {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let [column] = Layout::horizontal([Constraint::Length(COLUMN_WIDTH)])
        .flex(Flex::Center)
        .areas(chunks[0]);
    column
}

/// Draw the status bar
pub fn draw_status_bar(frame: &mut Frame, app: &App, snapshot: &FormSnapshot) {
    let area = frame.area();
    let status_area = Rect {
        x: 0,
        y: area.height.saturating_sub(1),
        width: area.width,
        height: 1,
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", snapshot.state.label()),
        Style::default().fg(state_color(snapshot)),
    )];

    spans.push(Span::styled(
        get_hints(snapshot),
        Style::default().fg(Color::Gray),
    ));

    if let Some(msg) = &app.status_message {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(msg, Style::default().fg(Color::Yellow)));
    }

    let status = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(status, status_area);
}

fn state_color(snapshot: &FormSnapshot) -> Color {
    if snapshot.state.is_in_flight() {
        Color::Yellow
    } else if snapshot.banner_visible {
        Color::Green
    } else {
        Color::Cyan
    }
}

/// Keyboard hints for the current form state
fn get_hints(snapshot: &FormSnapshot) -> String {
    if snapshot.banner_visible {
        "Esc:dismiss  Tab:next  ^S:submit  ^C:quit".to_string()
    } else {
        "Tab:next  Enter:next/submit  ^S:submit  Esc/^C:quit".to_string()
    }
}

//! Field rendering utilities for forms

use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows taken by one field: bordered input plus its error line
pub const FIELD_HEIGHT: u16 = 4;

/// Draw a labelled single-line input with its error message underneath
pub fn draw_field(
    frame: &mut Frame,
    area: Rect,
    label: &str,
    value: &str,
    error: &str,
    is_active: bool,
) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Length(1)])
        .split(area);

    let has_error = !error.is_empty();
    let border_style = if has_error {
        Style::default().fg(Color::Red)
    } else if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };

    let display_value = if value.is_empty() && !is_active {
        "(empty)"
    } else {
        value
    };

    let cursor = if is_active { "▌" } else { "" };

    let content = Paragraph::new(Line::from(vec![
        Span::styled(display_value, style),
        Span::styled(cursor, Style::default().fg(Color::Cyan)),
    ]));

    let block = Block::default()
        .title(format!(" {label} "))
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(content.block(block), chunks[0]);

    if has_error {
        let message = Paragraph::new(Span::styled(
            format!(" {label} {error}"),
            Style::default().fg(Color::Red),
        ));
        frame.render_widget(message, chunks[1]);
    }
}

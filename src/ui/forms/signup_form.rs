//! Sign-up form rendering

use super::field_renderer::{draw_field, FIELD_HEIGHT};
use crate::app::{App, FocusTarget};
use crate::state::{Field, FormSnapshot};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Span,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows needed by the form including its border
pub const FORM_HEIGHT: u16 = 2 * FIELD_HEIGHT + BUTTON_HEIGHT + 1 + 2;

/// Draw both fields, the submit button and any non-field error
pub fn draw_signup(frame: &mut Frame, area: Rect, app: &App, snapshot: &FormSnapshot) {
    let block = Block::default()
        .title(" Sign Up ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(FIELD_HEIGHT),  // Username
            Constraint::Length(FIELD_HEIGHT),  // Email
            Constraint::Length(BUTTON_HEIGHT), // Submit
            Constraint::Length(1),             // Form error
        ])
        .margin(1)
        .split(area);

    for (field, chunk) in Field::ALL.into_iter().zip(chunks.iter()) {
        draw_field(
            frame,
            *chunk,
            field.label(),
            snapshot.value(field),
            snapshot.visible_error(field),
            app.focus.field() == Some(field),
        );
    }

    let in_flight = snapshot.state.is_in_flight();
    let label = if in_flight { "Submitting..." } else { "Sign up" };
    render_button(
        frame,
        chunks[2],
        label,
        app.focus == FocusTarget::SubmitButton,
        !in_flight,
    );

    if let Some(error) = &snapshot.form_error {
        frame.render_widget(
            Paragraph::new(Span::styled(
                format!(" {error}"),
                Style::default().fg(Color::Red),
            )),
            chunks[3],
        );
    }
}

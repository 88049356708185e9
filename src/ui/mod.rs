//! UI module for rendering the TUI

mod components;
mod forms;
mod layout;
mod submitted;

use crate::app::App;
use components::BANNER_HEIGHT;
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let snapshot = match app.form.snapshot() {
        Ok(snapshot) => snapshot,
        Err(error) => {
            let paragraph = Paragraph::new(error.to_string())
                .style(Style::default().fg(Color::Red))
                .block(Block::default().title(" Error ").borders(Borders::ALL));
            frame.render_widget(paragraph, frame.area());
            return;
        }
    };

    let column = layout::create_layout(frame.area());
    let banner_height = if snapshot.banner_visible {
        BANNER_HEIGHT
    } else {
        0
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(banner_height),      // Success banner
            Constraint::Length(forms::FORM_HEIGHT), // Form
            Constraint::Min(0),                     // Last submitted
        ])
        .split(column);

    components::render_success_banner(frame, chunks[0], &snapshot);
    forms::draw_signup(frame, chunks[1], app, &snapshot);
    submitted::draw(frame, chunks[2], &snapshot);

    layout::draw_status_bar(frame, app, &snapshot);
}

//! Last submitted sign-up panel

use crate::state::FormSnapshot;
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Show the last accepted snapshot as JSON, or a placeholder
pub fn draw(frame: &mut Frame, area: Rect, snapshot: &FormSnapshot) {
    let block = Block::default()
        .title(" Last submitted ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray));

    let lines: Vec<Line> = match &snapshot.last_submitted {
        Some(submission) => {
            let json = serde_json::to_string_pretty(&submission.data)
                .unwrap_or_else(|e| format!("<unprintable: {e}>"));
            let mut lines = vec![Line::styled(
                format!(
                    "{}  id {}",
                    submission.submitted_at.format("%Y-%m-%d %H:%M:%S UTC"),
                    submission.id
                ),
                Style::default().fg(Color::DarkGray),
            )];
            lines.extend(json.lines().map(|l| Line::from(l.to_string())));
            lines
        }
        None => vec![Line::styled(
            "Nothing submitted yet",
            Style::default().fg(Color::DarkGray),
        )],
    };

    frame.render_widget(
        Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(block),
        area,
    );
}

//! Dismissible success banner

use crate::state::FormSnapshot;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph},
    Frame,
};

/// Banner height in rows (borders + message + countdown)
pub const BANNER_HEIGHT: u16 = 4;

/// Draw the banner if it is showing
pub fn render_success_banner(frame: &mut Frame, area: Rect, snapshot: &FormSnapshot) {
    if !snapshot.banner_visible {
        return;
    }

    let block = Block::default()
        .title(" Success ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let who = snapshot
        .last_submitted
        .as_ref()
        .map(|s| s.data.username.as_str())
        .unwrap_or("");
    let message = Line::from(vec![
        Span::styled(
            format!("Sign-up complete. Welcome, {who}!"),
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  (Esc to dismiss)", Style::default().fg(Color::DarkGray)),
    ]);
    frame.render_widget(Paragraph::new(message), rows[0]);

    let remaining = snapshot.banner_remaining.unwrap_or_default();
    let fraction = if snapshot.banner_timeout.is_zero() {
        0.0
    } else {
        (remaining.as_secs_f32() / snapshot.banner_timeout.as_secs_f32()).clamp(0.0, 1.0)
    };
    // Ease so the bar drains slowly at first and snaps shut at the end
    let ratio = simple_easing::cubic_out(fraction);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Green).bg(Color::Black))
        .ratio(f64::from(ratio))
        .label(format!("hides in {:.1}s", remaining.as_secs_f32()));
    frame.render_widget(gauge, rows[1]);
}

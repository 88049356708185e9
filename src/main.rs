//! Signup TUI - terminal sign-up form
//!
//! A Ratatui-based form with username/email validation, a simulated
//! submit call and a self-dismissing success banner.

mod app;
mod config;
mod remote;
mod state;
mod ui;

use anyhow::Result;
use app::App;
use config::SignupConfig;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "signup_tui=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = SignupConfig::load()?;
    tracing::debug!(?config, "loaded configuration");

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create app and run
    let mut app = App::new(&config);
    app.form
        .subscribe(|event| tracing::debug!(?event, "form event"))?;
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle any errors
    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    loop {
        // Pick up finished submit cycles before drawing
        app.poll_submissions().await?;

        terminal.draw(|frame| ui::draw(frame, app))?;

        // Faster polling while something is animating (16ms = ~60fps)
        let animating = app.has_pending_submit() || app.form.banner_visible()?;
        let poll_duration = if animating {
            Duration::from_millis(16)
        } else {
            Duration::from_millis(100)
        };

        // Handle crossterm events
        if event::poll(poll_duration)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                // Global quit: Ctrl+C
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
                {
                    return Ok(());
                }

                app.handle_key(key).await?;
            }
        }

        // Check if app wants to quit
        if app.should_quit() {
            return Ok(());
        }
    }
}

//! tasklist TUI
//!
//! Terminal user interface for tasklist.
//!
//! ## Layout
//!
//! - Entry field for new todos (disabled while a create is in flight)
//! - Todo list for the current filter, including the unsaved placeholder
//! - Footer with the "N items left" counter, filter tabs and clear hint
//! - Error notices, cleared automatically or with Esc
//!
//! ## Keys
//!
//! - Typing edits the draft, Enter adds it
//! - Tab / Shift-Tab: Cycle filter (All, Active, Completed)
//! - ↑/↓: Move selection
//! - Ctrl-D: Delete selected todo
//! - Ctrl-X: Clear completed
//! - Esc: Dismiss notices
//! - Ctrl-C: Quit

mod app;
mod ui;

use std::fs::File;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::{
    event::{self, Event, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::prelude::*;
use tokio::sync::mpsc;
use tracing::{debug, info};

use tasklist_core::{Config, HttpCollection, Notifications, SyncEngine, UserId};

use app::{App, AppEvent};

/// Run the TUI application
pub async fn run(config: Config, user_id: UserId) -> Result<()> {
    // Initialize TUI logging (file-based, only if TASKLIST_LOG is set)
    init_tui_logging(&config);

    let remote = HttpCollection::new(&config.api_url, user_id, config.request_timeout())
        .context("Failed to create HTTP client")?;
    let engine = SyncEngine::new(
        Arc::new(remote),
        user_id,
        Notifications::new(config.notice_timeout()),
    );

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let mut app = App::new(engine.clone());

    // Load in the background so the UI shows "Loading..." meanwhile
    {
        let engine = engine.clone();
        let event_tx = event_tx.clone();
        tokio::spawn(async move {
            let _ = event_tx.send(AppEvent::Loaded(engine.load().await));
        });
    }

    // Run app
    let result = run_app(&mut terminal, &mut app, event_tx, event_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

async fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    mut event_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<()> {
    loop {
        // Check for status message timeout
        app.check_status_timeout();

        // Pick up placeholder, lock and notice changes
        app.refresh();

        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        // Handle events with a short timeout
        tokio::select! {
            biased;

            // Finished operations
            Some(event) = event_rx.recv() => {
                debug!("Operation finished: {:?}", event);
                app.on_event(event);
            }

            // Poll for terminal events
            _ = tokio::time::sleep(Duration::from_millis(50)) => {
                // Check for terminal events (non-blocking)
                while event::poll(Duration::from_millis(0))? {
                    if let Event::Key(key) = event::read()? {
                        // Only handle key press events (not release)
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }

                        if let Some(action) = app.handle_key(key.code, key.modifiers) {
                            app.dispatch(action, &event_tx);
                        }
                    }
                }
            }
        }

        if app.should_quit {
            info!("Quitting");
            return Ok(());
        }
    }
}

/// Initialize file-based logging for TUI mode
///
/// Only logs if TASKLIST_LOG environment variable is set.
/// Logs to config.log_file or data_dir/debug.log.
fn init_tui_logging(config: &Config) {
    // Only log if TASKLIST_LOG is set
    let Ok(log_level) = std::env::var(crate::LOG_ENV) else {
        return;
    };

    if let Err(e) = config.ensure_data_dir() {
        eprintln!("Warning: {:#}", e);
    }

    let log_path = config.log_path();
    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    // Initialize file-based logging (ignore error if already initialized)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(crate::log_filter(&log_level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}

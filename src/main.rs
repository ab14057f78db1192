mod app;
mod clock;
mod components;
mod config;
mod db;
mod logging;
mod models;
mod notify;
mod refresh;
mod services;
mod tui;
mod validation;

use anyhow::{Context, Result};
use app::App;
use clock::{Clock, SystemClock};
use config::AppConfig;
use crossterm::terminal::{self, LeaveAlternateScreen};
use db::Stores;
use notify::ToastBoard;
use ratatui::prelude::{CrosstermBackend, Terminal};
use services::Services;
use std::io;
use std::rc::Rc;
use tui::Tui;

fn main() -> Result<()> {
    let config = AppConfig::load()?;
    logging::init(&config)?;
    tracing::info!(
        version = config::APP_VERSION,
        backend = ?config.backend,
        "starting {}",
        config::APP_NAME
    );

    let clock = Rc::new(SystemClock);
    let stores = Stores::open(&config, clock.today()).context("Failed to open record stores")?;
    let toasts = Rc::new(ToastBoard::new());
    let services = Services::new(stores, toasts.clone(), clock);

    let _guard = CleanupGuard;

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    terminal.clear()?;

    let mut tui = Tui::new(terminal);
    tui.init()?;

    let mut app = App::new(services, toasts, config.refresh_interval());
    let res = app.run(&mut tui);

    tui.exit()?;

    if let Err(e) = res {
        tracing::error!(error = %format!("{e:#}"), "application error");
        eprintln!("Application Error: {e:#}");
    }
    tracing::info!("shut down");
    Ok(())
}

struct CleanupGuard;

impl Drop for CleanupGuard {
    fn drop(&mut self) {
        // Ignore errors during cleanup
        let _ = terminal::disable_raw_mode();
        let _ = crossterm::execute!(io::stdout(), LeaveAlternateScreen);
    }
}

//! Terminal setup and the event source for the main loop.

use anyhow::{Context, Result};
use crossterm::{
    event,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, time::Duration};

/// Smallest terminal the wider tables and dialogs fit in.
const MIN_WIDTH: u16 = 100;
const MIN_HEIGHT: u16 = 35;

/// Frames (and ticks) per second.
const FRAMERATE: f64 = 30.0;

#[derive(Debug, Clone)]
pub enum Event {
    Input(event::Event),
    /// No input arrived within one frame.
    Tick,
}

pub type Frame<'a> = ratatui::Frame<'a>;

pub struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
    tick_rate: Duration,
}

impl Tui {
    pub fn new(terminal: Terminal<CrosstermBackend<io::Stdout>>) -> Self {
        Self {
            terminal,
            tick_rate: Duration::from_secs_f64(1.0 / FRAMERATE),
        }
    }

    /// Switches to raw mode on the alternate screen.
    pub fn init(&mut self) -> Result<()> {
        terminal::enable_raw_mode().context("Failed to enable raw mode")?;
        crossterm::execute!(io::stdout(), EnterAlternateScreen)?;
        self.terminal.hide_cursor()?;
        self.terminal.clear()?;
        self.ensure_min_size()?;
        tracing::debug!("terminal initialised");
        Ok(())
    }

    /// Asks the terminal to grow when it is smaller than the layouts need.
    fn ensure_min_size(&self) -> Result<()> {
        let (width, height) = terminal::size()?;
        if width < MIN_WIDTH || height < MIN_HEIGHT {
            tracing::debug!(width, height, "terminal below minimum size, resizing");
            io::stdout().execute(terminal::SetSize(
                width.max(MIN_WIDTH),
                height.max(MIN_HEIGHT),
            ))?;
        }
        Ok(())
    }

    pub fn exit(&mut self) -> Result<()> {
        self.terminal.show_cursor()?;
        terminal::disable_raw_mode()?;
        crossterm::execute!(io::stdout(), LeaveAlternateScreen)?;
        Ok(())
    }

    pub fn draw(&mut self, render: impl FnOnce(&mut Frame)) -> Result<()> {
        self.terminal.draw(render)?;
        Ok(())
    }

    /// Waits up to one frame for input; returns [`Event::Tick`] otherwise.
    pub fn next_event(&self) -> Result<Event> {
        if event::poll(self.tick_rate)? {
            return Ok(Event::Input(event::read()?));
        }
        Ok(Event::Tick)
    }
}

//! The main application state and logic for wardboard.
//!
//! The application owns the services and the active view. Every key press is
//! handed to the active component, which answers with an optional
//! [`Transition`]; ticks drive the views that refresh themselves.

use crate::components::{home::Home, hospital, widgets, Component};
use crate::notify::ToastBoard;
use crate::services::Services;
use crate::tui::{self, Tui};
use anyhow::Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, info};

/// The screens reachable from the home menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Patients,
    RegisterPatient,
    Admissions,
    Queue,
    Appointments,
    Staff,
    Departments,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Dashboard => "Dashboard",
            View::Patients => "Patients",
            View::RegisterPatient => "Register Patient",
            View::Admissions => "Admissions",
            View::Queue => "Queue Board",
            View::Appointments => "Appointments",
            View::Staff => "Staff Directory",
            View::Departments => "Departments",
        }
    }
}

/// What a component asks the application to do after handling a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Open(View),
    Home,
    Quit,
}

/// The possible states of the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Home,
    Running(View),
}

pub struct App {
    pub state: AppState,
    pub should_quit: bool,
    home: Home,
    /// The open view; only exists while running.
    active: Option<Box<dyn Component>>,
    services: Services,
    toasts: Rc<ToastBoard>,
    refresh_interval: Duration,
}

impl App {
    /// Creates the application on its home menu.
    ///
    /// # Arguments
    ///
    /// * `services` - The wired services every view works through.
    /// * `toasts` - The board the services notify; drawn over every view.
    /// * `refresh_interval` - How often polling views reload their data.
    pub fn new(services: Services, toasts: Rc<ToastBoard>, refresh_interval: Duration) -> Self {
        Self {
            state: AppState::Home,
            should_quit: false,
            home: Home::new(),
            active: None,
            services,
            toasts,
            refresh_interval,
        }
    }

    /// Runs the application's main loop.
    ///
    /// # Errors
    ///
    /// Returns an error if drawing fails or a view fails to handle an event.
    pub fn run(&mut self, tui: &mut Tui) -> Result<()> {
        while !self.should_quit {
            tui.draw(|frame| self.render_ui(frame))?;
            self.handle_event(tui.next_event()?)?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: tui::Event) -> Result<()> {
        match event {
            tui::Event::Input(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                self.handle_key(key)
            }
            tui::Event::Input(_) => Ok(()),
            tui::Event::Tick => match self.active.as_mut() {
                Some(view) => view.on_tick(&mut self.services),
                None => Ok(()),
            },
        }
    }

    fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Global keybinding: Ctrl+Q to quit
        if key.code == KeyCode::Char('q') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return Ok(());
        }

        let transition = match self.active.as_mut() {
            Some(view) => view.handle_input(key, &mut self.services)?,
            None => self.home.handle_input(key, &mut self.services)?,
        };
        if let Some(transition) = transition {
            self.apply(transition);
        }
        Ok(())
    }

    /// Moves the application to the state a component asked for.
    ///
    /// A toast left by the previous screen is cleared first.
    pub fn apply(&mut self, transition: Transition) {
        self.toasts.dismiss();
        match transition {
            Transition::Open(view) => {
                debug!(view = view.title(), "opening view");
                self.active = Some(hospital::open(
                    view,
                    &self.services,
                    self.refresh_interval,
                ));
                self.state = AppState::Running(view);
            }
            Transition::Home => {
                self.active = None;
                self.state = AppState::Home;
            }
            Transition::Quit => {
                info!("quit requested");
                self.should_quit = true;
            }
        }
    }

    fn render_ui(&self, frame: &mut tui::Frame<'_>) {
        match &self.active {
            Some(view) => view.render(frame),
            None => self.home.render(frame),
        }
        if let Some(toast) = self.toasts.current() {
            widgets::toast(frame, &toast);
        }
    }
}

use crate::app::Transition;
use crate::services::Services;
use crate::tui::Frame;
use anyhow::Result;
use crossterm::event::KeyEvent;

pub mod home;
pub mod hospital;
pub mod widgets;

/// A full-screen view driven by the application loop.
pub trait Component {
    /// Handles one key press, returning where the application should go next.
    fn handle_input(&mut self, key: KeyEvent, services: &mut Services)
        -> Result<Option<Transition>>;

    fn render(&self, frame: &mut Frame);

    /// Called on every frame tick; views that poll the stores refresh here.
    fn on_tick(&mut self, _services: &mut Services) -> Result<()> {
        Ok(())
    }
}

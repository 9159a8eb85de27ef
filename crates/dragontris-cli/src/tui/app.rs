use crossterm::event::Event;
use ratatui::Frame;

/// A screen driven by [`Tui`](super::Tui).
///
/// Every frame the runner calls [`update`](Self::update) and then
/// [`draw`](Self::draw). Terminal events arriving between frames go to
/// [`handle_event`](Self::handle_event) as soon as they are read.
pub trait App {
    fn should_exit(&self) -> bool;

    fn handle_event(&mut self, event: Event);

    /// Advances the screen to the current time.
    fn update(&mut self);

    fn draw(&self, frame: &mut Frame);
}

use std::time::Instant;

use crossterm::event;

use crate::tui::{App, frame_clock::FrameClock};

/// Terminal runtime.
///
/// Runs one update and one redraw per frame, and reads key input in between
/// without blocking past the next frame.
#[derive(Debug)]
pub struct Tui {
    clock: FrameClock,
}

impl Tui {
    pub fn new(fps: f64) -> anyhow::Result<Self> {
        Ok(Self {
            clock: FrameClock::new(fps, Instant::now())?,
        })
    }

    /// Runs `app` until it asks to exit, restoring the terminal afterwards.
    pub fn run<A>(mut self, app: &mut A) -> anyhow::Result<()>
    where
        A: App,
    {
        ratatui::run(|terminal| {
            while !app.should_exit() {
                let now = Instant::now();
                if self.clock.is_due(now) {
                    app.update();
                    terminal.draw(|frame| app.draw(frame))?;
                    self.clock.advance(now);
                    continue;
                }
                if event::poll(self.clock.timeout(now))? {
                    app.handle_event(event::read()?);
                }
            }
            Ok(())
        })
    }
}

//! Fixed-rate terminal runtime for the play screen.

mod app;
mod frame_clock;
mod runner;

pub use self::{app::App, runner::Tui};

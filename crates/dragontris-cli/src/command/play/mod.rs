use crate::{
    command::CommonArg,
    logging::{self, LogTarget},
    tui::Tui,
};

use self::app::PlayApp;

mod app;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Frames (ticks and renders) per second
    #[clap(long, default_value_t = 60.0)]
    fps: f64,
}

impl Default for PlayArg {
    fn default() -> Self {
        Self { fps: 60.0 }
    }
}

pub(crate) fn run(common: &CommonArg, arg: &PlayArg) -> anyhow::Result<()> {
    // The terminal belongs to the renderer; log only when asked to.
    if let Some(path) = &common.log_file {
        logging::init(LogTarget::File(path), &common.log_level)?;
    }

    let sink = common.open_results_sink()?;
    let tui = Tui::new(arg.fps)?;
    let mut app = PlayApp::new(common.session_config(), sink)?;
    tui.run(&mut app)?;
    app.finish()
}

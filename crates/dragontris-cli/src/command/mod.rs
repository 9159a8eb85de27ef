use std::path::PathBuf;

use clap::{Parser, Subcommand};
use dragontris_engine::{PieceSeed, SessionConfig, SkipZeroScore};

use crate::results::JsonLinesSink;

use self::{play::PlayArg, simulate::SimulateArg};

mod play;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    #[clap(flatten)]
    common: CommonArg,
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Run a game headless with random input and print the result
    Simulate(#[clap(flatten)] SimulateArg),
}

/// Options shared by every mode.
#[derive(Debug, Clone, clap::Args)]
pub(crate) struct CommonArg {
    /// Seed of the piece sequence (32 hex digits); random when omitted
    #[clap(long, global = true)]
    seed: Option<PieceSeed>,
    /// Append finished games to this file as JSON lines
    #[clap(long, global = true)]
    results_file: Option<PathBuf>,
    /// Write log records to this file
    #[clap(long, global = true)]
    log_file: Option<PathBuf>,
    /// Log filter in `RUST_LOG` syntax
    #[clap(long, global = true, default_value = "info")]
    log_level: String,
    /// Enable debug commands (Ctrl+digit jumps to a level)
    #[clap(long, global = true)]
    debug: bool,
}

impl CommonArg {
    pub(crate) fn session_config(&self) -> SessionConfig {
        SessionConfig {
            seed: self.seed,
            debug_commands: self.debug,
        }
    }

    /// Opens the results file, if any, behind the zero-score policy.
    pub(crate) fn open_results_sink(
        &self,
    ) -> anyhow::Result<Option<SkipZeroScore<JsonLinesSink>>> {
        self.results_file
            .as_deref()
            .map(|path| JsonLinesSink::open_skipping_zero(path, self.seed))
            .transpose()
    }
}

pub fn run() -> anyhow::Result<()> {
    let CommandArgs { common, mode } = CommandArgs::parse();
    match mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&common, &arg)?,
        Mode::Simulate(arg) => simulate::run(&common, &arg)?,
    }
    Ok(())
}

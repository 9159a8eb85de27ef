use std::{io, time::Duration};

use anyhow::Context;
use dragontris_engine::{Command, GameResult, GameSession, SessionConfig, SessionState, SessionStats};
use rand::{Rng, SeedableRng, rngs::StdRng};
use serde::Serialize;

use crate::{
    command::CommonArg,
    logging::{self, LogTarget},
};

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct SimulateArg {
    /// Stop after this many frames even if the game is still running
    #[clap(long, default_value_t = 100_000)]
    max_frames: u64,
    /// Simulated milliseconds per frame
    #[clap(long, default_value_t = 16)]
    frame_ms: u64,
    /// Seed of the random input; random when omitted
    #[clap(long)]
    input_seed: Option<u64>,
}

/// Printed to stdout when the simulation ends.
#[derive(Debug, Serialize)]
struct SimulationSummary {
    frames: u64,
    elapsed_ms: u128,
    result: Option<GameResult>,
    stats: SessionStats,
}

/// Picks the input for one frame: mostly idle, biased towards moving and dropping.
fn random_command<R: Rng + ?Sized>(rng: &mut R) -> Option<Command> {
    let command = match rng.random_range(0..100) {
        0..10 => Command::MoveLeft,
        10..20 => Command::MoveRight,
        20..30 => Command::SoftDrop,
        30..36 => Command::Rotate,
        36 => Command::ToggleGhost,
        _ => return None,
    };
    Some(command)
}

/// Plays one game on a virtual clock, acknowledging level-ups as they come.
fn simulate<R: Rng + ?Sized>(
    config: SessionConfig,
    max_frames: u64,
    frame: Duration,
    rng: &mut R,
) -> anyhow::Result<(GameSession, SimulationSummary)> {
    let mut session = GameSession::new(config);
    session
        .start(Duration::ZERO)
        .context("Failed to start session")?;

    let mut now = Duration::ZERO;
    let mut frames = 0;
    while frames < max_frames && !session.session_state().is_game_over() {
        frames += 1;
        now += frame;
        let command = match session.session_state() {
            SessionState::LevelUp => Some(Command::AcknowledgeLevelUp),
            _ => random_command(rng),
        };
        if let Some(command) = command {
            _ = session.apply(command, now);
        }
        session.tick(now);
    }

    let summary = SimulationSummary {
        frames,
        elapsed_ms: now.as_millis(),
        result: session.result().copied(),
        stats: session.stats().clone(),
    };
    Ok((session, summary))
}

pub(crate) fn run(common: &CommonArg, arg: &SimulateArg) -> anyhow::Result<()> {
    let SimulateArg {
        max_frames,
        frame_ms,
        input_seed,
    } = arg;

    let target = common
        .log_file
        .as_deref()
        .map_or(LogTarget::Stderr, LogTarget::File);
    logging::init(target, &common.log_level)?;

    let mut rng = input_seed.map_or_else(StdRng::from_os_rng, StdRng::seed_from_u64);
    let (mut session, summary) = simulate(
        common.session_config(),
        *max_frames,
        Duration::from_millis(*frame_ms),
        &mut rng,
    )?;

    if let Some(mut sink) = common.open_results_sink()? {
        session.report_result(&mut sink)?;
    }

    let stdout = io::stdout().lock();
    serde_json::to_writer_pretty(stdout, &summary).context("Failed to write summary")?;
    println!();
    Ok(())
}

use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
};

use anyhow::Context;
use chrono::{DateTime, Utc};
use dragontris_engine::{GameResult, PieceSeed, ResultsSink, SkipZeroScore};
use serde::{Deserialize, Serialize};

/// One line of the results file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Time the game ended (ISO 8601 format)
    pub finished_at: DateTime<Utc>,
    /// Seed of the piece sequence, if the session was seeded
    pub seed: Option<PieceSeed>,
    #[serde(flatten)]
    pub result: GameResult,
}

/// Appends finished games to a file, one JSON object per line.
#[derive(Debug)]
pub struct JsonLinesSink {
    writer: BufWriter<File>,
    path: PathBuf,
    seed: Option<PieceSeed>,
}

impl JsonLinesSink {
    pub fn open(path: &Path, seed: Option<PieceSeed>) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open results file: {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
            path: path.to_owned(),
            seed,
        })
    }

    /// Opens the sink behind the zero-score policy.
    pub fn open_skipping_zero(
        path: &Path,
        seed: Option<PieceSeed>,
    ) -> anyhow::Result<SkipZeroScore<Self>> {
        Ok(SkipZeroScore::new(Self::open(path, seed)?))
    }
}

impl ResultsSink for JsonLinesSink {
    type Error = anyhow::Error;

    fn submit(&mut self, result: &GameResult) -> anyhow::Result<()> {
        let record = ResultRecord {
            finished_at: Utc::now(),
            seed: self.seed,
            result: *result,
        };
        serde_json::to_writer(&mut self.writer, &record)
            .with_context(|| format!("Failed to write result to {}", self.path.display()))?;
        writeln!(self.writer)?;
        self.writer
            .flush()
            .with_context(|| format!("Failed to flush {}", self.path.display()))?;
        log::info!(
            "saved result (score {}) to {}",
            result.final_score,
            self.path.display()
        );
        Ok(())
    }
}

use std::convert::Infallible;

use serde::{Deserialize, Serialize};

/// Final outcome of a session, captured at the moment it ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameResult {
    pub final_score: u64,
    pub bonus_tickets: u32,
    pub level: u32,
    pub cleared_lines: u32,
}

/// Receiver of finished sessions.
///
/// Persistence, ticket issuance and leaderboards live behind this trait; the
/// engine only hands over the captured [`GameResult`].
pub trait ResultsSink {
    type Error;

    fn submit(&mut self, result: &GameResult) -> Result<(), Self::Error>;
}

impl<S> ResultsSink for &mut S
where
    S: ResultsSink + ?Sized,
{
    type Error = S::Error;

    fn submit(&mut self, result: &GameResult) -> Result<(), Self::Error> {
        (**self).submit(result)
    }
}

/// Drops results with a zero score instead of forwarding them.
///
/// # Example
///
/// ```
/// use dragontris_engine::{GameResult, MemoryResultsSink, ResultsSink as _, SkipZeroScore};
///
/// let mut sink = SkipZeroScore::new(MemoryResultsSink::default());
/// let empty = GameResult { final_score: 0, bonus_tickets: 0, level: 1, cleared_lines: 0 };
/// let scored = GameResult { final_score: 300, ..empty };
/// sink.submit(&empty).unwrap();
/// sink.submit(&scored).unwrap();
/// assert_eq!(sink.into_inner().results(), &[scored]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SkipZeroScore<S> {
    inner: S,
}

impl<S> SkipZeroScore<S> {
    #[must_use]
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    #[must_use]
    pub fn inner(&self) -> &S {
        &self.inner
    }

    #[must_use]
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S> ResultsSink for SkipZeroScore<S>
where
    S: ResultsSink,
{
    type Error = S::Error;

    fn submit(&mut self, result: &GameResult) -> Result<(), Self::Error> {
        if result.final_score == 0 {
            log::warn!("skipping result with zero score");
            return Ok(());
        }
        self.inner.submit(result)
    }
}

/// Keeps submitted results in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryResultsSink {
    results: Vec<GameResult>,
}

impl MemoryResultsSink {
    #[must_use]
    pub fn results(&self) -> &[GameResult] {
        &self.results
    }
}

impl ResultsSink for MemoryResultsSink {
    type Error = Infallible;

    fn submit(&mut self, result: &GameResult) -> Result<(), Self::Error> {
        self.results.push(*result);
        Ok(())
    }
}

use serde::{Deserialize, Serialize};

/// Score values for line clears, before the level multiplier.
///
/// Index corresponds to number of lines cleared simultaneously:
/// - 0 lines: 0 points
/// - 1 line: 100 points
/// - 2 lines: 300 points
/// - 3 lines: 500 points
/// - 4 lines: 800 points
pub const LINE_POINTS: [u64; 5] = [0, 100, 300, 500, 800];

/// Highest reachable level.
pub const MAX_LEVEL: u32 = 10;

/// Lines needed to advance one level.
pub const LINES_PER_LEVEL: u32 = 10;

/// Score thresholds and the bonus tickets they grant, highest tier first.
pub const BONUS_TICKET_TIERS: [(u64, u32); 3] = [(15_000, 5), (10_000, 2), (5_000, 1)];

/// Returns the number of bonus tickets a score is worth.
///
/// This is a step function of the current score, not a running total: a
/// penalty that drops the score below a threshold also drops the tickets.
///
/// # Examples
///
/// ```
/// use dragontris_engine::bonus_tickets;
///
/// assert_eq!(bonus_tickets(4_999), 0);
/// assert_eq!(bonus_tickets(5_000), 1);
/// assert_eq!(bonus_tickets(12_000), 2);
/// assert_eq!(bonus_tickets(15_000), 5);
/// ```
#[must_use]
pub fn bonus_tickets(score: u64) -> u32 {
    BONUS_TICKET_TIERS
        .iter()
        .find(|(threshold, _)| score >= *threshold)
        .map_or(0, |(_, tickets)| *tickets)
}

/// Returns the level for a total line count, in `1..=MAX_LEVEL`.
#[must_use]
pub fn level_for_lines(cleared_lines: u32) -> u32 {
    (cleared_lines / LINES_PER_LEVEL + 1).min(MAX_LEVEL)
}

/// Outcome of awarding a line clear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineClearAward {
    pub points: u64,
    pub previous_level: u32,
    pub level: u32,
}

impl LineClearAward {
    #[must_use]
    pub fn is_level_up(&self) -> bool {
        self.level > self.previous_level
    }
}

/// Session statistics: score, lines, and derived level and tickets.
///
/// - **Score**: line clear points multiplied by the level at the time of the
///   clear, minus ghost penalties, never below zero
/// - **Level**: `min(10, lines / 10 + 1)`
/// - **Bonus tickets**: recomputed from the score on every read
/// - **Completed pieces** and a histogram of line clears by count
///
/// # Example
///
/// ```
/// use dragontris_engine::SessionStats;
///
/// let stats = SessionStats::new();
/// assert_eq!(stats.score(), 0);
/// assert_eq!(stats.level(), 1);
/// assert_eq!(stats.bonus_tickets(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SessionStats {
    score: u64,
    cleared_lines: u32,
    completed_pieces: u32,
    line_cleared_counter: [u32; 5],
}

impl SessionStats {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            cleared_lines: 0,
            completed_pieces: 0,
            line_cleared_counter: [0; 5],
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn cleared_lines(&self) -> u32 {
        self.cleared_lines
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        level_for_lines(self.cleared_lines)
    }

    #[must_use]
    pub fn bonus_tickets(&self) -> u32 {
        bonus_tickets(self.score)
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> u32 {
        self.completed_pieces
    }

    /// Returns a histogram of locks by number of lines cleared.
    ///
    /// `[0]` counts locks that cleared nothing, `[4]` counts tetrises.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[u32; 5] {
        &self.line_cleared_counter
    }

    /// Records a lock. Lines are credited separately once the clear finishes.
    pub(crate) fn complete_piece_lock(&mut self, full_rows: usize) {
        self.completed_pieces += 1;
        let slot = full_rows.min(self.line_cleared_counter.len() - 1);
        self.line_cleared_counter[slot] += 1;
    }

    /// Subtracts a penalty from the score, flooring at zero. Returns the amount taken.
    pub(crate) fn apply_penalty(&mut self, penalty: u64) -> u64 {
        let before = self.score;
        self.score = self.score.saturating_sub(penalty);
        before - self.score
    }

    /// Credits a finished line clear at the level in effect before the clear.
    pub(crate) fn award_line_clear(&mut self, lines: usize) -> LineClearAward {
        let previous_level = self.level();
        let points = LINE_POINTS[lines.min(LINE_POINTS.len() - 1)] * u64::from(previous_level);
        self.score = self.score.saturating_add(points);
        self.cleared_lines = self
            .cleared_lines
            .saturating_add(u32::try_from(lines).unwrap_or(u32::MAX));
        LineClearAward {
            points,
            previous_level,
            level: self.level(),
        }
    }

    pub(crate) fn set_cleared_lines(&mut self, cleared_lines: u32) {
        self.cleared_lines = cleared_lines;
    }
}

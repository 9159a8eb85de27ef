use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::game_stats::MAX_LEVEL;

/// How long a penalty notification stays in the snapshot.
pub const GHOST_PENALTY_DISPLAY: Duration = Duration::from_millis(2000);

/// Score cost of one lock with ghost enabled, indexed by `level - 1`.
///
/// Zero means ghost is not available at that level.
const GHOST_PENALTIES: [u64; MAX_LEVEL as usize] = [3, 5, 0, 0, 0, 0, 10, 12, 15, 20];

/// Returns the per-lock ghost penalty at `level`, or 0 where ghost is forbidden.
#[must_use]
pub fn ghost_penalty(level: u32) -> u64 {
    usize::try_from(level)
        .ok()
        .and_then(|level| level.checked_sub(1))
        .and_then(|index| GHOST_PENALTIES.get(index))
        .copied()
        .unwrap_or(0)
}

/// Returns whether the ghost piece may be enabled at `level`.
///
/// This is the single rule consulted both by the toggle command and on every
/// level transition.
///
/// # Examples
///
/// ```
/// use dragontris_engine::is_ghost_allowed;
///
/// assert!(is_ghost_allowed(1));
/// assert!(!is_ghost_allowed(4));
/// assert!(is_ghost_allowed(10));
/// ```
#[must_use]
pub fn is_ghost_allowed(level: u32) -> bool {
    matches!(level, 1 | 2 | 7..=10)
}

/// Player's ghost toggle, subject to the level rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GhostState {
    enabled: bool,
}

impl GhostState {
    #[must_use]
    pub fn is_enabled(self) -> bool {
        self.enabled
    }

    /// Flips the toggle. Returns `false` and leaves it off when the level forbids ghost.
    pub(crate) fn toggle(&mut self, level: u32) -> bool {
        if !is_ghost_allowed(level) {
            self.enabled = false;
            return false;
        }
        self.enabled = !self.enabled;
        true
    }

    /// Forces ghost off when entering a level that forbids it.
    pub(crate) fn enforce_level_rule(&mut self, level: u32) {
        if !is_ghost_allowed(level) {
            self.enabled = false;
        }
    }

    pub(crate) fn disable(&mut self) {
        self.enabled = false;
    }

    /// Penalty charged for one lock at `level`, or `None` when nothing is charged.
    pub(crate) fn lock_penalty(self, level: u32) -> Option<u64> {
        let penalty = ghost_penalty(level);
        (self.enabled && penalty > 0).then_some(penalty)
    }
}

/// Transient notification of a ghost penalty, for presentation only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PenaltyEvent {
    /// Unique within a session, increasing.
    pub id: u64,
    /// Penalty charged for the lock; the score itself stops at zero.
    pub amount: u64,
    pub level: u32,
    /// Session time after which the event is dropped.
    pub expires_at: Duration,
}

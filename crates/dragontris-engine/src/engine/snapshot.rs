use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{Board, Piece, PieceKind, RowIndices};

use super::{PenaltyEvent, SessionState, SessionStats};

/// Kind of the most recent gameplay action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionKind {
    Move,
    Rotate,
    Drop,
    Lock,
}

/// The most recent gameplay action, for presentation effects.
///
/// `id` increases by one for every action in the session, so a renderer can
/// tell two identical consecutive actions apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastAction {
    pub id: u64,
    pub kind: ActionKind,
    pub piece: PieceKind,
}

/// Read-only copy of everything a renderer needs for one frame.
///
/// Snapshots own their data; nothing in them aliases the session.
#[derive(Debug, Clone)]
pub struct GameSnapshot {
    pub session_state: SessionState,
    pub board: Board,
    pub active_piece: Option<Piece>,
    /// Landing position of the active piece, present only while ghost is enabled.
    pub ghost_piece: Option<Piece>,
    pub next_piece: PieceKind,
    pub ghost_enabled: bool,
    pub ghost_allowed: bool,
    /// Score cost per lock at the current level if ghost were enabled.
    pub ghost_penalty: u64,
    /// Rows being cleared, empty when no clear animation is running.
    pub clearing_rows: RowIndices,
    pub stats: SessionStats,
    pub penalty_events: Vec<PenaltyEvent>,
    pub gravity_interval: Duration,
    pub last_action: Option<LastAction>,
}

impl GameSnapshot {
    #[must_use]
    pub fn is_clearing(&self) -> bool {
        !self.clearing_rows.is_empty()
    }
}

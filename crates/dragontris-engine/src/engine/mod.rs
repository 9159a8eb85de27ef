//! Game rules, timing, and session state.
//!
//! This module drives the [`core`](crate::core) primitives through a full game:
//!
//! - [`GameSession`] - the state machine owning board, pieces, stats and timers
//! - [`SessionStats`] - score, lines, level and bonus tickets
//! - [`GhostState`] - the level-gated ghost toggle and its lock penalty
//! - [`Gravity`] - level-dependent automatic drop timing
//! - [`PieceQueue`] / [`PieceSeed`] - seeded uniform piece source with one lookahead
//! - [`GameSnapshot`] - read-only view for renderers
//! - [`ResultsSink`] - receiver of finished games
//! - [`Command`] / [`SwipeTracker`] - player input
//!
//! # Game Flow
//!
//! 1. [`GameSession::start`] resets the board and spawns the first piece
//! 2. Commands move or rotate the falling piece; [`GameSession::tick`] applies gravity
//! 3. A piece that cannot fall further locks, charging the ghost penalty if enabled
//! 4. Full rows are held for a short animation, then removed and scored
//! 5. Every ten lines the level rises and the session waits for acknowledgment
//! 6. A piece that locks above the board or cannot spawn ends the game
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//!
//! use dragontris_engine::{Command, GameSession, MemoryResultsSink, SessionConfig};
//!
//! let mut session = GameSession::new(SessionConfig::default());
//! session.start(Duration::ZERO).unwrap();
//!
//! // Hold soft drop until the stack reaches the top.
//! let mut now = Duration::ZERO;
//! while !session.session_state().is_game_over() {
//!     now += Duration::from_millis(1);
//!     _ = session.apply(Command::SoftDrop, now);
//!     session.tick(now);
//! }
//!
//! let mut sink = MemoryResultsSink::default();
//! session.report_result(&mut sink).unwrap();
//! assert_eq!(sink.results().len(), 1);
//! ```

pub use self::{
    game_stats::*, ghost::*, gravity::*, input::*, piece_queue::*, results::*, session::*,
    snapshot::*,
};

mod game_stats;
mod ghost;
mod gravity;
mod input;
mod piece_queue;
mod results;
mod session;
mod snapshot;

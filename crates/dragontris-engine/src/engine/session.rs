use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::{
    Board, CommandError, Piece, PieceKind, RowIndices, Shift,
    engine::{
        game_stats::{MAX_LEVEL, SessionStats, level_for_lines},
        ghost::{GHOST_PENALTY_DISPLAY, GhostState, PenaltyEvent, ghost_penalty, is_ghost_allowed},
        gravity::Gravity,
        input::Command,
        piece_queue::{PieceQueue, PieceSeed},
        results::{GameResult, ResultsSink},
        snapshot::{ActionKind, GameSnapshot, LastAction},
    },
};

/// Hold before cleared rows disappear.
pub const LINE_CLEAR_DELAY: Duration = Duration::from_millis(500);
/// Hold before cleared rows disappear when four rows clear at once.
pub const TETRIS_CLEAR_DELAY: Duration = Duration::from_millis(1000);
/// Rows cleared by a single lock that count as a tetris.
pub const TETRIS_LINES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant, Serialize, Deserialize)]
pub enum SessionState {
    NotStarted,
    Playing,
    Paused,
    /// Interstitial after a level change, waiting for [`Command::AcknowledgeLevelUp`].
    LevelUp,
    GameOver,
}

/// Settings fixed for the lifetime of a [`GameSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for the piece sequence. `None` draws a fresh seed.
    pub seed: Option<PieceSeed>,
    /// Accept [`Command::JumpToLevel`].
    pub debug_commands: bool,
}

#[derive(Debug, Clone)]
struct LineClear {
    rows: RowIndices,
    deadline: Duration,
}

/// A single game from first spawn to game over.
///
/// The session is the only owner of mutable game state. It is driven by two
/// calls: [`apply`](Self::apply) for player commands and [`tick`](Self::tick)
/// once per frame. Both take the current time as a [`Duration`] from any fixed
/// epoch; all delays are deadlines compared against it, so nothing blocks.
///
/// ```text
/// NotStarted ─start─▶ Playing ⇄ Paused
///                        │ ▲
///              level up  ▼ │ acknowledge
///                      LevelUp
///                        │
/// Playing ─top out─▶ GameOver ─start─▶ Playing
/// ```
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use dragontris_engine::{Command, GameSession, SessionConfig};
///
/// let mut session = GameSession::new(SessionConfig::default());
/// session.start(Duration::ZERO).unwrap();
///
/// // Rejected moves are plain errors the caller may ignore.
/// _ = session.apply(Command::MoveLeft, Duration::from_millis(10));
/// session.tick(Duration::from_millis(16));
///
/// let snapshot = session.snapshot();
/// assert!(snapshot.session_state.is_playing());
/// assert!(snapshot.active_piece.is_some());
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    state: SessionState,
    board: Board,
    falling_piece: Option<Piece>,
    queue: PieceQueue,
    stats: SessionStats,
    ghost: GhostState,
    gravity: Gravity,
    line_clear: Option<LineClear>,
    penalty_events: Vec<PenaltyEvent>,
    next_event_id: u64,
    last_action: Option<LastAction>,
    next_action_id: u64,
    last_tick: Option<Duration>,
    paused_at: Option<Duration>,
    result: Option<GameResult>,
    result_reported: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl GameSession {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        let queue = config.seed.map_or_else(PieceQueue::new, PieceQueue::with_seed);
        Self {
            config,
            state: SessionState::NotStarted,
            board: Board::EMPTY,
            falling_piece: None,
            queue,
            stats: SessionStats::new(),
            ghost: GhostState::default(),
            gravity: Gravity::new(1),
            line_clear: None,
            penalty_events: Vec::new(),
            next_event_id: 0,
            last_action: None,
            next_action_id: 0,
            last_tick: None,
            paused_at: None,
            result: None,
            result_reported: false,
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn session_state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn falling_piece(&self) -> Option<Piece> {
        self.falling_piece
    }

    #[must_use]
    pub fn next_piece(&self) -> PieceKind {
        self.queue.peek_next()
    }

    #[must_use]
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    #[must_use]
    pub fn is_ghost_enabled(&self) -> bool {
        self.ghost.is_enabled()
    }

    #[must_use]
    pub fn gravity_interval(&self) -> Duration {
        self.gravity.interval()
    }

    /// Rows currently held for the clear animation.
    #[must_use]
    pub fn clearing_rows(&self) -> &[usize] {
        self.line_clear
            .as_ref()
            .map_or(&[][..], |clear| clear.rows.as_slice())
    }

    /// Result captured when the session ended, if it has.
    #[must_use]
    pub fn result(&self) -> Option<&GameResult> {
        self.result.as_ref()
    }

    /// Starts a fresh game from `NotStarted` or `GameOver`.
    ///
    /// Board, statistics and gravity are reset, ghost is turned off, and the
    /// first piece spawns. The piece stream continues where it left off.
    pub fn start(&mut self, now: Duration) -> Result<(), CommandError> {
        if !matches!(self.state, SessionState::NotStarted | SessionState::GameOver) {
            return Err(CommandError::NotAccepted);
        }
        self.board = Board::EMPTY;
        self.falling_piece = None;
        self.stats = SessionStats::new();
        self.ghost.disable();
        self.gravity = Gravity::new(self.stats.level());
        self.line_clear = None;
        self.penalty_events.clear();
        self.last_action = None;
        self.last_tick = Some(now);
        self.paused_at = None;
        self.result = None;
        self.result_reported = false;
        self.state = SessionState::Playing;
        log::info!("session started");
        self.spawn_next();
        Ok(())
    }

    /// Applies one player command.
    ///
    /// Movement commands are accepted only while playing with a piece in
    /// flight and no clear animation running. A rejected command leaves the
    /// session untouched.
    pub fn apply(&mut self, command: Command, now: Duration) -> Result<(), CommandError> {
        match command {
            Command::MoveLeft => self.move_piece(Shift::Left),
            Command::MoveRight => self.move_piece(Shift::Right),
            Command::SoftDrop => self.soft_drop(now),
            Command::Rotate => self.rotate_piece(),
            Command::TogglePause => self.toggle_pause(now),
            Command::ToggleGhost => self.toggle_ghost(),
            Command::AcknowledgeLevelUp => self.acknowledge_level_up(now),
            Command::JumpToLevel(level) => self.jump_to_level(level),
        }
    }

    /// Advances time to `now`.
    ///
    /// Expired penalty events are dropped first. While playing, a running
    /// clear animation finishes once its deadline passes; otherwise gravity
    /// accumulates and performs at most one drop. Paused, level-up and
    /// game-over sessions only record the time, so gravity does not build up.
    pub fn tick(&mut self, now: Duration) {
        let elapsed = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_sub(last));
        self.last_tick = Some(now);
        self.penalty_events.retain(|event| event.expires_at > now);

        if !self.state.is_playing() {
            return;
        }

        if let Some(clear) = &self.line_clear {
            if now >= clear.deadline {
                self.finish_line_clear();
            }
            return;
        }

        if self.gravity.advance(elapsed) {
            self.gravity_step(now);
        }
    }

    /// Returns an owned copy of the state a renderer needs.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let level = self.stats.level();
        let ghost_piece = self
            .falling_piece
            .filter(|_| self.ghost.is_enabled())
            .map(|piece| piece.simulate_drop_position(&self.board));
        GameSnapshot {
            session_state: self.state,
            board: self.board.clone(),
            active_piece: self.falling_piece,
            ghost_piece,
            next_piece: self.queue.peek_next(),
            ghost_enabled: self.ghost.is_enabled(),
            ghost_allowed: is_ghost_allowed(level),
            ghost_penalty: ghost_penalty(level),
            clearing_rows: self
                .line_clear
                .as_ref()
                .map(|clear| clear.rows.clone())
                .unwrap_or_default(),
            stats: self.stats.clone(),
            penalty_events: self.penalty_events.clone(),
            gravity_interval: self.gravity.interval(),
            last_action: self.last_action,
        }
    }

    /// Hands the captured result to `sink`, once per finished game.
    ///
    /// Returns `Ok(false)` when there is nothing to report: the game is still
    /// running or its result was already submitted.
    pub fn report_result<S>(&mut self, sink: &mut S) -> Result<bool, S::Error>
    where
        S: ResultsSink + ?Sized,
    {
        let Some(result) = self.result.filter(|_| !self.result_reported) else {
            return Ok(false);
        };
        sink.submit(&result)?;
        self.result_reported = true;
        Ok(true)
    }

    fn active_piece(&self) -> Result<Piece, CommandError> {
        if !self.state.is_playing() || self.line_clear.is_some() {
            return Err(CommandError::NotAccepted);
        }
        self.falling_piece.ok_or(CommandError::NotAccepted)
    }

    fn record_action(&mut self, kind: ActionKind, piece: PieceKind) {
        self.next_action_id += 1;
        self.last_action = Some(LastAction {
            id: self.next_action_id,
            kind,
            piece,
        });
    }

    fn move_piece(&mut self, shift: Shift) -> Result<(), CommandError> {
        let piece = self.active_piece()?.try_shift(shift, &self.board)?;
        self.falling_piece = Some(piece);
        self.record_action(ActionKind::Move, piece.kind());
        Ok(())
    }

    fn rotate_piece(&mut self) -> Result<(), CommandError> {
        let piece = self.active_piece()?.try_rotate(&self.board)?;
        self.falling_piece = Some(piece);
        self.record_action(ActionKind::Rotate, piece.kind());
        Ok(())
    }

    /// Manual drop: one row down, or lock if blocked. Restarts gravity either way.
    fn soft_drop(&mut self, now: Duration) -> Result<(), CommandError> {
        let piece = self.active_piece()?;
        match piece.try_shift(Shift::Down, &self.board) {
            Ok(piece) => {
                self.falling_piece = Some(piece);
                self.record_action(ActionKind::Drop, piece.kind());
            }
            Err(_) => self.lock_falling_piece(now),
        }
        self.gravity.reset();
        Ok(())
    }

    fn gravity_step(&mut self, now: Duration) {
        let Some(piece) = self.falling_piece else {
            return;
        };
        match piece.try_shift(Shift::Down, &self.board) {
            Ok(piece) => self.falling_piece = Some(piece),
            Err(_) => self.lock_falling_piece(now),
        }
    }

    fn spawn_next(&mut self) {
        let kind = self.queue.pop_next();
        match Piece::spawn(kind, &self.board) {
            Ok(piece) => {
                log::debug!("spawned {}", kind.as_char());
                self.falling_piece = Some(piece);
            }
            Err(e) => {
                log::info!("cannot spawn {}: {e}", kind.as_char());
                self.game_over();
            }
        }
    }

    fn lock_falling_piece(&mut self, now: Duration) {
        let Some(piece) = self.falling_piece.take() else {
            return;
        };

        let mut board = self.board.clone();
        if let Err(e) = board.fill_piece(piece) {
            log::info!("cannot lock {}: {e}", piece.kind().as_char());
            self.game_over();
            return;
        }
        self.board = board;

        let full_rows = self.board.full_rows();
        self.stats.complete_piece_lock(full_rows.len());
        self.record_action(ActionKind::Lock, piece.kind());
        log::debug!(
            "locked {} at ({}, {}), {} full rows",
            piece.kind().as_char(),
            piece.position().x(),
            piece.position().y(),
            full_rows.len()
        );

        let level = self.stats.level();
        if let Some(penalty) = self.ghost.lock_penalty(level) {
            self.stats.apply_penalty(penalty);
            self.next_event_id += 1;
            self.penalty_events.push(PenaltyEvent {
                id: self.next_event_id,
                amount: penalty,
                level,
                expires_at: now.saturating_add(GHOST_PENALTY_DISPLAY),
            });
            log::info!(
                "ghost penalty -{penalty} at level {level}, score {}",
                self.stats.score()
            );
        }

        if full_rows.is_empty() {
            self.spawn_next();
            return;
        }

        let delay = if full_rows.len() >= TETRIS_LINES {
            TETRIS_CLEAR_DELAY
        } else {
            LINE_CLEAR_DELAY
        };
        self.line_clear = Some(LineClear {
            rows: full_rows,
            deadline: now.saturating_add(delay),
        });
    }

    fn finish_line_clear(&mut self) {
        let Some(clear) = self.line_clear.take() else {
            return;
        };
        self.board.clear_rows(&clear.rows);
        let award = self.stats.award_line_clear(clear.rows.len());
        log::info!(
            "cleared {} lines for {} points, score {}",
            clear.rows.len(),
            award.points,
            self.stats.score()
        );

        self.gravity.set_level(award.level);
        self.ghost.enforce_level_rule(award.level);

        if award.is_level_up() {
            log::info!("level up: {} -> {}", award.previous_level, award.level);
            self.enter_level_up();
        } else {
            self.spawn_next();
        }
    }

    fn enter_level_up(&mut self) {
        self.board = Board::EMPTY;
        self.falling_piece = None;
        self.line_clear = None;
        self.paused_at = None;
        self.gravity.reset();
        self.state = SessionState::LevelUp;
    }

    fn acknowledge_level_up(&mut self, now: Duration) -> Result<(), CommandError> {
        if !self.state.is_level_up() {
            return Err(CommandError::NotAccepted);
        }
        self.state = SessionState::Playing;
        self.gravity.reset();
        self.last_tick = Some(now);
        self.spawn_next();
        Ok(())
    }

    fn jump_to_level(&mut self, level: u32) -> Result<(), CommandError> {
        let in_game = matches!(
            self.state,
            SessionState::Playing | SessionState::Paused | SessionState::LevelUp
        );
        if !self.config.debug_commands || !in_game {
            return Err(CommandError::NotAccepted);
        }
        let level = level.clamp(1, MAX_LEVEL);
        self.stats
            .set_cleared_lines((level - 1) * crate::LINES_PER_LEVEL);
        debug_assert_eq!(level_for_lines(self.stats.cleared_lines()), level);
        self.gravity.set_level(level);
        self.ghost.enforce_level_rule(level);
        log::info!("debug jump to level {level}");
        self.enter_level_up();
        Ok(())
    }

    fn toggle_pause(&mut self, now: Duration) -> Result<(), CommandError> {
        match self.state {
            SessionState::Playing => {
                self.state = SessionState::Paused;
                self.paused_at = Some(now);
            }
            SessionState::Paused => {
                let paused_for = self
                    .paused_at
                    .take()
                    .map_or(Duration::ZERO, |at| now.saturating_sub(at));
                if let Some(clear) = &mut self.line_clear {
                    clear.deadline = clear.deadline.saturating_add(paused_for);
                }
                // Time spent paused never reaches gravity, ticked or not.
                self.last_tick = Some(now);
                self.state = SessionState::Playing;
            }
            SessionState::NotStarted | SessionState::LevelUp | SessionState::GameOver => {
                return Err(CommandError::NotAccepted);
            }
        }
        Ok(())
    }

    fn toggle_ghost(&mut self) -> Result<(), CommandError> {
        if matches!(self.state, SessionState::NotStarted | SessionState::GameOver) {
            return Err(CommandError::NotAccepted);
        }
        let level = self.stats.level();
        if !self.ghost.toggle(level) {
            return Err(CommandError::GhostUnavailable);
        }
        log::info!(
            "ghost {} at level {level}",
            if self.ghost.is_enabled() { "on" } else { "off" }
        );
        Ok(())
    }

    fn game_over(&mut self) {
        self.falling_piece = None;
        self.line_clear = None;
        self.paused_at = None;
        self.state = SessionState::GameOver;
        let result = GameResult {
            final_score: self.stats.score(),
            bonus_tickets: self.stats.bonus_tickets(),
            level: self.stats.level(),
            cleared_lines: self.stats.cleared_lines(),
        };
        log::info!(
            "game over: score {}, {} tickets",
            result.final_score,
            result.bonus_tickets
        );
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BOARD_HEIGHT, BOARD_WIDTH, Cell, MemoryResultsSink, PiecePosition};

    const FLOOR: usize = BOARD_HEIGHT - 1;

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn seed() -> PieceSeed {
        "00112233445566778899aabbccddeeff".parse().unwrap()
    }

    fn started_session() -> GameSession {
        let mut session = GameSession::new(SessionConfig {
            seed: Some(seed()),
            debug_commands: true,
        });
        session.start(Duration::ZERO).unwrap();
        session
    }

    /// Session with an O-piece at spawn and the bottom row filled except columns 4 and 5.
    fn session_with_gap_for_o() -> GameSession {
        let mut session = started_session();
        for x in (0..BOARD_WIDTH).filter(|x| !(4..=5).contains(x)) {
            session.board.fill_cell(x, FLOOR, PieceKind::J);
        }
        session.falling_piece = Some(Piece::new(PieceKind::O));
        session
    }

    /// Soft-drops until the current piece locks. Returns the time after the lock.
    fn drop_until_lock(session: &mut GameSession, mut now: Duration) -> Duration {
        let locks = session.stats.completed_pieces();
        while session.stats.completed_pieces() == locks && session.state.is_playing() {
            now += ms(1);
            session.apply(Command::SoftDrop, now).unwrap();
        }
        now
    }

    #[test]
    fn test_new_session_waits_for_start() {
        let mut session = GameSession::default();
        assert!(session.session_state().is_not_started());
        assert_eq!(
            session.apply(Command::MoveLeft, Duration::ZERO),
            Err(CommandError::NotAccepted)
        );
        session.tick(ms(5000));
        assert!(session.falling_piece().is_none());
    }

    #[test]
    fn test_start_spawns_with_lookahead() {
        let mut session = GameSession::new(SessionConfig {
            seed: Some(seed()),
            ..SessionConfig::default()
        });
        let first = session.next_piece();
        session.start(Duration::ZERO).unwrap();
        let piece = session.falling_piece().unwrap();
        assert_eq!(piece.kind(), first);
        assert_eq!(piece.position(), PiecePosition::SPAWN);
        assert_eq!(session.gravity_interval(), ms(1000));
        assert!(!session.is_ghost_enabled());
        assert_eq!(session.start(ms(1)), Err(CommandError::NotAccepted));
    }

    #[test]
    fn test_same_seed_same_pieces() {
        let mut a = started_session();
        let mut b = started_session();
        for _ in 0..10 {
            assert_eq!(a.falling_piece(), b.falling_piece());
            assert_eq!(a.next_piece(), b.next_piece());
            a.spawn_next();
            b.spawn_next();
        }
    }

    #[test]
    fn test_drop_on_empty_board_locks_once_and_spawns() {
        let mut session = started_session();
        session.falling_piece = Some(Piece::new(PieceKind::O));
        let next = session.next_piece();

        // Gravity: strictly more than 1000 ms per row.
        let mut now = Duration::ZERO;
        for _ in 0..20 {
            now += ms(1001);
            session.tick(now);
        }
        assert_eq!(
            session.falling_piece().unwrap().position(),
            PiecePosition::new(4, 18)
        );
        assert_eq!(session.stats().completed_pieces(), 0);

        now += ms(1001);
        session.tick(now);
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(session.stats().score(), 0);
        assert!(session.clearing_rows().is_empty());
        assert_eq!(session.board().cell(4, 19), Some(Cell::Occupied(PieceKind::O)));
        let spawned = session.falling_piece().unwrap();
        assert_eq!(spawned.kind(), next);
        assert_eq!(spawned.position(), PiecePosition::SPAWN);
    }

    #[test]
    fn test_gravity_waits_on_exact_interval() {
        let mut session = started_session();
        let before = session.falling_piece().unwrap();
        session.tick(ms(1000));
        assert_eq!(session.falling_piece(), Some(before));
        session.tick(ms(1001));
        assert_eq!(
            session.falling_piece().unwrap().position(),
            before.position().offset(0, 1)
        );
    }

    #[test]
    fn test_single_line_clear_after_delay() {
        let mut session = session_with_gap_for_o();
        let now = drop_until_lock(&mut session, Duration::ZERO);

        assert_eq!(session.board().full_rows().as_slice(), &[FLOOR]);
        assert_eq!(session.clearing_rows(), &[FLOOR]);
        assert!(session.falling_piece().is_none());
        assert_eq!(session.stats().score(), 0);

        // Input and gravity are suspended during the animation.
        assert_eq!(
            session.apply(Command::MoveLeft, now),
            Err(CommandError::NotAccepted)
        );
        session.tick(now + LINE_CLEAR_DELAY - ms(1));
        assert_eq!(session.clearing_rows(), &[FLOOR]);
        assert!(session.falling_piece().is_none());

        session.tick(now + LINE_CLEAR_DELAY);
        assert!(session.clearing_rows().is_empty());
        assert_eq!(session.stats().score(), 100);
        assert_eq!(session.stats().cleared_lines(), 1);
        assert!(session.board().full_rows().is_empty());
        // The top half of the O-piece dropped into the bottom row.
        assert_eq!(session.board().cell(4, 19), Some(Cell::Occupied(PieceKind::O)));
        assert_eq!(session.board().cell(0, 19), Some(Cell::Empty));
        assert!(session.falling_piece().is_some());
    }

    #[test]
    fn test_tetris_uses_longer_delay() {
        let mut session = started_session();
        for y in BOARD_HEIGHT - 4..BOARD_HEIGHT {
            for x in (0..BOARD_WIDTH).filter(|&x| x != 5) {
                session.board.fill_cell(x, y, PieceKind::L);
            }
        }
        session.falling_piece = Some(Piece::new(PieceKind::I));
        let now = drop_until_lock(&mut session, Duration::ZERO);
        assert_eq!(session.clearing_rows().len(), 4);

        session.tick(now + LINE_CLEAR_DELAY);
        assert_eq!(session.clearing_rows().len(), 4);
        session.tick(now + TETRIS_CLEAR_DELAY);
        assert!(session.board().is_empty());
        assert_eq!(session.stats().score(), 800);
        assert_eq!(session.stats().line_cleared_counter()[4], 1);
    }

    #[test]
    fn test_tenth_line_enters_level_up() {
        let mut session = session_with_gap_for_o();
        session.stats.set_cleared_lines(9);
        let now = drop_until_lock(&mut session, Duration::ZERO);
        session.tick(now + LINE_CLEAR_DELAY);

        assert!(session.session_state().is_level_up());
        assert_eq!(session.stats().level(), 2);
        assert_eq!(session.stats().score(), 100);
        assert_eq!(session.gravity_interval(), ms(810));
        assert!(session.board().is_empty());
        assert!(session.falling_piece().is_none());

        // No spawn or gravity until acknowledged.
        session.tick(now + ms(10_000));
        assert!(session.falling_piece().is_none());
        assert_eq!(
            session.apply(Command::Rotate, now + ms(10_000)),
            Err(CommandError::NotAccepted)
        );

        session
            .apply(Command::AcknowledgeLevelUp, now + ms(10_001))
            .unwrap();
        assert!(session.session_state().is_playing());
        assert!(session.falling_piece().is_some());
        assert_eq!(
            session.apply(Command::AcknowledgeLevelUp, now + ms(10_002)),
            Err(CommandError::NotAccepted)
        );
    }

    #[test]
    fn test_ghost_penalty_on_lock() {
        let mut session = started_session();
        session.apply(Command::ToggleGhost, Duration::ZERO).unwrap();
        assert!(session.is_ghost_enabled());

        // Floored at zero.
        session.falling_piece = Some(Piece::new(PieceKind::O));
        let now = drop_until_lock(&mut session, Duration::ZERO);
        assert_eq!(session.stats().score(), 0);

        session.stats.award_line_clear(1);
        session.falling_piece = Some(Piece::new(PieceKind::O));
        let now = drop_until_lock(&mut session, now);
        assert_eq!(session.stats().score(), 97);

        let events = session.snapshot().penalty_events;
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.amount == 3 && e.level == 1));
        assert!(events[0].id < events[1].id);

        session.tick(now + GHOST_PENALTY_DISPLAY);
        assert!(session.snapshot().penalty_events.is_empty());
    }

    #[test]
    fn test_ghost_penalty_precedes_line_award() {
        let mut session = session_with_gap_for_o();
        // 7 tetrises at level 1, then trim to just above the first ticket tier.
        for _ in 0..7 {
            session.stats.award_line_clear(4);
            session.stats.set_cleared_lines(0);
        }
        session.stats.apply_penalty(598);
        assert_eq!(session.stats().score(), 5002);
        assert_eq!(session.stats().bonus_tickets(), 1);
        session.apply(Command::ToggleGhost, Duration::ZERO).unwrap();

        let now = drop_until_lock(&mut session, Duration::ZERO);
        assert_eq!(session.clearing_rows(), &[FLOOR]);
        assert_eq!(session.stats().score(), 4999);
        assert_eq!(session.stats().bonus_tickets(), 0);
        assert_eq!(session.snapshot().penalty_events.len(), 1);

        session.tick(now + LINE_CLEAR_DELAY);
        assert!(session.clearing_rows().is_empty());
        assert_eq!(session.stats().score(), 5099);
        assert_eq!(session.stats().bonus_tickets(), 1);
        // Charged once for the lock, not again for the clear.
        assert_eq!(session.snapshot().penalty_events.len(), 1);
    }

    #[test]
    fn test_ghost_piece_in_snapshot() {
        let mut session = started_session();
        session.falling_piece = Some(Piece::new(PieceKind::O));
        assert_eq!(session.snapshot().ghost_piece, None);

        session.apply(Command::ToggleGhost, Duration::ZERO).unwrap();
        let snapshot = session.snapshot();
        assert_eq!(
            snapshot.ghost_piece.map(|piece| piece.position()),
            Some(PiecePosition::new(4, 18))
        );
        assert!(snapshot.ghost_allowed);
        assert_eq!(snapshot.ghost_penalty, 3);
    }

    #[test]
    fn test_ghost_forced_off_entering_level_three() {
        let mut session = session_with_gap_for_o();
        session.stats.set_cleared_lines(19);
        session.apply(Command::ToggleGhost, Duration::ZERO).unwrap();
        let now = drop_until_lock(&mut session, Duration::ZERO);
        session.tick(now + LINE_CLEAR_DELAY);

        assert_eq!(session.stats().level(), 3);
        assert!(!session.is_ghost_enabled());
        assert_eq!(
            session.apply(Command::ToggleGhost, now + ms(600)),
            Err(CommandError::GhostUnavailable)
        );
        assert!(!session.is_ghost_enabled());
    }

    #[test]
    fn test_pause_freezes_gravity() {
        let mut session = started_session();
        let before = session.falling_piece().unwrap();
        session.tick(ms(900));
        session.apply(Command::TogglePause, ms(900)).unwrap();
        session.tick(ms(50_000));
        assert_eq!(session.falling_piece(), Some(before));
        assert_eq!(
            session.apply(Command::MoveRight, ms(50_000)),
            Err(CommandError::NotAccepted)
        );

        session.apply(Command::TogglePause, ms(50_000)).unwrap();
        session.tick(ms(50_100));
        assert_eq!(session.falling_piece(), Some(before));
        session.tick(ms(50_101));
        assert_ne!(session.falling_piece(), Some(before));
    }

    #[test]
    fn test_resume_without_ticks_ignores_paused_time() {
        let mut session = started_session();
        let before = session.falling_piece().unwrap();
        session.tick(ms(100));
        session.apply(Command::TogglePause, ms(100)).unwrap();
        session.apply(Command::TogglePause, ms(60_000)).unwrap();
        session.tick(ms(60_016));
        assert_eq!(session.falling_piece(), Some(before));
    }

    #[test]
    fn test_acknowledge_without_ticks_ignores_interstitial() {
        let mut session = started_session();
        session.apply(Command::JumpToLevel(2), ms(10)).unwrap();
        session
            .apply(Command::AcknowledgeLevelUp, ms(30_000))
            .unwrap();
        session.tick(ms(30_016));
        assert_eq!(
            session.falling_piece().map(|piece| piece.position()),
            Some(PiecePosition::SPAWN)
        );
    }

    #[test]
    fn test_pause_during_clear_extends_deadline() {
        let mut session = session_with_gap_for_o();
        let now = drop_until_lock(&mut session, Duration::ZERO);
        session.apply(Command::TogglePause, now + ms(100)).unwrap();
        session.tick(now + ms(5_000));
        assert_eq!(session.clearing_rows(), &[FLOOR]);
        session.apply(Command::TogglePause, now + ms(5_100)).unwrap();

        // Paused for 5000 ms, so the deadline moved by the same amount.
        session.tick(now + ms(5_000) + LINE_CLEAR_DELAY - ms(1));
        assert_eq!(session.clearing_rows(), &[FLOOR]);
        session.tick(now + ms(5_000) + LINE_CLEAR_DELAY);
        assert!(session.clearing_rows().is_empty());
    }

    #[test]
    fn test_manual_drop_resets_gravity() {
        let mut session = started_session();
        let start = session.falling_piece().unwrap().position();
        session.tick(ms(900));
        session.apply(Command::SoftDrop, ms(900)).unwrap();
        session.tick(ms(1100));
        assert_eq!(session.falling_piece().unwrap().position(), start.offset(0, 1));
        assert_eq!(
            session.snapshot().last_action.map(|action| action.kind),
            Some(ActionKind::Drop)
        );
    }

    #[test]
    fn test_manual_drop_lock_resets_gravity() {
        let mut session = started_session();
        session.falling_piece =
            Some(Piece::new(PieceKind::O).simulate_drop_position(&session.board));
        session.tick(ms(900));
        session.apply(Command::SoftDrop, ms(900)).unwrap();
        assert_eq!(session.stats().completed_pieces(), 1);
        assert_eq!(
            session.snapshot().last_action.map(|action| action.kind),
            Some(ActionKind::Lock)
        );

        // Without the reset, 900 + 200 ms would exceed the interval.
        session.tick(ms(1100));
        assert_eq!(
            session.falling_piece().map(|piece| piece.position()),
            Some(PiecePosition::SPAWN)
        );
    }

    #[test]
    fn test_last_action_ids_increase() {
        let mut session = started_session();
        session.falling_piece = Some(Piece::new(PieceKind::T));
        session.apply(Command::MoveLeft, ms(1)).unwrap();
        let first = session.snapshot().last_action.unwrap();
        session.apply(Command::MoveLeft, ms(2)).unwrap();
        let second = session.snapshot().last_action.unwrap();
        assert_eq!(first.kind, ActionKind::Move);
        assert_eq!(second.id, first.id + 1);
        session.apply(Command::Rotate, ms(3)).unwrap();
        assert_eq!(
            session.snapshot().last_action.map(|action| action.kind),
            Some(ActionKind::Rotate)
        );
    }

    #[test]
    fn test_rejected_move_is_a_no_op() {
        let mut session = started_session();
        session.falling_piece = Some(Piece::new(PieceKind::O));
        for _ in 0..4 {
            session.apply(Command::MoveLeft, ms(1)).unwrap();
        }
        let at_wall = session.falling_piece();
        assert_eq!(
            session.apply(Command::MoveLeft, ms(2)),
            Err(CommandError::Collision(crate::PieceCollisionError))
        );
        assert_eq!(session.falling_piece(), at_wall);
    }

    #[test]
    fn test_lock_above_top_ends_game() {
        let mut session = started_session();
        session.stats.award_line_clear(2);
        for x in 3..=6 {
            session.board.fill_cell(x, 0, PieceKind::S);
        }
        session.falling_piece = Some(Piece::new(PieceKind::O));
        session.apply(Command::SoftDrop, ms(1)).unwrap();

        assert!(session.session_state().is_game_over());
        assert!(session.falling_piece().is_none());
        let result = *session.result().unwrap();
        assert_eq!(result.final_score, 300);
        assert_eq!(result.bonus_tickets, 0);

        // Frozen: nothing changes the captured result.
        assert_eq!(
            session.apply(Command::ToggleGhost, ms(2)),
            Err(CommandError::NotAccepted)
        );
        session.tick(ms(10_000));
        assert_eq!(session.result(), Some(&result));
    }

    #[test]
    fn test_blocked_spawn_ends_game() {
        let mut session = started_session();
        for y in 0..=1 {
            for x in 3..=6 {
                session.board.fill_cell(x, y, PieceKind::T);
            }
        }
        // O, S and Z still fit above the stack; keep spawning until one does not.
        for _ in 0..200 {
            if !session.session_state().is_playing() {
                break;
            }
            session.falling_piece = None;
            session.spawn_next();
        }
        assert!(session.session_state().is_game_over());
        assert!(session.result().is_some());
    }

    #[test]
    fn test_report_result_once() {
        let mut session = started_session();
        let mut sink = MemoryResultsSink::default();
        assert_eq!(session.report_result(&mut sink), Ok(false));

        session.game_over();
        assert_eq!(session.report_result(&mut sink), Ok(true));
        assert_eq!(session.report_result(&mut sink), Ok(false));
        assert_eq!(sink.results().len(), 1);
    }

    #[test]
    fn test_restart_after_game_over() {
        let mut session = started_session();
        session.stats.award_line_clear(1);
        session.board.fill_cell(0, 19, PieceKind::Z);
        session.game_over();

        session.start(ms(100)).unwrap();
        assert!(session.session_state().is_playing());
        assert_eq!(session.stats(), &SessionStats::new());
        assert!(session.result().is_none());
        assert_eq!(session.board().cell(0, 19), Some(Cell::Empty));
        assert!(session.falling_piece().is_some());
    }

    #[test]
    fn test_debug_level_jump() {
        let mut session = started_session();
        session.apply(Command::ToggleGhost, ms(1)).unwrap();
        session.apply(Command::JumpToLevel(5), ms(2)).unwrap();

        assert!(session.session_state().is_level_up());
        assert_eq!(session.stats().level(), 5);
        assert_eq!(session.stats().cleared_lines(), 40);
        assert_eq!(session.gravity_interval(), crate::gravity_interval(5));
        assert!(!session.is_ghost_enabled());

        // Jumping down is an explicit reset.
        session.apply(Command::JumpToLevel(1), ms(3)).unwrap();
        assert_eq!(session.stats().level(), 1);
        session.apply(Command::AcknowledgeLevelUp, ms(4)).unwrap();
        assert!(session.falling_piece().is_some());
    }

    #[test]
    fn test_level_jump_requires_debug() {
        let mut session = GameSession::default();
        session.start(Duration::ZERO).unwrap();
        assert_eq!(
            session.apply(Command::JumpToLevel(3), ms(1)),
            Err(CommandError::NotAccepted)
        );
    }
}

use std::time::Duration;

use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// Logical commands accepted by [`GameSession::apply`](crate::GameSession::apply).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    TogglePause,
    ToggleGhost,
    AcknowledgeLevelUp,
    /// Debug only: jump straight to a level.
    JumpToLevel(u32),
}

/// Horizontal travel that produces one sideways move.
pub const SWIPE_STEP_X: f32 = 20.0;
/// Downward travel that produces one soft drop.
pub const SWIPE_STEP_Y: f32 = 30.0;
/// Longest touch still counted as a tap.
pub const TAP_MAX_DURATION: Duration = Duration::from_millis(300);
/// Largest travel on either axis still counted as a tap.
pub const TAP_MAX_TRAVEL: f32 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Touch {
    start: (f32, f32),
    last: (f32, f32),
    started_at: Duration,
}

/// Turns raw touch points into commands.
///
/// Dragging sideways emits a move each time the finger travels more than
/// [`SWIPE_STEP_X`] from where the previous move fired; dragging down emits a
/// soft drop every [`SWIPE_STEP_Y`]. A short touch that barely moves rotates.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use dragontris_engine::{Command, SwipeTracker};
///
/// let mut swipe = SwipeTracker::default();
/// swipe.touch_start(100.0, 100.0, Duration::ZERO);
/// assert_eq!(swipe.touch_end(102.0, 101.0, Duration::from_millis(120)), Some(Command::Rotate));
///
/// swipe.touch_start(100.0, 100.0, Duration::ZERO);
/// assert_eq!(swipe.touch_move(125.0, 100.0).as_slice(), &[Command::MoveRight]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SwipeTracker {
    touch: Option<Touch>,
}

impl SwipeTracker {
    pub fn touch_start(&mut self, x: f32, y: f32, now: Duration) {
        self.touch = Some(Touch {
            start: (x, y),
            last: (x, y),
            started_at: now,
        });
    }

    /// Reports commands for a finger now at `(x, y)`, at most one per axis.
    pub fn touch_move(&mut self, x: f32, y: f32) -> ArrayVec<Command, 2> {
        let mut commands = ArrayVec::new();
        let Some(touch) = &mut self.touch else {
            return commands;
        };

        let dx = x - touch.last.0;
        if dx.abs() > SWIPE_STEP_X {
            commands.push(if dx > 0.0 {
                Command::MoveRight
            } else {
                Command::MoveLeft
            });
            touch.last.0 = x;
        }

        let dy = y - touch.last.1;
        if dy > SWIPE_STEP_Y {
            commands.push(Command::SoftDrop);
            touch.last.1 = y;
        }
        commands
    }

    /// Finishes the touch, returning [`Command::Rotate`] if it was a tap.
    pub fn touch_end(&mut self, x: f32, y: f32, now: Duration) -> Option<Command> {
        let touch = self.touch.take()?;
        let duration = now.saturating_sub(touch.started_at);
        let travel_x = (x - touch.start.0).abs();
        let travel_y = (y - touch.start.1).abs();
        (duration < TAP_MAX_DURATION && travel_x < TAP_MAX_TRAVEL && travel_y < TAP_MAX_TRAVEL)
            .then_some(Command::Rotate)
    }

    /// Drops any touch in progress without emitting a command.
    pub fn cancel(&mut self) {
        self.touch = None;
    }
}

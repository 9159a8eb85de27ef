use std::time::Duration;

use super::game_stats::MAX_LEVEL;

/// Gravity interval at level 1.
pub const SLOWEST_GRAVITY: Duration = Duration::from_millis(1000);
/// Gravity interval at the maximum level, and the floor for every level.
pub const FASTEST_GRAVITY: Duration = Duration::from_millis(150);

/// Returns the time between automatic drops at `level`.
///
/// Exponential interpolation from 1000 ms at level 1 to 150 ms at level 10,
/// rounded to the millisecond. Levels outside `1..=10` are clamped.
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use dragontris_engine::gravity_interval;
///
/// assert_eq!(gravity_interval(1), Duration::from_millis(1000));
/// assert_eq!(gravity_interval(2), Duration::from_millis(810));
/// assert_eq!(gravity_interval(10), Duration::from_millis(150));
/// ```
#[must_use]
pub fn gravity_interval(level: u32) -> Duration {
    let level = level.clamp(1, MAX_LEVEL);
    let slowest = SLOWEST_GRAVITY.as_secs_f64() * 1000.0;
    let fastest = FASTEST_GRAVITY.as_secs_f64() * 1000.0;
    let t = f64::from(level - 1) / f64::from(MAX_LEVEL - 1);
    let millis = (slowest * (fastest / slowest).powf(t)).round().max(fastest);
    #[expect(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let millis = millis as u64;
    Duration::from_millis(millis)
}

/// Fixed-timestep gravity accumulator.
///
/// Elapsed time is added each tick; once the total exceeds the interval one
/// drop is due and the accumulator restarts from zero, so at most one drop
/// happens per tick regardless of frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gravity {
    interval: Duration,
    accumulated: Duration,
}

impl Gravity {
    #[must_use]
    pub fn new(level: u32) -> Self {
        Self {
            interval: gravity_interval(level),
            accumulated: Duration::ZERO,
        }
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn set_level(&mut self, level: u32) {
        self.interval = gravity_interval(level);
    }

    pub fn reset(&mut self) {
        self.accumulated = Duration::ZERO;
    }

    /// Adds `elapsed` and reports whether a drop is due.
    pub fn advance(&mut self, elapsed: Duration) -> bool {
        self.accumulated = self.accumulated.saturating_add(elapsed);
        if self.accumulated > self.interval {
            self.accumulated = Duration::ZERO;
            return true;
        }
        false
    }
}

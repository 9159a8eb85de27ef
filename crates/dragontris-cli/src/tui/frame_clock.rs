use std::time::{Duration, Instant};

use anyhow::ensure;

/// Schedules frames at a fixed rate.
///
/// A frame that runs late is not made up for: the next one is scheduled a
/// full interval after it, so a stalled terminal never causes a burst of
/// catch-up frames.
#[derive(Debug, Clone)]
pub(super) struct FrameClock {
    interval: Duration,
    next_frame: Instant,
}

impl FrameClock {
    /// Creates a clock running at `fps` frames per second, with the first frame due at `now`.
    pub(super) fn new(fps: f64, now: Instant) -> anyhow::Result<Self> {
        ensure!(
            fps.is_finite() && fps > 0.0,
            "frame rate must be a positive number, got {fps}"
        );
        Ok(Self {
            interval: Duration::from_secs_f64(1.0 / fps),
            next_frame: now,
        })
    }

    pub(super) fn is_due(&self, now: Instant) -> bool {
        now >= self.next_frame
    }

    /// How long input polling may block before the next frame.
    pub(super) fn timeout(&self, now: Instant) -> Duration {
        self.next_frame.saturating_duration_since(now)
    }

    /// Marks the frame due at `now` as done.
    pub(super) fn advance(&mut self, now: Instant) {
        self.next_frame += self.interval;
        if self.next_frame <= now {
            self.next_frame = now + self.interval;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_rate() {
        let now = Instant::now();
        assert!(FrameClock::new(0.0, now).is_err());
        assert!(FrameClock::new(-30.0, now).is_err());
        assert!(FrameClock::new(f64::NAN, now).is_err());
        assert!(FrameClock::new(f64::INFINITY, now).is_err());
    }

    #[test]
    fn test_frames_at_fixed_interval() {
        let start = Instant::now();
        let mut clock = FrameClock::new(50.0, start).unwrap();
        assert!(clock.is_due(start));

        clock.advance(start);
        assert!(!clock.is_due(start + Duration::from_millis(19)));
        assert_eq!(
            clock.timeout(start + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert!(clock.is_due(start + Duration::from_millis(20)));

        // A slightly late frame keeps the original cadence.
        clock.advance(start + Duration::from_millis(22));
        assert!(clock.is_due(start + Duration::from_millis(40)));
    }

    #[test]
    fn test_stall_skips_missed_frames() {
        let start = Instant::now();
        let mut clock = FrameClock::new(50.0, start).unwrap();
        clock.advance(start);

        let late = start + Duration::from_secs(1);
        clock.advance(late);
        assert!(!clock.is_due(late));
        assert_eq!(clock.timeout(late), Duration::from_millis(20));
    }
}

use std::time::{Duration, Instant};

/// Redraw period of the bootstrap loop (~30 fps).
pub const DEFAULT_REDRAW_INTERVAL: Duration = Duration::from_millis(32);

/// One redraw produced by the timer.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct FrameTick {
    /// Monotonic frame counter.
    pub frame_index: u64,

    /// Instant at which the frame was drawn.
    pub at: Instant,
}

/// Self-rescheduling fixed-interval timer.
///
/// After each tick the next deadline is `tick time + interval`, the same way
/// a callback that re-arms its own timeout behaves. Late frames are not
/// caught up.
#[derive(Debug, Clone)]
pub struct RedrawTimer {
    interval: Duration,
    deadline: Instant,
    frame_index: u64,
}

impl RedrawTimer {
    /// Creates a timer whose first frame is due immediately at `now`.
    pub fn new(interval: Duration, now: Instant) -> Self {
        debug_assert!(!interval.is_zero(), "redraw interval must be non-zero");
        Self {
            interval,
            deadline: now,
            frame_index: 0,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Instant at which the next redraw should happen.
    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Whether a redraw is due at `now`.
    pub fn is_due(&self, now: Instant) -> bool {
        now >= self.deadline
    }

    /// Records a redraw at `now` and re-arms the timer.
    pub fn tick(&mut self, now: Instant) -> FrameTick {
        let tick = FrameTick {
            frame_index: self.frame_index,
            at: now,
        };

        self.frame_index = self.frame_index.wrapping_add(1);
        self.deadline = now + self.interval;

        tick
    }
}

impl Default for RedrawTimer {
    fn default() -> Self {
        Self::new(DEFAULT_REDRAW_INTERVAL, Instant::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn first_frame_is_due_immediately() {
        let t0 = Instant::now();
        let timer = RedrawTimer::new(DEFAULT_REDRAW_INTERVAL, t0);
        assert!(timer.is_due(t0));
        assert_eq!(timer.deadline(), t0);
    }

    #[test]
    fn tick_rearms_one_interval_later() {
        let t0 = Instant::now();
        let mut timer = RedrawTimer::new(DEFAULT_REDRAW_INTERVAL, t0);
        timer.tick(t0);

        assert!(!timer.is_due(t0 + 31 * MS));
        assert!(timer.is_due(t0 + 32 * MS));
        assert_eq!(timer.deadline(), t0 + 32 * MS);
    }

    #[test]
    fn late_tick_does_not_catch_up() {
        // A frame drawn 100ms late schedules the next one 32ms after itself.
        let t0 = Instant::now();
        let mut timer = RedrawTimer::new(DEFAULT_REDRAW_INTERVAL, t0);
        timer.tick(t0);
        timer.tick(t0 + 132 * MS);
        assert_eq!(timer.deadline(), t0 + 164 * MS);
    }

    #[test]
    fn frame_index_counts_ticks() {
        let t0 = Instant::now();
        let mut timer = RedrawTimer::new(10 * MS, t0);
        let a = timer.tick(t0);
        let b = timer.tick(t0 + 10 * MS);
        assert_eq!(a.frame_index, 0);
        assert_eq!(b.frame_index, 1);
        assert_eq!(b.at, t0 + 10 * MS);
    }
}

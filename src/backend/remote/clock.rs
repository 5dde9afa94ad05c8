//! Wall-clock extrapolation of an embedded player's position.
//!
//! The embedded surface cannot be polled for its position, so the position
//! is estimated as `base + (now - started_at)` while playing.

use std::time::Instant;

use crate::core::time::{self, Time};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteClock {
    base: Time,
    started_at: Option<Instant>,
}

impl RemoteClock {
    pub fn new(base: Time) -> Self {
        Self {
            base: time::clamp_non_negative(base),
            started_at: None,
        }
    }

    pub fn base(&self) -> Time {
        self.base
    }

    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Start extrapolating from `now`. No-op if already running.
    pub fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Freeze at the current estimate.
    pub fn stop(&mut self, now: Instant) {
        self.base = self.estimate(now);
        self.started_at = None;
    }

    /// Re-anchor at `position`; keeps running if it was running.
    pub fn seek(&mut self, position: Time, now: Instant) {
        self.base = time::clamp_non_negative(position);
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }

    pub fn estimate(&self, now: Instant) -> Time {
        match self.started_at {
            Some(started_at) => {
                let elapsed = time::from_duration(now.saturating_duration_since(started_at));
                self.base.saturating_add(elapsed)
            }
            None => self.base,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::{from_millis, from_seconds};
    use std::time::Duration;

    #[test]
    fn test_paused_clock_is_frozen() {
        let t0 = Instant::now();
        let clock = RemoteClock::new(from_seconds(100.0));
        assert_eq!(clock.estimate(t0), from_seconds(100.0));
        assert_eq!(clock.estimate(t0 + Duration::from_secs(30)), from_seconds(100.0));
    }

    #[test]
    fn test_running_clock_is_monotonic() {
        let t0 = Instant::now();
        let mut clock = RemoteClock::new(from_seconds(5.0));
        clock.start(t0);
        let mut last = clock.estimate(t0);
        for step in 1..50 {
            let now = t0 + Duration::from_millis(step * 100);
            let estimate = clock.estimate(now);
            assert!(estimate >= last);
            last = estimate;
        }
        assert_eq!(last, from_seconds(5.0) + from_millis(4900));
    }

    #[test]
    fn test_stop_folds_elapsed_time() {
        let t0 = Instant::now();
        let mut clock = RemoteClock::new(0);
        clock.start(t0);
        clock.stop(t0 + Duration::from_secs(3));
        assert!(!clock.is_running());
        assert_eq!(clock.base(), from_seconds(3.0));

        clock.start(t0 + Duration::from_secs(10));
        assert_eq!(clock.estimate(t0 + Duration::from_secs(11)), from_seconds(4.0));
    }

    #[test]
    fn test_start_twice_keeps_anchor() {
        let t0 = Instant::now();
        let mut clock = RemoteClock::new(0);
        clock.start(t0);
        clock.start(t0 + Duration::from_secs(2));
        assert_eq!(clock.estimate(t0 + Duration::from_secs(2)), from_seconds(2.0));
    }

    #[test]
    fn test_seek_reanchors() {
        let t0 = Instant::now();
        let mut clock = RemoteClock::new(0);
        clock.start(t0);
        clock.seek(from_seconds(40.0), t0 + Duration::from_secs(5));
        assert_eq!(clock.estimate(t0 + Duration::from_secs(6)), from_seconds(41.0));

        let mut paused = RemoteClock::new(0);
        paused.seek(from_seconds(-2.0), t0);
        assert_eq!(paused.estimate(t0 + Duration::from_secs(9)), 0);
    }

    #[test]
    fn test_clock_before_anchor_does_not_regress() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut clock = RemoteClock::new(from_seconds(8.0));
        clock.start(t0);
        assert_eq!(clock.estimate(t0 - Duration::from_millis(500)), from_seconds(8.0));
    }
}

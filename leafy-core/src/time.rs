//! Time helpers on top of the HAL millisecond counter

pub use leafy_hal::time::{elapsed, Clock, Millis};

/// Periodic deadline checked from the poll loop
///
/// `poll` fires at most once per call and re-arms from the time it fired,
/// so a late poll delays the next period instead of bunching up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Interval {
    period_ms: u32,
    since: Millis,
}

impl Interval {
    /// Create an interval whose first period starts at `now`
    pub const fn new(period_ms: u32, now: Millis) -> Self {
        Self {
            period_ms,
            since: now,
        }
    }

    /// Check whether a full period has elapsed, re-arming if so
    pub fn poll(&mut self, now: Millis) -> bool {
        if now.elapsed_since(self.since) >= self.period_ms {
            self.since = now;
            true
        } else {
            false
        }
    }

    /// Restart the current period at `now`
    pub fn reset(&mut self, now: Millis) {
        self.since = now;
    }

    /// Change the period without restarting it
    pub fn set_period(&mut self, period_ms: u32) {
        self.period_ms = period_ms;
    }

    /// Current period
    pub const fn period(&self) -> u32 {
        self.period_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_interval_fires_once_per_period() {
        let mut interval = Interval::new(100, Millis(0));
        assert!(!interval.poll(Millis(99)));
        assert!(interval.poll(Millis(100)));
        assert!(!interval.poll(Millis(150)));
        assert!(interval.poll(Millis(230)));
    }

    #[test]
    fn test_interval_across_wrap() {
        let mut interval = Interval::new(10, Millis(u32::MAX - 4));
        assert!(!interval.poll(Millis(2)));
        assert!(interval.poll(Millis(5)));
    }

    proptest! {
        #[test]
        fn prop_elapsed_is_modular(since in any::<u32>(), delta in any::<u32>()) {
            let now = Millis(since).wrapping_add(delta);
            prop_assert_eq!(elapsed(Millis(since), now), delta);
        }

        #[test]
        fn prop_interval_never_early(start in any::<u32>(), period in 1u32..10_000, step in 0u32..10_000) {
            let mut interval = Interval::new(period, Millis(start));
            let fired = interval.poll(Millis(start).wrapping_add(step));
            prop_assert_eq!(fired, step >= period);
        }
    }
}

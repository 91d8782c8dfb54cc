//! Millisecond time base
//!
//! The tick source is a free-running `u32` millisecond counter that wraps
//! after ~49.7 days. Elapsed time is always computed with wrapping
//! subtraction, never by comparing timestamps, so every timeout stays
//! correct across the wrap.

/// Timestamp from the millisecond counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Millis(pub u32);

impl Millis {
    /// Counter value at reset
    pub const ZERO: Millis = Millis(0);

    /// Raw counter value
    pub const fn as_u32(self) -> u32 {
        self.0
    }

    /// Milliseconds from `since` to `self`, modulo 2^32
    pub const fn elapsed_since(self, since: Millis) -> u32 {
        self.0.wrapping_sub(since.0)
    }

    /// Timestamp `ms` later, wrapping
    pub const fn wrapping_add(self, ms: u32) -> Millis {
        Millis(self.0.wrapping_add(ms))
    }
}

/// Milliseconds from `since` to `now`, correct across counter wraparound
pub const fn elapsed(since: Millis, now: Millis) -> u32 {
    now.elapsed_since(since)
}

/// Monotonic millisecond clock
///
/// Implementations must be callable from interrupt context.
pub trait Clock {
    /// Current counter value
    fn now(&self) -> Millis;

    /// Milliseconds since `since`
    fn elapsed(&self, since: Millis) -> u32 {
        self.now().elapsed_since(since)
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Millis {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed(Millis(u32::MAX - 1), Millis(1)), 3);
        assert_eq!(elapsed(Millis(u32::MAX), Millis(0)), 1);
        assert_eq!(elapsed(Millis(u32::MAX), Millis(1)), 2);
        assert_eq!(elapsed(Millis(10), Millis(10)), 0);
    }

    #[test]
    fn test_wrapping_add() {
        assert_eq!(Millis(u32::MAX).wrapping_add(2), Millis(1));
    }
}

//! Push-button debouncing and press classification
//!
//! The rising edge is a press, the falling edge a release. Edges within
//! the debounce window of the previous opposite edge are contact bounce and
//! ignored, on both press and release. A press is classified when it ends: shorter than `brief_max_ms` raises the brief
//! flag. A press still down after a threshold is a held press, observed by
//! the poll loop with [`ButtonEvents::take_held`].

use leafy_hal::{Clock, Edge, Millis};
use portable_atomic::{AtomicBool, AtomicU32, Ordering};

use crate::gpio::EdgeHandler;

/// Default release chatter lockout
pub const DEFAULT_DEBOUNCE_MS: u32 = 50;
/// Default upper bound of a brief press (exclusive)
pub const DEFAULT_BRIEF_MAX_MS: u32 = 2000;

/// Press classification thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonTiming {
    /// Edges this soon after the opposite edge are chatter
    pub debounce_ms: u32,
    /// A press shorter than this is brief
    pub brief_max_ms: u32,
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self {
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            brief_max_ms: DEFAULT_BRIEF_MAX_MS,
        }
    }
}

/// Button event producer/consumer pair
///
/// Lives in a `static` so the interrupt table can hold a `&'static`
/// reference. Timing is stored in atomics so it can be loaded from the
/// board configuration after the static is built.
pub struct ButtonEvents<C: Clock> {
    clock: C,
    pressed: AtomicBool,
    brief: AtomicBool,
    released_once: AtomicBool,
    press_at: AtomicU32,
    release_at: AtomicU32,
    debounce_ms: AtomicU32,
    brief_max_ms: AtomicU32,
}

impl<C: Clock> ButtonEvents<C> {
    /// Create with default timing
    pub const fn new(clock: C) -> Self {
        Self {
            clock,
            pressed: AtomicBool::new(false),
            brief: AtomicBool::new(false),
            released_once: AtomicBool::new(false),
            press_at: AtomicU32::new(0),
            release_at: AtomicU32::new(0),
            debounce_ms: AtomicU32::new(DEFAULT_DEBOUNCE_MS),
            brief_max_ms: AtomicU32::new(DEFAULT_BRIEF_MAX_MS),
        }
    }

    /// Load classification thresholds
    pub fn set_timing(&self, timing: ButtonTiming) {
        self.debounce_ms.store(timing.debounce_ms, Ordering::Relaxed);
        self.brief_max_ms.store(timing.brief_max_ms, Ordering::Relaxed);
    }

    /// Drop all pending state (app init)
    pub fn reset(&self) {
        self.pressed.store(false, Ordering::Release);
        self.brief.store(false, Ordering::Release);
    }

    /// Press edge (producer side)
    pub fn on_press(&self, now: Millis) {
        if self.released_once.load(Ordering::Acquire) {
            let since_release = now.elapsed_since(Millis(self.release_at.load(Ordering::Relaxed)));
            if since_release < self.debounce_ms.load(Ordering::Relaxed) {
                return;
            }
        }
        if self.pressed.load(Ordering::Acquire) {
            return;
        }
        self.press_at.store(now.as_u32(), Ordering::Relaxed);
        self.pressed.store(true, Ordering::Release);
    }

    /// Release edge (producer side)
    ///
    /// A release without a recorded press (lockout or consumed held press)
    /// classifies nothing. A release inside the debounce window of its
    /// press is bounce and leaves the press standing.
    pub fn on_release(&self, now: Millis) {
        if self.pressed.load(Ordering::Acquire) {
            let since_press = now.elapsed_since(Millis(self.press_at.load(Ordering::Relaxed)));
            if since_press < self.debounce_ms.load(Ordering::Relaxed) {
                return;
            }
        }
        self.release_at.store(now.as_u32(), Ordering::Relaxed);
        self.released_once.store(true, Ordering::Release);

        if !self.pressed.swap(false, Ordering::AcqRel) {
            return;
        }
        let held = now.elapsed_since(Millis(self.press_at.load(Ordering::Relaxed)));
        if held < self.brief_max_ms.load(Ordering::Relaxed) {
            self.brief.store(true, Ordering::Release);
        }
    }

    /// Consume a pending brief press
    pub fn take_brief(&self) -> bool {
        self.brief.swap(false, Ordering::AcqRel)
    }

    /// Check if the button is currently down
    pub fn is_pressed(&self) -> bool {
        self.pressed.load(Ordering::Acquire)
    }

    /// How long the current press has lasted, if down
    pub fn held_for(&self, now: Millis) -> Option<u32> {
        if self.is_pressed() {
            Some(now.elapsed_since(Millis(self.press_at.load(Ordering::Relaxed))))
        } else {
            None
        }
    }

    /// Consume a press held for at least `threshold_ms`
    ///
    /// Clears both the pressed and brief flags so the eventual release
    /// is not classified again.
    pub fn take_held(&self, now: Millis, threshold_ms: u32) -> bool {
        match self.held_for(now) {
            Some(held) if held >= threshold_ms => {
                self.pressed.store(false, Ordering::Release);
                self.brief.store(false, Ordering::Release);
                true
            }
            _ => false,
        }
    }
}

impl<C: Clock + Sync> EdgeHandler for ButtonEvents<C> {
    fn on_edge(&self, edge: Edge) {
        let now = self.clock.now();
        match edge {
            Edge::Rising => self.on_press(now),
            Edge::Falling => self.on_release(now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockClock;
    use proptest::prelude::*;

    fn button() -> ButtonEvents<MockClock> {
        ButtonEvents::new(MockClock::new())
    }

    #[test]
    fn test_brief_press_sets_flag_once() {
        let b = button();
        b.on_press(Millis(1000));
        assert!(b.is_pressed());
        b.on_release(Millis(1500));
        assert!(!b.is_pressed());
        assert!(b.take_brief());
        assert!(!b.take_brief());
    }

    #[test]
    fn test_long_press_is_not_brief() {
        let b = button();
        b.on_press(Millis(0));
        b.on_release(Millis(2000));
        assert!(!b.is_pressed());
        assert!(!b.take_brief());
    }

    #[test]
    fn test_release_chatter_ignored() {
        let b = button();
        b.on_press(Millis(100));
        b.on_release(Millis(200));
        assert!(b.take_brief());

        // Bounce 10 ms after release
        b.on_press(Millis(210));
        assert!(!b.is_pressed());
        b.on_release(Millis(215));
        assert!(!b.take_brief());

        // Real press after the lockout
        b.on_press(Millis(400));
        assert!(b.is_pressed());
    }

    #[test]
    fn test_press_chatter_ignored() {
        let b = button();
        b.on_press(Millis(0));
        // Contact bounce right after the press
        b.on_release(Millis(2));
        assert!(b.is_pressed());
        b.on_press(Millis(4));
        assert!(!b.take_brief());

        assert!(b.take_held(Millis(3500), 3000));
        assert!(!b.take_brief());
    }

    #[test]
    fn test_held_press_consumed_once() {
        let b = button();
        b.on_press(Millis(0));
        assert!(!b.take_held(Millis(2999), 3000));
        assert!(b.take_held(Millis(3000), 3000));
        assert!(!b.take_held(Millis(3500), 3000));

        // Release after a consumed hold classifies nothing
        b.on_release(Millis(3600));
        assert!(!b.take_brief());
    }

    #[test]
    fn test_edge_handler_uses_clock() {
        let b = button();
        b.clock.set(Millis(u32::MAX - 10));
        b.on_edge(Edge::Rising);
        b.clock.set(Millis(60));
        b.on_edge(Edge::Falling);
        assert!(b.take_brief());
    }

    proptest! {
        #[test]
        fn prop_brief_iff_under_threshold(start in any::<u32>(), duration in DEFAULT_DEBOUNCE_MS..5000) {
            let b = button();
            b.on_press(Millis(start));
            b.on_release(Millis(start).wrapping_add(duration));
            prop_assert!(!b.is_pressed());
            prop_assert_eq!(b.take_brief(), duration < DEFAULT_BRIEF_MAX_MS);
        }
    }
}

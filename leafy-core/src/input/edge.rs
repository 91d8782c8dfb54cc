//! Polled edge and hold detection
//!
//! For inputs that are sampled by the poll loop rather than wired to an
//! interrupt line, like the expander buttons on the virtual port.

use leafy_hal::Millis;

/// Rising-edge detector over sampled levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    prev: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self { prev: false }
    }

    /// Feed a sample, returning true on a low-to-high transition
    pub fn update(&mut self, level: bool) -> bool {
        let rising = level && !self.prev;
        self.prev = level;
        rising
    }

    /// Pretend the input was already `level`, suppressing the next edge
    pub fn prime(&mut self, level: bool) {
        self.prev = level;
    }
}

/// Tracks how long a sampled input has been continuously high
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HoldTimer {
    since: Option<Millis>,
}

impl HoldTimer {
    pub const fn new() -> Self {
        Self { since: None }
    }

    /// Feed a sample, returning the current hold duration if high
    pub fn update(&mut self, level: bool, now: Millis) -> Option<u32> {
        if !level {
            self.since = None;
            return None;
        }
        let since = *self.since.get_or_insert(now);
        Some(now.elapsed_since(since))
    }

    /// Forget the current hold
    pub fn reset(&mut self) {
        self.since = None;
    }
}

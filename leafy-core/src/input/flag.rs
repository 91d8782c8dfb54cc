//! Single-producer, single-consumer event flag

use leafy_hal::Edge;
use portable_atomic::{AtomicBool, Ordering};

use crate::gpio::EdgeHandler;

/// Pending-event flag raised from interrupt context
///
/// Level semantics: raising an already raised flag is a no-op, so events
/// that arrive faster than the poll loop consumes them coalesce.
#[derive(Debug, Default)]
pub struct EventFlag {
    raised: AtomicBool,
}

impl EventFlag {
    /// Create a cleared flag
    pub const fn new() -> Self {
        Self {
            raised: AtomicBool::new(false),
        }
    }

    /// Mark the event pending (producer side)
    pub fn raise(&self) {
        self.raised.store(true, Ordering::Release);
    }

    /// Consume the event, returning whether it was pending
    pub fn take(&self) -> bool {
        self.raised.swap(false, Ordering::AcqRel)
    }

    /// Peek without consuming
    pub fn is_raised(&self) -> bool {
        self.raised.load(Ordering::Acquire)
    }

    /// Discard a pending event
    pub fn clear(&self) {
        self.raised.store(false, Ordering::Release);
    }
}

impl EdgeHandler for EventFlag {
    fn on_edge(&self, _edge: Edge) {
        self.raise();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raises_coalesce() {
        let flag = EventFlag::new();
        flag.raise();
        flag.raise();
        assert!(flag.take());
        assert!(!flag.take());
    }

    #[test]
    fn test_edge_handler_raises() {
        let flag = EventFlag::new();
        flag.on_edge(Edge::Rising);
        assert!(flag.is_raised());
        flag.clear();
        assert!(!flag.is_raised());
    }
}

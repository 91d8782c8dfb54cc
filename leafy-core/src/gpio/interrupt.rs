//! `(bit, edge) -> handler` interrupt table
//!
//! Registration happens from the poll loop at init, dispatch from interrupt
//! context. The table itself sits behind a critical section; handlers are
//! copied out and run with interrupts enabled again.

use core::cell::RefCell;

use critical_section::Mutex;
use leafy_hal::exti::{ExtiController, PendingEdges, EXTI_LINES};
use leafy_hal::{Edge, Pin};

/// Interrupt-context event handler
///
/// Must be O(1): raise a flag, latch a timestamp. Never block or loop.
pub trait EdgeHandler: Sync {
    fn on_edge(&self, edge: Edge);
}

type Slot = Option<&'static dyn EdgeHandler>;

/// Handler table, one slot per EXTI line and edge
pub struct InterruptTable {
    slots: Mutex<RefCell<[[Slot; 2]; EXTI_LINES]>>,
}

impl Default for InterruptTable {
    fn default() -> Self {
        Self::new()
    }
}

impl InterruptTable {
    /// Create an empty table
    pub const fn new() -> Self {
        Self {
            slots: Mutex::new(RefCell::new([[None; 2]; EXTI_LINES])),
        }
    }

    /// Store `handler` for `(pin.bit, edge)` and enable the edge detector
    ///
    /// Registering the same line and edge again replaces the handler. The
    /// line is shared by all ports, so the last registered pin wins the
    /// routing too.
    pub fn register<E: ExtiController>(
        &self,
        exti: &E,
        pin: Pin,
        handler: &'static dyn EdgeHandler,
        edge: Edge,
    ) {
        let line = usize::from(pin.bit) % EXTI_LINES;
        critical_section::with(|cs| {
            self.slots.borrow_ref_mut(cs)[line][edge.index()] = Some(handler);
        });
        exti.enable(pin, edge);
    }

    /// Check if a handler is registered for `line` and `edge`
    pub fn is_registered(&self, line: u8, edge: Edge) -> bool {
        self.handler(line, edge).is_some()
    }

    fn handler(&self, line: u8, edge: Edge) -> Slot {
        let line = usize::from(line) % EXTI_LINES;
        critical_section::with(|cs| self.slots.borrow_ref(cs)[line][edge.index()])
    }

    /// Service one interrupt line
    ///
    /// Acknowledges exactly the pending edges that were set, then runs the
    /// rising handler before the falling handler. Both run when the edges
    /// coalesced. Pending edges with no handler are acknowledged and
    /// dropped. Returns the edges that were serviced.
    pub fn dispatch<E: ExtiController>(&self, exti: &E, line: u8) -> PendingEdges {
        let pending = exti.pending(line);
        if pending.is_empty() {
            return pending;
        }
        exti.clear(line, pending);

        for edge in Edge::ALL {
            if pending.contains(edge) {
                if let Some(handler) = self.handler(line, edge) {
                    handler.on_edge(edge);
                }
            }
        }
        pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::EventFlag;
    use crate::mocks::MockExti;
    use leafy_hal::PortId;
    use portable_atomic::{AtomicU8, Ordering};

    struct Recorder {
        order: AtomicU8,
    }

    impl EdgeHandler for Recorder {
        fn on_edge(&self, edge: Edge) {
            // Shift in 1 for rising, 2 for falling
            let code = match edge {
                Edge::Rising => 1,
                Edge::Falling => 2,
            };
            let prev = self.order.load(Ordering::Relaxed);
            self.order.store(prev * 10 + code, Ordering::Relaxed);
        }
    }

    #[test]
    fn test_register_enables_edge() {
        static TABLE: InterruptTable = InterruptTable::new();
        static FLAG: EventFlag = EventFlag::new();
        let exti = MockExti::new();

        TABLE.register(&exti, Pin::new(PortId::B, 8), &FLAG, Edge::Rising);
        assert!(TABLE.is_registered(8, Edge::Rising));
        assert!(!TABLE.is_registered(8, Edge::Falling));
        assert!(exti.is_enabled(8, Edge::Rising));
        assert_eq!(exti.routed_port(8), Some(PortId::B));
    }

    #[test]
    fn test_dispatch_clears_only_pending() {
        static TABLE: InterruptTable = InterruptTable::new();
        static FLAG: EventFlag = EventFlag::new();
        let exti = MockExti::new();

        TABLE.register(&exti, Pin::new(PortId::C, 13), &FLAG, Edge::Rising);
        exti.trigger(13, Edge::Rising);

        let serviced = TABLE.dispatch(&exti, 13);
        assert_eq!(serviced, PendingEdges::edge(Edge::Rising));
        assert_eq!(exti.clear_count(13), 1);
        assert!(exti.pending(13).is_empty());
        assert!(FLAG.take());

        // Nothing pending: no acknowledge, no handler
        assert!(TABLE.dispatch(&exti, 13).is_empty());
        assert_eq!(exti.clear_count(13), 1);
        assert!(!FLAG.take());
    }

    #[test]
    fn test_dispatch_coalesced_edges_rising_first() {
        static TABLE: InterruptTable = InterruptTable::new();
        static REC: Recorder = Recorder {
            order: AtomicU8::new(0),
        };
        let exti = MockExti::new();
        let pin = Pin::new(PortId::C, 13);

        TABLE.register(&exti, pin, &REC, Edge::Rising);
        TABLE.register(&exti, pin, &REC, Edge::Falling);
        exti.trigger(13, Edge::Falling);
        exti.trigger(13, Edge::Rising);

        TABLE.dispatch(&exti, 13);
        assert_eq!(REC.order.load(Ordering::Relaxed), 12);
    }

    #[test]
    fn test_unregistered_edge_is_acknowledged() {
        static TABLE: InterruptTable = InterruptTable::new();
        let exti = MockExti::new();

        exti.trigger(3, Edge::Falling);
        let serviced = TABLE.dispatch(&exti, 3);
        assert!(serviced.contains(Edge::Falling));
        assert!(exti.pending(3).is_empty());
    }

    #[test]
    fn test_reregister_replaces_handler() {
        static TABLE: InterruptTable = InterruptTable::new();
        static FIRST: EventFlag = EventFlag::new();
        static SECOND: EventFlag = EventFlag::new();
        let exti = MockExti::new();
        let pin = Pin::new(PortId::B, 8);

        TABLE.register(&exti, pin, &FIRST, Edge::Rising);
        TABLE.register(&exti, pin, &SECOND, Edge::Rising);
        exti.trigger(8, Edge::Rising);
        TABLE.dispatch(&exti, 8);

        assert!(!FIRST.take());
        assert!(SECOND.take());
    }
}

//! Pending-edge latch for STM32L5 EXTI lines
//!
//! embassy-stm32 owns the EXTI interrupt vectors and acknowledges the
//! hardware pending bits itself. The tasks waiting on `ExtiInput`s record
//! each edge here, and the interrupt table reads and clears these flags the
//! way it would read and clear RPR1/FPR1.

use leafy_hal::exti::EXTI_LINES;
use leafy_hal::{Edge, ExtiController, PendingEdges, Pin, PortId};
use portable_atomic::{AtomicU16, AtomicU8, Ordering};

const NO_ROUTE: u8 = 0xFF;

/// Software copy of the EXTI edge-select and pending registers
pub struct EdgeLatch {
    rising_enabled: AtomicU16,
    falling_enabled: AtomicU16,
    rising_pending: AtomicU16,
    falling_pending: AtomicU16,
    routes: [AtomicU8; EXTI_LINES],
}

impl Default for EdgeLatch {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeLatch {
    pub const fn new() -> Self {
        #[allow(clippy::declare_interior_mutable_const)]
        const UNROUTED: AtomicU8 = AtomicU8::new(NO_ROUTE);
        Self {
            rising_enabled: AtomicU16::new(0),
            falling_enabled: AtomicU16::new(0),
            rising_pending: AtomicU16::new(0),
            falling_pending: AtomicU16::new(0),
            routes: [UNROUTED; EXTI_LINES],
        }
    }

    fn masks(&self, edge: Edge) -> (&AtomicU16, &AtomicU16) {
        match edge {
            Edge::Rising => (&self.rising_enabled, &self.rising_pending),
            Edge::Falling => (&self.falling_enabled, &self.falling_pending),
        }
    }

    /// Record an edge seen on `line`
    ///
    /// Edges whose detector is not enabled are dropped, as the hardware
    /// would. Returns whether the edge was latched.
    pub fn latch(&self, line: u8, edge: Edge) -> bool {
        if usize::from(line) >= EXTI_LINES {
            return false;
        }
        let bit = 1u16 << line;
        let (enabled, pending) = self.masks(edge);
        if enabled.load(Ordering::Relaxed) & bit == 0 {
            return false;
        }
        pending.fetch_or(bit, Ordering::AcqRel);
        true
    }

    /// Check if an edge detector is enabled
    pub fn is_enabled(&self, line: u8, edge: Edge) -> bool {
        usize::from(line) < EXTI_LINES
            && self.masks(edge).0.load(Ordering::Relaxed) & (1 << line) != 0
    }

    /// Port currently routed to `line`
    pub fn routed_port(&self, line: u8) -> Option<PortId> {
        let route = self.routes.get(usize::from(line))?.load(Ordering::Relaxed);
        PortId::ONCHIP.get(usize::from(route)).copied()
    }
}

impl ExtiController for EdgeLatch {
    fn enable(&self, pin: Pin, edge: Edge) {
        let Some(route) = self.routes.get(usize::from(pin.bit)) else {
            return;
        };
        route.store(pin.port.index(), Ordering::Relaxed);
        self.masks(edge).0.fetch_or(pin.mask(), Ordering::AcqRel);
    }

    fn pending(&self, line: u8) -> PendingEdges {
        if usize::from(line) >= EXTI_LINES {
            return PendingEdges::NONE;
        }
        let bit = 1u16 << line;
        PendingEdges {
            rising: self.rising_pending.load(Ordering::Acquire) & bit != 0,
            falling: self.falling_pending.load(Ordering::Acquire) & bit != 0,
        }
    }

    fn clear(&self, line: u8, edges: PendingEdges) {
        if usize::from(line) >= EXTI_LINES {
            return;
        }
        let bit = 1u16 << line;
        if edges.rising {
            self.rising_pending.fetch_and(!bit, Ordering::AcqRel);
        }
        if edges.falling {
            self.falling_pending.fetch_and(!bit, Ordering::AcqRel);
        }
    }
}

//! External interrupt (EXTI) abstractions
//!
//! Each pin bit 0-15 owns one interrupt line, shared by all ports: the line
//! multiplexer decides which port's pin drives it.

use crate::gpio::{Edge, Pin};

/// Number of EXTI lines, one per pin bit
pub const EXTI_LINES: usize = 16;

/// Pending edge flags for one interrupt line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PendingEdges {
    /// Rising-edge pending flag
    pub rising: bool,
    /// Falling-edge pending flag
    pub falling: bool,
}

impl PendingEdges {
    /// Nothing pending
    pub const NONE: Self = Self {
        rising: false,
        falling: false,
    };

    /// Pending flags for a single edge
    pub const fn edge(edge: Edge) -> Self {
        match edge {
            Edge::Rising => Self {
                rising: true,
                falling: false,
            },
            Edge::Falling => Self {
                rising: false,
                falling: true,
            },
        }
    }

    /// Check if the given edge is pending
    pub const fn contains(self, edge: Edge) -> bool {
        match edge {
            Edge::Rising => self.rising,
            Edge::Falling => self.falling,
        }
    }

    /// Check if nothing is pending
    pub const fn is_empty(self) -> bool {
        !self.rising && !self.falling
    }

    /// Union of two sets of pending flags
    pub const fn union(self, other: Self) -> Self {
        Self {
            rising: self.rising || other.rising,
            falling: self.falling || other.falling,
        }
    }
}

/// Edge-detect controller
///
/// Methods take `&self` because the controller is shared between the poll
/// loop (registration) and interrupt context (dispatch); implementations
/// use atomics or volatile registers.
pub trait ExtiController {
    /// Route `pin` to its line, unmask the `edge` detector and enable the
    /// line's interrupt vector
    fn enable(&self, pin: Pin, edge: Edge);

    /// Read the pending flags of `line`
    fn pending(&self, line: u8) -> PendingEdges;

    /// Acknowledge exactly the given pending flags of `line`
    fn clear(&self, line: u8, edges: PendingEdges);
}

impl<T: ExtiController + ?Sized> ExtiController for &T {
    fn enable(&self, pin: Pin, edge: Edge) {
        (**self).enable(pin, edge)
    }

    fn pending(&self, line: u8) -> PendingEdges {
        (**self).pending(line)
    }

    fn clear(&self, line: u8, edges: PendingEdges) {
        (**self).clear(line, edges)
    }
}

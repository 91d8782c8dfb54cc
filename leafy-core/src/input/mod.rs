//! Interrupt-fed input events
//!
//! Edge handlers run in interrupt context and only raise flags or latch
//! timestamps. The poll loop consumes them. Every flag has exactly one
//! producer and one consumer, and multiple raises between two polls
//! coalesce into one event.

pub mod button;
pub mod edge;
pub mod flag;

pub use button::{ButtonEvents, ButtonTiming};
pub use edge::{EdgeDetector, HoldTimer};
pub use flag::EventFlag;

//! Board-agnostic core for the Leafy firmware
//!
//! Everything the alarm and pong applications need that does not depend on
//! a specific chip:
//!
//! - Millisecond time arithmetic and periodic intervals
//! - Interrupt-fed event flags and button debouncing
//! - The `(bit, edge) -> handler` interrupt table and pin operations
//! - The non-blocking I2C transfer queue and its async bus executor
//! - LCD/backlight and I/O-expander drivers built on the queue
//! - The owned board context and configuration types
//!
//! The poll loop never waits on the bus. A device is refreshed by checking
//! its descriptor's busy flag and submitting; the bus task clears busy when
//! the transfer finishes, successfully or not.

#![no_std]
#![deny(unsafe_code)]

pub mod board;
pub mod bus;
pub mod config;
pub mod display;
pub mod expander;
pub mod gpio;
pub mod input;
pub mod time;

#[cfg(any(test, feature = "mock"))]
pub mod mocks;

pub use board::{Board, BoardTransfers};
pub use bus::{BusDriver, I2cQueue, SubmitError, Transfer, TransferStatus};
pub use display::{Color, Display};
pub use expander::{IoExpander, RefreshPolicy};
pub use gpio::{EdgeHandler, GpioExt, InterruptTable, VirtualPort};
pub use input::{ButtonEvents, EventFlag};

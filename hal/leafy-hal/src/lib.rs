//! Leafy Hardware Abstraction Layer
//!
//! This crate defines hardware abstraction traits that are implemented by
//! the chip-specific HAL (STM32L5) and by the emulated I/O-expander port in
//! `leafy-core`. Application code only ever talks to these traits, which is
//! what lets the alarm and pong state machines run on the host under test.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Applications (leafy-apps)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  leafy-core (queue, display, bridge)    │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  leafy-hal (this crate - traits)        │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  leafy-hal-   │       │ VirtualPort / │
//! │   stm32l5     │       │ host mocks    │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`gpio::GpioPort`], [`gpio::PortMap`] - Port-wide register access
//! - [`exti::ExtiController`] - Edge detection and pending flags
//! - [`time::Clock`] - Free-running millisecond counter

#![no_std]
#![deny(unsafe_code)]

pub mod exti;
pub mod gpio;
pub mod i2c;
pub mod time;

// Re-export key traits at crate root for convenience
pub use exti::{ExtiController, PendingEdges};
pub use gpio::{Edge, GpioPort, Level, Pin, PinMode, PortId, PortMap};
pub use i2c::{BusError, I2cConfig};
pub use time::{Clock, Millis};

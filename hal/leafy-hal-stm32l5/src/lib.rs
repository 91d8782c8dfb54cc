//! STM32L5 implementations of the Leafy HAL traits
//!
//! - [`gpio`] - On-chip ports A-H as [`GpioPort`](leafy_hal::GpioPort)
//!   register files, with pins owned by embassy drivers fenced off
//! - [`exti`] - Pending-edge latch fed by embassy EXTI waiters
//! - [`i2c`] - Bus configuration for embassy I2C
//! - [`time`] - Millisecond clock on the embassy time driver
//!
//! # Features
//!
//! - `stm32l552ze` - STM32L552ZE (Nucleo-L552ZE-Q)
//! - `defmt` - Enable debug formatting support

#![no_std]
#![deny(unsafe_code)]

pub mod exti;
pub mod gpio;
pub mod i2c;
pub mod time;

pub use exti::EdgeLatch;
pub use gpio::{BoardPorts, PinError, RegisterPort};
pub use i2c::i2c_config;
pub use time::SysClock;

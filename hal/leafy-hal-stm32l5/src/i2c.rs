//! I2C bus setup for STM32L5
//!
//! The firmware owns the embassy `I2c` driver and runs chains on it through
//! the `embedded-hal-async` trait; errors reach the board as
//! `embedded_hal::i2c::ErrorKind`. Bus stalls are caught by
//! the driver timeout set here.

use embassy_stm32::i2c::Config;
use embassy_stm32::time::Hertz;
use embassy_time::Duration;
use leafy_hal::I2cConfig;

/// Embassy I2C configuration for the board bus
///
/// On-chip pull-ups are enabled on both lines.
pub fn i2c_config(bus: I2cConfig, timeout_ms: u32) -> Config {
    let mut config = Config::default();
    config.frequency = Hertz(bus.frequency);
    config.sda_pullup = true;
    config.scl_pullup = true;
    config.timeout = Duration::from_millis(u64::from(timeout_ms));
    config
}

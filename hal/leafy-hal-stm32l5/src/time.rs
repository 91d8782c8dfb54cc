//! Millisecond clock on the embassy time driver

use embassy_time::Instant;
use leafy_hal::{Clock, Millis};

/// Free-running millisecond counter
///
/// Truncates the 64-bit embassy uptime to the 32-bit counter the
/// application layer works with, wrapping every ~49.7 days.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysClock;

impl Clock for SysClock {
    fn now(&self) -> Millis {
        Millis(Instant::now().as_millis() as u32)
    }
}

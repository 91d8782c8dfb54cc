//! Bus task: drains the submission queue onto I2C2
//!
//! Each chain is bounded by the configured timeout. On expiry every
//! descriptor still in flight is failed so its busy flag clears and the
//! poll loop can resubmit.

use defmt::*;
use embassy_stm32::i2c::{I2c, Master};
use embassy_stm32::mode::Async;
use embassy_time::{with_timeout, Duration};
use leafy_core::bus::{abort_chain, execute};
use leafy_hal::BusError;

use crate::channels::BUS_QUEUE;

pub type BoardI2c = I2c<'static, Async, Master>;

#[embassy_executor::task]
pub async fn bus_task(mut i2c: BoardI2c, timeout_ms: u32) {
    info!("Bus task started");

    let timeout = Duration::from_millis(u64::from(timeout_ms));

    loop {
        let head = BUS_QUEUE.receive().await;
        trace!("Chain to {=u8:#04x}", head.address());

        match with_timeout(timeout, execute(&mut i2c, head)).await {
            Ok(0) => {}
            Ok(failed) => {
                warn!(
                    "{} transfer(s) to {=u8:#04x} failed: {}",
                    failed,
                    head.address(),
                    head.status()
                );
            }
            Err(_) => {
                let aborted = abort_chain(head, BusError::Timeout);
                warn!(
                    "Chain to {=u8:#04x} timed out, {} transfer(s) aborted",
                    head.address(),
                    aborted
                );
            }
        }
    }
}

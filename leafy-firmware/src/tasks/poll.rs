//! Poll loop: application logic, then device refresh, every millisecond

use defmt::*;
use embassy_time::{Duration, Ticker};
use leafy_core::time::Interval;
use leafy_hal::Clock;
use leafy_hal_stm32l5::SysClock;

use crate::board::FirmwareRunner;

/// Poll period in milliseconds
pub const POLL_INTERVAL_MS: u64 = 1;

/// Bus statistics report period
const STATS_INTERVAL_MS: u32 = 10_000;

#[embassy_executor::task]
pub async fn poll_task(mut runner: FirmwareRunner) {
    info!("Poll loop started");

    let clock = SysClock;
    runner.init(clock.now());

    let mut ticker = Ticker::every(Duration::from_millis(POLL_INTERVAL_MS));
    let mut report = Interval::new(STATS_INTERVAL_MS, clock.now());

    loop {
        ticker.next().await;

        let now = clock.now();
        runner.tick(now);

        if report.poll(now) {
            let stats = runner.board().queue().stats();
            debug!(
                "Bus: {} chains submitted, {} rejected",
                stats.submitted, stats.rejected
            );
        }
    }
}

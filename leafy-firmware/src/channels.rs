//! Inter-task communication channels
//!
//! The poll loop hands chain heads to the bus task through [`BUS_QUEUE`].
//! Completion flows back through each descriptor's busy flag, never
//! through a channel.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::{Channel, TrySendError};

use leafy_core::{BusDriver, SubmitError, Transfer};

/// Chains waiting for the bus
///
/// Every chain on the board can be queued at once: the display init, two
/// lines, the backlight, and the two expander transfers.
const BUS_QUEUE_DEPTH: usize = 8;

/// Chain heads submitted by the poll loop
pub static BUS_QUEUE: Channel<CriticalSectionRawMutex, &'static Transfer, BUS_QUEUE_DEPTH> =
    Channel::new();

/// [`BusDriver`] backed by [`BUS_QUEUE`]
///
/// Never waits: a full queue is reported as [`SubmitError::DriverFull`]
/// and the chain is rolled back to idle by the queue.
pub struct ChannelDriver;

impl BusDriver for ChannelDriver {
    fn begin_transfer(&mut self, head: &'static Transfer) -> Result<(), SubmitError> {
        BUS_QUEUE.try_send(head).map_err(|TrySendError::Full(_)| {
            defmt::trace!("bus queue full");
            SubmitError::DriverFull
        })
    }
}

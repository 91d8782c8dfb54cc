//! Non-blocking I2C transfer queue
//!
//! ```text
//!   poll loop                      bus task
//!   ─────────                      ────────
//!   !busy && dirty?
//!     stage data
//!     I2cQueue::submit ──busy=1──► BusDriver::begin_transfer
//!                                    execute(i2c, head)
//!                                      walk chain, clock bytes
//!   (next tick) ◄────────busy=0──── Transfer::complete(result)
//! ```
//!
//! The busy flag is the only admission control. Only the poll loop sets
//! it (via `submit`), only the bus side clears it (via `complete`).

pub mod executor;
pub mod queue;
pub mod transfer;

pub use executor::{abort_chain, execute};
pub use queue::{BusDriver, I2cQueue, QueueStats, SubmitError};
pub use transfer::{Direction, Transfer, TransferStatus, MAX_CHAIN, TRANSFER_CAPACITY};

//! Transfer descriptors
//!
//! A descriptor is a `static` record for one logical bus operation: target
//! address, direction, payload buffer and its busy/status bookkeeping. It
//! is created at init and reused forever; its owner restages the payload
//! and resubmits whenever the descriptor is idle.

use core::cell::{Cell, RefCell};

use critical_section::Mutex;
use leafy_hal::BusError;
use portable_atomic::{AtomicBool, AtomicU16, AtomicU8, Ordering};

/// Payload capacity of one descriptor
pub const TRANSFER_CAPACITY: usize = 20;

/// Longest chain the bus side will walk
pub const MAX_CHAIN: usize = 8;

/// Transfer direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Write,
    Read,
}

/// Outcome of the most recent submission
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransferStatus {
    /// Never submitted, or submission was refused
    Idle,
    /// Owned by the bus driver
    InFlight,
    /// Completed successfully
    Done,
    /// Completed with a bus error
    Failed(BusError),
}

const STATUS_IDLE: u8 = 0;
const STATUS_IN_FLIGHT: u8 = 1;
const STATUS_DONE: u8 = 2;
const STATUS_FAILED: u8 = 0x80;

impl TransferStatus {
    fn encode(self) -> u8 {
        match self {
            TransferStatus::Idle => STATUS_IDLE,
            TransferStatus::InFlight => STATUS_IN_FLIGHT,
            TransferStatus::Done => STATUS_DONE,
            TransferStatus::Failed(e) => STATUS_FAILED | e.code(),
        }
    }

    fn decode(raw: u8) -> Self {
        match raw {
            STATUS_IN_FLIGHT => TransferStatus::InFlight,
            STATUS_DONE => TransferStatus::Done,
            r if r & STATUS_FAILED != 0 => {
                TransferStatus::Failed(BusError::from_code(r & !STATUS_FAILED).unwrap_or(BusError::Other))
            }
            _ => TransferStatus::Idle,
        }
    }
}

struct Buffer {
    bytes: [u8; TRANSFER_CAPACITY],
    len: usize,
}

/// One I2C transfer descriptor
pub struct Transfer {
    address: u8,
    direction: Direction,
    stop: bool,
    buffer: Mutex<RefCell<Buffer>>,
    next: Mutex<Cell<Option<&'static Transfer>>>,
    busy: AtomicBool,
    status: AtomicU8,
    failed: AtomicBool,
    failures: AtomicU16,
}

impl Transfer {
    const fn new(address: u8, direction: Direction, fill: u8, len: usize, stop: bool) -> Self {
        Self {
            address,
            direction,
            stop,
            buffer: Mutex::new(RefCell::new(Buffer {
                bytes: [fill; TRANSFER_CAPACITY],
                len,
            })),
            next: Mutex::new(Cell::new(None)),
            busy: AtomicBool::new(false),
            status: AtomicU8::new(STATUS_IDLE),
            failed: AtomicBool::new(false),
            failures: AtomicU16::new(0),
        }
    }

    /// Write transfer to a 7-bit address, ending with a stop condition
    pub const fn write(address: u8) -> Self {
        Self::new(address, Direction::Write, 0, 0, true)
    }

    /// Write transfer that ends without a stop condition
    ///
    /// When linked to a read from the same address the bus side performs
    /// both as one write-then-read with a repeated start.
    pub const fn write_no_stop(address: u8) -> Self {
        Self::new(address, Direction::Write, 0, 0, false)
    }

    /// Read transfer of `len` bytes from a 7-bit address
    ///
    /// The receive buffer starts out as `0xFF`, the idle level of an
    /// active-low input port.
    pub const fn read(address: u8, len: usize) -> Self {
        let len = if len > TRANSFER_CAPACITY {
            TRANSFER_CAPACITY
        } else {
            len
        };
        Self::new(address, Direction::Read, 0xFF, len, true)
    }

    /// Target 7-bit address
    pub const fn address(&self) -> u8 {
        self.address
    }

    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Whether the transfer ends with a stop condition
    pub const fn stop(&self) -> bool {
        self.stop
    }

    /// Check if the descriptor is owned by the bus driver
    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Outcome of the most recent submission
    pub fn status(&self) -> TransferStatus {
        TransferStatus::decode(self.status.load(Ordering::Acquire))
    }

    /// Number of failed completions since boot
    pub fn failures(&self) -> u16 {
        self.failures.load(Ordering::Relaxed)
    }

    /// Consume the failure of the most recent completion, if any
    ///
    /// Returns each failure at most once, so a driver can re-arm its dirty
    /// flag exactly once per failed transfer.
    pub fn take_failure(&self) -> Option<BusError> {
        if self.is_busy() || !self.failed.swap(false, Ordering::AcqRel) {
            return None;
        }
        match self.status() {
            TransferStatus::Failed(e) => Some(e),
            _ => None,
        }
    }

    /// Append `next` to this descriptor's chain
    ///
    /// Chains are built once at init. The bus side sends a chain back to
    /// back under one bus acquisition.
    pub fn link(&self, next: &'static Transfer) {
        critical_section::with(|cs| self.next.borrow(cs).set(Some(next)));
    }

    /// Next descriptor in the chain
    pub fn next(&self) -> Option<&'static Transfer> {
        critical_section::with(|cs| self.next.borrow(cs).get())
    }

    /// This descriptor followed by everything linked after it
    pub fn chain(&'static self) -> impl Iterator<Item = &'static Transfer> {
        core::iter::successors(Some(self), |t| t.next()).take(MAX_CHAIN)
    }

    /// Payload length in bytes
    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.buffer.borrow_ref(cs).len)
    }

    /// Check if the payload is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Replace the payload, truncating to [`TRANSFER_CAPACITY`]
    ///
    /// Callers stage only while the descriptor is idle. For a read
    /// descriptor this sets the number of bytes to receive.
    pub fn stage(&self, bytes: &[u8]) {
        critical_section::with(|cs| {
            let mut buf = self.buffer.borrow_ref_mut(cs);
            let len = bytes.len().min(TRANSFER_CAPACITY);
            buf.bytes[..len].copy_from_slice(&bytes[..len]);
            buf.len = len;
        });
    }

    /// Run `f` over the current payload
    pub fn with_data<R>(&self, f: impl FnOnce(&[u8]) -> R) -> R {
        critical_section::with(|cs| {
            let buf = self.buffer.borrow_ref(cs);
            f(&buf.bytes[..buf.len])
        })
    }

    /// Copy the payload out, returning its length
    pub fn copy_out(&self, out: &mut [u8]) -> usize {
        self.with_data(|data| {
            let len = data.len().min(out.len());
            out[..len].copy_from_slice(&data[..len]);
            len
        })
    }

    /// Store received bytes into the payload (bus side, reads only)
    pub fn store_received(&self, data: &[u8]) {
        critical_section::with(|cs| {
            let mut buf = self.buffer.borrow_ref_mut(cs);
            let len = data.len().min(buf.len);
            buf.bytes[..len].copy_from_slice(&data[..len]);
        });
    }

    /// Claim the descriptor for the bus driver
    pub(crate) fn begin(&self) {
        self.status.store(STATUS_IN_FLIGHT, Ordering::Relaxed);
        self.busy.store(true, Ordering::Release);
    }

    /// Undo [`Transfer::begin`] when the driver refused the chain
    pub(crate) fn abandon(&self) {
        self.status.store(STATUS_IDLE, Ordering::Relaxed);
        self.busy.store(false, Ordering::Release);
    }

    /// Signal completion (bus side)
    ///
    /// Always clears busy, success or not, so the owner can never livelock
    /// on a descriptor the bus gave up on. Busy is released last so the
    /// owner sees the final status once it sees the descriptor idle.
    pub fn complete(&self, result: Result<(), BusError>) {
        let status = match result {
            Ok(()) => TransferStatus::Done,
            Err(e) => {
                self.failures.fetch_add(1, Ordering::Relaxed);
                self.failed.store(true, Ordering::Relaxed);
                TransferStatus::Failed(e)
            }
        };
        self.status.store(status.encode(), Ordering::Relaxed);
        self.busy.store(false, Ordering::Release);
    }
}

impl core::fmt::Debug for Transfer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Transfer")
            .field("address", &self.address)
            .field("direction", &self.direction)
            .field("busy", &self.is_busy())
            .field("status", &self.status())
            .finish()
    }
}

//! Host-side mock hardware
//!
//! In-memory stand-ins for the chip HAL and the bus task so the queue,
//! drivers and applications can be exercised without a target.

use core::cell::RefCell;

use critical_section::Mutex;
use embedded_hal::i2c::ErrorKind;
use embedded_hal_async::i2c::{ErrorType, I2c, Operation};
use heapless::Vec;
use leafy_hal::exti::EXTI_LINES;
use leafy_hal::gpio::{OutputType, Pull, Speed};
use leafy_hal::{BusError, Clock, Edge, ExtiController, GpioPort, Millis, PendingEdges, Pin};
use leafy_hal::{PinMode, PortId, PortMap};
use portable_atomic::{AtomicU32, Ordering};

use crate::board::Board;
use crate::bus::{BusDriver, SubmitError, Transfer, TRANSFER_CAPACITY};

/// Board wired entirely to mocks
pub type MockBoard = Board<MockPorts, MockBus, MockExti>;

/// Manually advanced millisecond clock
#[derive(Debug, Default)]
pub struct MockClock {
    now: AtomicU32,
}

impl MockClock {
    pub const fn new() -> Self {
        Self {
            now: AtomicU32::new(0),
        }
    }

    pub fn set(&self, now: Millis) {
        self.now.store(now.as_u32(), Ordering::Relaxed);
    }

    pub fn advance(&self, ms: u32) -> Millis {
        Millis(self.now.fetch_add(ms, Ordering::Relaxed).wrapping_add(ms))
    }
}

impl Clock for MockClock {
    fn now(&self) -> Millis {
        Millis(self.now.load(Ordering::Relaxed))
    }
}

/// Records submitted chains; completion is driven by the test
#[derive(Debug, Default)]
pub struct MockBus {
    log: Vec<&'static Transfer, 64>,
    full: bool,
    auto_complete: bool,
}

impl MockBus {
    pub const fn new() -> Self {
        Self {
            log: Vec::new(),
            full: false,
            auto_complete: false,
        }
    }

    /// Complete every chain successfully as soon as it is submitted
    pub fn instant() -> Self {
        Self {
            auto_complete: true,
            ..Self::new()
        }
    }

    /// Refuse every submission with `DriverFull`
    pub fn set_full(&mut self, full: bool) {
        self.full = full;
    }

    /// Number of chains recorded since the last [`MockBus::clear_log`]
    pub fn submitted(&self) -> usize {
        self.log.len()
    }

    /// `n`-th recorded chain head
    pub fn head(&self, n: usize) -> Option<&'static Transfer> {
        self.log.get(n).copied()
    }

    /// Check if `transfer` was recorded as a chain head
    pub fn was_submitted(&self, transfer: &Transfer) -> bool {
        self.log.iter().any(|t| core::ptr::eq(*t, transfer))
    }

    /// Complete every in-flight descriptor of every recorded chain
    pub fn complete_all(&mut self, result: Result<(), BusError>) {
        for head in &self.log {
            for transfer in head.chain().filter(|t| t.is_busy()) {
                transfer.complete(result);
            }
        }
    }

    pub fn clear_log(&mut self) {
        self.log.clear();
    }
}

impl BusDriver for MockBus {
    fn begin_transfer(&mut self, head: &'static Transfer) -> Result<(), SubmitError> {
        if self.full {
            return Err(SubmitError::DriverFull);
        }
        if self.log.is_full() {
            self.log.remove(0);
        }
        let _ = self.log.push(head);
        if self.auto_complete {
            for transfer in head.chain() {
                transfer.complete(Ok(()));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct MockPort {
    idr: u16,
    odr: u16,
    moder: u32,
}

impl GpioPort for MockPort {
    fn set_mode(&mut self, bit: u8, mode: PinMode) {
        let shift = 2 * u32::from(bit & 0x0F);
        self.moder = (self.moder & !(0b11 << shift)) | ((mode as u32) << shift);
    }

    fn set_config(&mut self, _bit: u8, _ot: OutputType, _speed: Speed, _pull: Pull) {}

    fn set_alt_function(&mut self, _bit: u8, _af: u8) {}

    fn input(&self) -> u16 {
        self.idr
    }

    fn output(&self) -> u16 {
        self.odr
    }

    fn write_output(&mut self, value: u16) {
        self.odr = value;
    }
}

/// In-memory on-chip ports A-H (and a spare X)
#[derive(Debug, Default)]
pub struct MockPorts {
    ports: [MockPort; 9],
}

impl MockPorts {
    pub fn new() -> Self {
        Self::default()
    }

    fn index(id: PortId) -> usize {
        id.index() as usize
    }

    /// Output data register of a port
    pub fn output(&self, id: PortId) -> u16 {
        self.ports[Self::index(id)].odr
    }

    /// Drive a port's input data register
    pub fn set_input(&mut self, id: PortId, value: u16) {
        self.ports[Self::index(id)].idr = value;
    }

    /// Configured mode of a pin
    pub fn mode(&self, pin: Pin) -> PinMode {
        match (self.ports[Self::index(pin.port)].moder >> (2 * u32::from(pin.bit & 0x0F))) & 0b11 {
            0b00 => PinMode::Input,
            0b01 => PinMode::Output,
            0b10 => PinMode::AltFunction,
            _ => PinMode::Analog,
        }
    }
}

impl PortMap for MockPorts {
    fn port(&mut self, id: PortId) -> &mut dyn GpioPort {
        &mut self.ports[Self::index(id)]
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct ExtiState {
    rising_enabled: u16,
    falling_enabled: u16,
    rising_pending: u16,
    falling_pending: u16,
    routes: [Option<PortId>; EXTI_LINES],
    clears: [u32; EXTI_LINES],
}

/// EXTI controller with software-triggered pending flags
pub struct MockExti {
    state: Mutex<RefCell<ExtiState>>,
}

impl Default for MockExti {
    fn default() -> Self {
        Self::new()
    }
}

impl MockExti {
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(ExtiState {
                rising_enabled: 0,
                falling_enabled: 0,
                rising_pending: 0,
                falling_pending: 0,
                routes: [None; EXTI_LINES],
                clears: [0; EXTI_LINES],
            })),
        }
    }

    fn with<R>(&self, f: impl FnOnce(&mut ExtiState) -> R) -> R {
        critical_section::with(|cs| f(&mut self.state.borrow_ref_mut(cs)))
    }

    /// Latch a pending edge on `line`
    pub fn trigger(&self, line: u8, edge: Edge) {
        let mask = 1u16 << (line & 0x0F);
        self.with(|s| match edge {
            Edge::Rising => s.rising_pending |= mask,
            Edge::Falling => s.falling_pending |= mask,
        });
    }

    pub fn is_enabled(&self, line: u8, edge: Edge) -> bool {
        let mask = 1u16 << (line & 0x0F);
        self.with(|s| match edge {
            Edge::Rising => s.rising_enabled & mask != 0,
            Edge::Falling => s.falling_enabled & mask != 0,
        })
    }

    /// Port the line is routed to
    pub fn routed_port(&self, line: u8) -> Option<PortId> {
        self.with(|s| s.routes[usize::from(line & 0x0F)])
    }

    /// How many times `clear` acknowledged something on `line`
    pub fn clear_count(&self, line: u8) -> u32 {
        self.with(|s| s.clears[usize::from(line & 0x0F)])
    }
}

impl ExtiController for MockExti {
    fn enable(&self, pin: Pin, edge: Edge) {
        let mask = pin.mask();
        self.with(|s| {
            s.routes[usize::from(pin.bit & 0x0F)] = Some(pin.port);
            match edge {
                Edge::Rising => s.rising_enabled |= mask,
                Edge::Falling => s.falling_enabled |= mask,
            }
        });
    }

    fn pending(&self, line: u8) -> PendingEdges {
        let mask = 1u16 << (line & 0x0F);
        self.with(|s| PendingEdges {
            rising: s.rising_pending & mask != 0,
            falling: s.falling_pending & mask != 0,
        })
    }

    fn clear(&self, line: u8, edges: PendingEdges) {
        let mask = 1u16 << (line & 0x0F);
        self.with(|s| {
            if edges.rising {
                s.rising_pending &= !mask;
            }
            if edges.falling {
                s.falling_pending &= !mask;
            }
            s.clears[usize::from(line & 0x0F)] += 1;
        });
    }
}

/// One recorded I2C transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockOp {
    pub address: u8,
    pub written: Vec<u8, TRANSFER_CAPACITY>,
    pub read_len: usize,
}

impl MockOp {
    pub fn write(address: u8, bytes: &[u8]) -> Self {
        Self::write_read(address, bytes, 0)
    }

    pub fn read(address: u8, len: usize) -> Self {
        Self::write_read(address, &[], len)
    }

    pub fn write_read(address: u8, bytes: &[u8], read_len: usize) -> Self {
        let mut written = Vec::new();
        let _ = written.extend_from_slice(bytes);
        Self {
            address,
            written,
            read_len,
        }
    }
}

/// Async I2C master that records transactions
#[derive(Debug, Default)]
pub struct MockI2c {
    ops: Vec<MockOp, 16>,
    read_data: Vec<u8, TRANSFER_CAPACITY>,
    fail_next: Option<ErrorKind>,
}

impl MockI2c {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes returned by subsequent reads (0xFF past the end)
    pub fn set_read_data(&mut self, data: &[u8]) {
        self.read_data.clear();
        let _ = self.read_data.extend_from_slice(data);
    }

    /// Fail the next transaction with `kind`
    pub fn fail_next(&mut self, kind: ErrorKind) {
        self.fail_next = Some(kind);
    }

    pub fn ops(&self) -> &[MockOp] {
        &self.ops
    }
}

impl ErrorType for MockI2c {
    type Error = ErrorKind;
}

impl I2c for MockI2c {
    async fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if let Some(kind) = self.fail_next.take() {
            return Err(kind);
        }
        let mut op = MockOp::write(address, &[]);
        for operation in operations.iter_mut() {
            match operation {
                Operation::Write(bytes) => {
                    let _ = op.written.extend_from_slice(*bytes);
                }
                Operation::Read(buf) => {
                    for (i, byte) in buf.iter_mut().enumerate() {
                        *byte = self.read_data.get(i).copied().unwrap_or(0xFF);
                    }
                    op.read_len += buf.len();
                }
            }
        }
        let _ = self.ops.push(op);
        Ok(())
    }
}

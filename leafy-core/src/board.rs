//! Owned board context
//!
//! Everything the poll loop mutates lives here: on-chip ports, the virtual
//! expander port, the transfer queue and the two I2C device drivers. Apps
//! get `&mut Board` for one poll and nothing else.

use core::fmt;

use leafy_hal::{Edge, ExtiController, GpioPort, Pin, PortId, PortMap};

use crate::bus::{BusDriver, I2cQueue, SubmitError};
use crate::display::{Color, Display, DisplayTransfers};
use crate::expander::{ExpanderTransfers, IoExpander, RefreshPolicy};
use crate::gpio::{EdgeHandler, InterruptTable, VirtualPort};

/// Every descriptor on the board's I2C bus
pub struct BoardTransfers {
    pub display: DisplayTransfers,
    pub expander: ExpanderTransfers,
}

impl Default for BoardTransfers {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardTransfers {
    pub const fn new() -> Self {
        Self {
            display: DisplayTransfers::new(),
            expander: ExpanderTransfers::new(),
        }
    }
}

/// Poll-loop board context
pub struct Board<P: PortMap, D: BusDriver, E: ExtiController> {
    ports: P,
    iox: VirtualPort,
    queue: I2cQueue<D>,
    display: Display,
    expander: IoExpander,
    interrupts: &'static InterruptTable,
    exti: E,
}

impl<P: PortMap, D: BusDriver, E: ExtiController> Board<P, D, E> {
    pub fn new(
        ports: P,
        driver: D,
        exti: E,
        interrupts: &'static InterruptTable,
        transfers: &'static BoardTransfers,
        policy: RefreshPolicy,
    ) -> Self {
        Self {
            ports,
            iox: VirtualPort::new(),
            queue: I2cQueue::new(driver),
            display: Display::new(&transfers.display),
            expander: IoExpander::new(&transfers.expander, policy),
            interrupts,
            exti,
        }
    }

    /// Attach an edge handler to a pin and enable its interrupt line
    pub fn register_interrupt(&mut self, pin: Pin, handler: &'static dyn EdgeHandler, edge: Edge) {
        self.interrupts.register(&self.exti, pin, handler, edge);
    }

    /// Send the LCD initialization sequence
    pub fn enable_display(&mut self) -> Result<(), SubmitError> {
        self.display.enable(&mut self.queue)
    }

    /// Format text into an LCD line
    pub fn print(&mut self, line: usize, args: fmt::Arguments<'_>) {
        self.display.print(line, args);
    }

    /// Set an LCD line to plain text
    pub fn set_line_text(&mut self, line: usize, text: &str) {
        self.display.set_line_text(line, text);
    }

    /// Set the LCD backlight color
    pub fn set_color(&mut self, color: Color) {
        self.display.set_color(color);
    }

    /// Per-tick device refresh: display first, then the expander bridge
    pub fn service(&mut self) {
        self.display.update(&mut self.queue);
        self.expander.update(&mut self.iox, &mut self.queue);
    }

    pub fn display(&self) -> &Display {
        &self.display
    }

    pub fn queue(&self) -> &I2cQueue<D> {
        &self.queue
    }

    pub fn queue_mut(&mut self) -> &mut I2cQueue<D> {
        &mut self.queue
    }

    /// The virtual expander port registers
    pub fn expander_port(&self) -> &VirtualPort {
        &self.iox
    }

    pub fn expander_port_mut(&mut self) -> &mut VirtualPort {
        &mut self.iox
    }

    pub fn ports(&self) -> &P {
        &self.ports
    }

    pub fn ports_mut(&mut self) -> &mut P {
        &mut self.ports
    }

    pub fn exti(&self) -> &E {
        &self.exti
    }
}

impl<P: PortMap, D: BusDriver, E: ExtiController> PortMap for Board<P, D, E> {
    fn port(&mut self, id: PortId) -> &mut dyn GpioPort {
        if id.is_virtual() {
            &mut self.iox
        } else {
            self.ports.port(id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpio::GpioExt;
    use crate::input::EventFlag;
    use crate::mocks::{MockBoard, MockBus, MockExti, MockPorts};
    use leafy_hal::Level;

    fn board(transfers: &'static BoardTransfers, table: &'static InterruptTable) -> MockBoard {
        Board::new(
            MockPorts::new(),
            MockBus::new(),
            MockExti::new(),
            table,
            transfers,
            RefreshPolicy::Always,
        )
    }

    #[test]
    fn test_virtual_port_routing() {
        static T: BoardTransfers = BoardTransfers::new();
        static TABLE: InterruptTable = InterruptTable::new();
        let mut board = board(&T, &TABLE);

        board.write(Pin::new(PortId::X, 0), Level::High);
        board.write(Pin::new(PortId::B, 9), Level::High);
        assert_eq!(board.expander_port().output(), 0x0001);
        assert_eq!(board.ports().output(PortId::B), 1 << 9);
        assert_eq!(board.ports().output(PortId::X), 0);
    }

    #[test]
    fn test_service_order_display_then_expander() {
        static T: BoardTransfers = BoardTransfers::new();
        static TABLE: InterruptTable = InterruptTable::new();
        let mut board = board(&T, &TABLE);

        board.enable_display().unwrap();
        board.set_line_text(0, "Linear Pong");
        board.write_port(PortId::X, 0x01);
        board.service();

        let bus = board.queue().driver();
        assert!(core::ptr::eq(bus.head(0).unwrap(), T.display.init()));
        assert!(core::ptr::eq(bus.head(1).unwrap(), T.display.line(0).unwrap()));
        assert!(core::ptr::eq(bus.head(2).unwrap(), T.display.backlight()));
        assert!(core::ptr::eq(bus.head(3).unwrap(), T.expander.leds()));
        assert!(core::ptr::eq(bus.head(4).unwrap(), T.expander.buttons()));
    }

    #[test]
    fn test_register_interrupt() {
        static T: BoardTransfers = BoardTransfers::new();
        static TABLE: InterruptTable = InterruptTable::new();
        static MOTION: EventFlag = EventFlag::new();
        let mut board = board(&T, &TABLE);

        board.register_interrupt(Pin::new(PortId::B, 8), &MOTION, Edge::Rising);
        assert!(board.exti().is_enabled(8, Edge::Rising));

        board.exti().trigger(8, Edge::Rising);
        TABLE.dispatch(board.exti(), 8);
        assert!(MOTION.take());
    }
}

//! Pin-level operations over a [`PortMap`]

use leafy_hal::gpio::{OutputType, Pull, Speed};
use leafy_hal::{Level, Pin, PinMode, PortId, PortMap};

/// Pin operations for anything that can resolve a port
///
/// All operations are immediate register accesses. Port-wide variants
/// touch all 16 bits in one register access.
pub trait GpioExt: PortMap {
    /// Set a pin's operating mode
    fn configure(&mut self, pin: Pin, mode: PinMode) {
        self.port(pin.port).set_mode(pin.bit, mode);
    }

    /// Set a pin's output type, slew rate and pull resistor
    fn configure_extra(&mut self, pin: Pin, output_type: OutputType, speed: Speed, pull: Pull) {
        self.port(pin.port).set_config(pin.bit, output_type, speed, pull);
    }

    /// Select a pin's alternate function
    fn set_alt_function(&mut self, pin: Pin, af: u8) {
        self.port(pin.port).set_alt_function(pin.bit, af);
    }

    /// Read a pin's input level
    fn read(&mut self, pin: Pin) -> Level {
        Level::from(self.port(pin.port).input() & pin.mask() != 0)
    }

    /// Drive a pin
    fn write(&mut self, pin: Pin, level: Level) {
        let port = self.port(pin.port);
        match level {
            Level::High => port.set_bits(pin.mask()),
            Level::Low => port.clear_bits(pin.mask()),
        }
    }

    /// Invert a pin's output
    fn toggle(&mut self, pin: Pin) {
        self.port(pin.port).toggle_bits(pin.mask());
    }

    /// Read all 16 input bits of a port
    fn read_port(&mut self, port: PortId) -> u16 {
        self.port(port).input()
    }

    /// Write all 16 output bits of a port
    fn write_port(&mut self, port: PortId, value: u16) {
        self.port(port).write_output(value);
    }
}

impl<T: PortMap + ?Sized> GpioExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::MockPorts;

    #[test]
    fn test_write_toggle_read_back() {
        let mut ports = MockPorts::new();
        let led = Pin::new(PortId::B, 9);

        ports.configure(led, PinMode::Output);
        assert_eq!(ports.mode(led), PinMode::Output);

        ports.write(led, Level::High);
        assert_eq!(ports.output(PortId::B), 1 << 9);
        ports.toggle(led);
        assert_eq!(ports.output(PortId::B), 0);
    }

    #[test]
    fn test_read_input() {
        let mut ports = MockPorts::new();
        let button = Pin::new(PortId::C, 13);

        ports.set_input(PortId::C, 1 << 13);
        assert_eq!(ports.read(button), Level::High);
        assert_eq!(ports.read(Pin::new(PortId::C, 12)), Level::Low);
        assert_eq!(ports.read_port(PortId::C), 0x2000);
    }

    #[test]
    fn test_write_port_replaces_all_bits() {
        let mut ports = MockPorts::new();
        ports.write(Pin::new(PortId::A, 0), Level::High);
        ports.write_port(PortId::A, 0x8000);
        assert_eq!(ports.output(PortId::A), 0x8000);
    }
}

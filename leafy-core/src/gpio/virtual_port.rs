//! Emulated GPIO registers for the I/O-expander pair
//!
//! The poll loop reads and writes this port like any other. The expander
//! bridge copies ODR out to the LED device and the button device's byte in
//! to IDR once per tick.

use leafy_hal::gpio::{OutputType, Pull, Speed};
use leafy_hal::{GpioPort, PinMode};

/// Register file of the virtual port
///
/// Mode and config registers use the STM32 field encodings so code that
/// configures expander pins reads the same as for on-chip pins, but they
/// have no effect on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VirtualPort {
    idr: u16,
    odr: u16,
    moder: u32,
    otyper: u16,
    ospeedr: u32,
    pupdr: u32,
    afr: u64,
}

impl VirtualPort {
    pub const fn new() -> Self {
        Self {
            idr: 0,
            odr: 0,
            moder: 0,
            otyper: 0,
            ospeedr: 0,
            pupdr: 0,
            afr: 0,
        }
    }

    /// Replace the input data register (bridge side)
    pub fn set_input(&mut self, value: u16) {
        self.idr = value;
    }

    /// Mode of one pin as last configured
    pub fn mode(&self, bit: u8) -> PinMode {
        match (self.moder >> (2 * u32::from(bit & 0x0F))) & 0b11 {
            0b00 => PinMode::Input,
            0b01 => PinMode::Output,
            0b10 => PinMode::AltFunction,
            _ => PinMode::Analog,
        }
    }
}

fn set_field32(reg: &mut u32, bit: u8, width: u32, value: u32) {
    let shift = width * u32::from(bit & 0x0F);
    let mask = ((1u32 << width) - 1) << shift;
    *reg = (*reg & !mask) | ((value << shift) & mask);
}

impl GpioPort for VirtualPort {
    fn set_mode(&mut self, bit: u8, mode: PinMode) {
        set_field32(&mut self.moder, bit, 2, mode as u32);
    }

    fn set_config(&mut self, bit: u8, output_type: OutputType, speed: Speed, pull: Pull) {
        let mask = 1u16 << (bit & 0x0F);
        match output_type {
            OutputType::PushPull => self.otyper &= !mask,
            OutputType::OpenDrain => self.otyper |= mask,
        }
        set_field32(&mut self.ospeedr, bit, 2, speed as u32);
        set_field32(&mut self.pupdr, bit, 2, pull as u32);
    }

    fn set_alt_function(&mut self, bit: u8, af: u8) {
        let shift = 4 * u64::from(bit & 0x0F);
        self.afr = (self.afr & !(0xFu64 << shift)) | (u64::from(af & 0x0F) << shift);
    }

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_encoding() {
        let mut port = VirtualPort::new();
        port.set_mode(3, PinMode::Output);
        port.set_mode(15, PinMode::Analog);
        assert_eq!(port.mode(3), PinMode::Output);
        assert_eq!(port.mode(15), PinMode::Analog);
        assert_eq!(port.mode(4), PinMode::Input);

        port.set_mode(3, PinMode::Input);
        assert_eq!(port.mode(3), PinMode::Input);
    }

    #[test]
    fn test_data_registers_independent() {
        let mut port = VirtualPort::new();
        port.write_output(0x00FF);
        port.set_input(0xAB00);
        assert_eq!(port.output(), 0x00FF);
        assert_eq!(port.input(), 0xAB00);
    }
}

//! On-chip GPIO ports for STM32L5
//!
//! Each port is driven through its register block. Pins handed to embassy
//! drivers (I2C, EXTI inputs) are reserved first; register writes leave
//! reserved bits untouched, so an application can never reconfigure a bus
//! pin by accident.

use embassy_stm32::pac;
use embassy_stm32::pac::gpio::{regs, vals, Gpio};
use leafy_hal::gpio::{OutputType, Pull, Speed};
use leafy_hal::{GpioPort, Pin, PinMode, PortId, PortMap};

/// Pin reservation error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinError {
    /// Pin is not on an on-chip port
    InvalidPin,
    /// Pin is already reserved
    AlreadyReserved,
}

/// One on-chip port's register block
pub struct RegisterPort {
    regs: Gpio,
    reserved: u16,
}

impl RegisterPort {
    pub const fn new(regs: Gpio) -> Self {
        Self { regs, reserved: 0 }
    }

    /// Bits owned by other drivers
    pub fn reserved(&self) -> u16 {
        self.reserved
    }

    fn is_free(&self, bit: u8) -> bool {
        bit < 16 && self.reserved & (1 << bit) == 0
    }
}

impl GpioPort for RegisterPort {
    fn set_mode(&mut self, bit: u8, mode: PinMode) {
        if !self.is_free(bit) {
            return;
        }
        let mode = vals::Moder::from_bits(mode as u8);
        self.regs
            .moder()
            .modify(|w| w.set_moder(usize::from(bit), mode));
    }

    fn set_config(&mut self, bit: u8, output_type: OutputType, speed: Speed, pull: Pull) {
        if !self.is_free(bit) {
            return;
        }
        let n = usize::from(bit);
        self.regs
            .otyper()
            .modify(|w| w.set_ot(n, vals::Ot::from_bits(output_type as u8)));
        self.regs
            .ospeedr()
            .modify(|w| w.set_ospeedr(n, vals::Ospeedr::from_bits(speed as u8)));
        self.regs
            .pupdr()
            .modify(|w| w.set_pupdr(n, vals::Pupdr::from_bits(pull as u8)));
    }

    fn set_alt_function(&mut self, bit: u8, af: u8) {
        if !self.is_free(bit) {
            return;
        }
        let n = usize::from(bit);
        self.regs
            .afr(n / 8)
            .modify(|w| w.set_afr(n % 8, af & 0x0F));
    }

    fn input(&self) -> u16 {
        self.regs.idr().read().0 as u16
    }

    fn output(&self) -> u16 {
        self.regs.odr().read().0 as u16
    }

    fn write_output(&mut self, value: u16) {
        let kept = self.output() & self.reserved;
        let value = (value & !self.reserved) | kept;
        self.regs.odr().write_value(regs::Odr(u32::from(value)));
    }

    // BSRR: low half sets, high half resets, both single-cycle
    fn set_bits(&mut self, mask: u16) {
        let mask = mask & !self.reserved;
        self.regs.bsrr().write_value(regs::Bsrr(u32::from(mask)));
    }

    fn clear_bits(&mut self, mask: u16) {
        let mask = mask & !self.reserved;
        self.regs
            .bsrr()
            .write_value(regs::Bsrr(u32::from(mask) << 16));
    }
}

/// Stand-in for ports the chip HAL does not own
///
/// The board context serves the virtual port itself, so this is never
/// reached in practice.
struct Unrouted;

impl GpioPort for Unrouted {
    fn set_mode(&mut self, _bit: u8, _mode: PinMode) {}
    fn set_config(&mut self, _bit: u8, _ot: OutputType, _speed: Speed, _pull: Pull) {}
    fn set_alt_function(&mut self, _bit: u8, _af: u8) {}
    fn input(&self) -> u16 {
        0
    }
    fn output(&self) -> u16 {
        0
    }
    fn write_output(&mut self, _value: u16) {}
}

/// Ports A-H of the STM32L552
pub struct BoardPorts {
    ports: [RegisterPort; 8],
    unrouted: Unrouted,
}

impl Default for BoardPorts {
    fn default() -> Self {
        Self::new()
    }
}

impl BoardPorts {
    /// Port registers must be clocked; `embassy_stm32::init` does that
    pub fn new() -> Self {
        Self {
            ports: [
                RegisterPort::new(pac::GPIOA),
                RegisterPort::new(pac::GPIOB),
                RegisterPort::new(pac::GPIOC),
                RegisterPort::new(pac::GPIOD),
                RegisterPort::new(pac::GPIOE),
                RegisterPort::new(pac::GPIOF),
                RegisterPort::new(pac::GPIOG),
                RegisterPort::new(pac::GPIOH),
            ],
            unrouted: Unrouted,
        }
    }

    /// Hand a pin to another driver
    pub fn reserve(&mut self, pin: Pin) -> Result<(), PinError> {
        if pin.port.is_virtual() || pin.bit > 15 {
            return Err(PinError::InvalidPin);
        }
        let port = &mut self.ports[usize::from(pin.port.index())];
        if port.reserved & pin.mask() != 0 {
            return Err(PinError::AlreadyReserved);
        }
        port.reserved |= pin.mask();
        Ok(())
    }

    /// Check if a pin is reserved
    pub fn is_reserved(&self, pin: Pin) -> bool {
        self.ports
            .get(usize::from(pin.port.index()))
            .is_some_and(|port| port.reserved & pin.mask() != 0)
    }
}

impl PortMap for BoardPorts {
    fn port(&mut self, id: PortId) -> &mut dyn GpioPort {
        match self.ports.get_mut(usize::from(id.index())) {
            Some(port) => port,
            None => &mut self.unrouted,
        }
    }
}

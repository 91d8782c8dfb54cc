//! GPIO port abstractions
//!
//! A port is modelled as its register file: mode, output configuration,
//! alternate function, and the 16-bit input/output data registers. Chip HALs
//! implement [`GpioPort`] for real ports; `leafy-core` implements it for the
//! virtual port mirrored onto the I/O expanders.

/// GPIO port identifier
///
/// `A` through `H` are on-chip ports. `X` is the virtual port backed by the
/// I2C I/O expanders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PortId {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    /// Virtual port (I/O expanders)
    X,
}

impl PortId {
    /// On-chip ports in EXTI routing order
    pub const ONCHIP: [PortId; 8] = [
        PortId::A,
        PortId::B,
        PortId::C,
        PortId::D,
        PortId::E,
        PortId::F,
        PortId::G,
        PortId::H,
    ];

    /// Port number used by the EXTI line multiplexer (A = 0)
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Check if this is the virtual expander port
    pub const fn is_virtual(self) -> bool {
        matches!(self, PortId::X)
    }
}

/// Pin descriptor: a port and a bit index 0-15
///
/// Immutable and freely copied. The hardware state lives in the port
/// registers, not here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Pin {
    /// Port the pin belongs to
    pub port: PortId,
    /// Bit index within the port (0-15)
    pub bit: u8,
}

impl Pin {
    /// Create a new pin descriptor
    pub const fn new(port: PortId, bit: u8) -> Self {
        Self { port, bit }
    }

    /// Single-bit mask for this pin within its port
    pub const fn mask(self) -> u16 {
        1 << (self.bit & 0x0F)
    }
}

/// Logic level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Level {
    Low,
    High,
}

impl Level {
    /// Check if the level is high
    pub const fn is_high(self) -> bool {
        matches!(self, Level::High)
    }
}

impl From<bool> for Level {
    fn from(high: bool) -> Self {
        if high {
            Level::High
        } else {
            Level::Low
        }
    }
}

impl core::ops::Not for Level {
    type Output = Level;

    fn not(self) -> Level {
        match self {
            Level::Low => Level::High,
            Level::High => Level::Low,
        }
    }
}

/// Signal edge, used both as trigger selector and handler-table index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Edge {
    Rising,
    Falling,
}

impl Edge {
    /// Both edges, in dispatch order
    pub const ALL: [Edge; 2] = [Edge::Rising, Edge::Falling];

    /// Index into a `[_; 2]` table
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Pin operating mode (MODER encoding)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum PinMode {
    Input = 0b00,
    Output = 0b01,
    AltFunction = 0b10,
    Analog = 0b11,
}

/// Output driver type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum OutputType {
    #[default]
    PushPull = 0,
    OpenDrain = 1,
}

/// Output slew rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Speed {
    #[default]
    Low = 0b00,
    Medium = 0b01,
    High = 0b10,
    VeryHigh = 0b11,
}

/// Internal pull resistor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Pull {
    #[default]
    None = 0b00,
    Up = 0b01,
    Down = 0b10,
}

/// One GPIO port's register file
///
/// All operations are immediate register accesses with no failure path.
/// An out-of-range bit is a programming error; implementations mask it.
pub trait GpioPort {
    /// Set the operating mode of one pin
    fn set_mode(&mut self, bit: u8, mode: PinMode);

    /// Set output type, slew rate and pull resistor of one pin
    fn set_config(&mut self, bit: u8, output_type: OutputType, speed: Speed, pull: Pull);

    /// Select the alternate function (0-15) used in `AltFunction` mode
    fn set_alt_function(&mut self, bit: u8, af: u8);

    /// Read the input data register (all 16 bits)
    fn input(&self) -> u16;

    /// Read back the output data register
    fn output(&self) -> u16;

    /// Write the whole output data register
    fn write_output(&mut self, value: u16);

    /// Drive the masked bits high
    ///
    /// The default is a read-modify-write of the output register. Ports
    /// with an atomic set/reset register should override it.
    fn set_bits(&mut self, mask: u16) {
        let value = self.output() | mask;
        self.write_output(value);
    }

    /// Drive the masked bits low
    fn clear_bits(&mut self, mask: u16) {
        let value = self.output() & !mask;
        self.write_output(value);
    }

    /// Invert the masked output bits
    fn toggle_bits(&mut self, mask: u16) {
        let value = self.output() ^ mask;
        self.write_output(value);
    }
}

/// Resolves a port identifier to its register file
pub trait PortMap {
    /// Get the port registers for `id`
    fn port(&mut self, id: PortId) -> &mut dyn GpioPort;
}

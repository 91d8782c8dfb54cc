//! I2C bus configuration and error types
//!
//! The byte-level transfer mechanics come from `embedded-hal-async`; this
//! module only carries what the queue and the chip HAL share.

use embedded_hal::i2c::ErrorKind;

/// I2C configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct I2cConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self::STANDARD
    }
}

impl I2cConfig {
    /// Standard mode (100 kHz)
    pub const STANDARD: Self = Self { frequency: 100_000 };

    /// Fast mode (400 kHz)
    pub const FAST: Self = Self { frequency: 400_000 };

    /// Fast mode plus (1 MHz)
    pub const FAST_PLUS: Self = Self {
        frequency: 1_000_000,
    };
}

/// Error from a completed bus transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BusError {
    /// NACK received (address or data)
    Nack,
    /// Arbitration lost
    ArbitrationLost,
    /// Bus error (misplaced start/stop)
    Bus,
    /// Timeout
    Timeout,
    /// Overrun/underrun
    Overrun,
    /// Other error
    Other,
}

impl BusError {
    /// Compact encoding used by the transfer status word (never 0)
    pub const fn code(self) -> u8 {
        match self {
            BusError::Nack => 1,
            BusError::ArbitrationLost => 2,
            BusError::Bus => 3,
            BusError::Timeout => 4,
            BusError::Overrun => 5,
            BusError::Other => 6,
        }
    }

    /// Decode a status word produced by [`BusError::code`]
    pub const fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(BusError::Nack),
            2 => Some(BusError::ArbitrationLost),
            3 => Some(BusError::Bus),
            4 => Some(BusError::Timeout),
            5 => Some(BusError::Overrun),
            6 => Some(BusError::Other),
            _ => None,
        }
    }
}

impl From<ErrorKind> for BusError {
    fn from(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::NoAcknowledge(_) => BusError::Nack,
            ErrorKind::ArbitrationLoss => BusError::ArbitrationLost,
            ErrorKind::Bus => BusError::Bus,
            ErrorKind::Overrun => BusError::Overrun,
            _ => BusError::Other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::i2c::NoAcknowledgeSource;

    #[test]
    fn test_code_round_trip() {
        for err in [
            BusError::Nack,
            BusError::ArbitrationLost,
            BusError::Bus,
            BusError::Timeout,
            BusError::Overrun,
            BusError::Other,
        ] {
            assert_eq!(BusError::from_code(err.code()), Some(err));
        }
        assert_eq!(BusError::from_code(0), None);
    }

    #[test]
    fn test_error_kind_mapping() {
        assert_eq!(
            BusError::from(ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address)),
            BusError::Nack
        );
        assert_eq!(BusError::from(ErrorKind::ArbitrationLoss), BusError::ArbitrationLost);
        assert_eq!(BusError::from(ErrorKind::Other), BusError::Other);
    }
}

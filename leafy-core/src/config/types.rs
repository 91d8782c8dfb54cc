//! Configuration type definitions

use leafy_hal::I2cConfig;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::expander::RefreshPolicy;
use crate::input::ButtonTiming;

/// Number of selectable pong speeds
pub const PONG_SPEEDS: usize = 3;

/// Application to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AppKind {
    #[default]
    Alarm,
    /// Linear Pong, three buttons per player
    Pong,
    /// Linear Pong, one button per player
    Duel,
}

/// I2C bus settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BusConfig {
    /// SCL frequency in Hz
    pub frequency_hz: u32,
    /// Give up on a chain after this long
    pub timeout_ms: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            frequency_hz: I2cConfig::STANDARD.frequency,
            timeout_ms: 100,
        }
    }
}

impl BusConfig {
    pub fn i2c(&self) -> I2cConfig {
        I2cConfig {
            frequency: self.frequency_hz,
        }
    }
}

/// Alarm timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AlarmConfig {
    /// Release chatter lockout
    pub debounce_ms: u32,
    /// Presses shorter than this are brief
    pub brief_max_ms: u32,
    /// Presses held this long disarm
    pub held_ms: u32,
    /// Green/blue alternation period while armed
    pub toggle_ms: u32,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            brief_max_ms: 2000,
            held_ms: 3000,
            toggle_ms: 1000,
        }
    }
}

impl AlarmConfig {
    pub fn button_timing(&self) -> ButtonTiming {
        ButtonTiming {
            debounce_ms: self.debounce_ms,
            brief_max_ms: self.brief_max_ms,
        }
    }
}

/// Pong timing and rules
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PongConfig {
    /// Ball step period per speed (slow, medium, fast)
    pub speeds_ms: [u32; PONG_SPEEDS],
    /// Holding start this long returns to the title screen
    pub quit_hold_ms: u32,
    /// LED flash period on the win screen
    pub flash_ms: u32,
    /// Points needed to win
    pub win_score: u8,
    /// Lead needed to win
    pub win_margin: u8,
}

impl Default for PongConfig {
    fn default() -> Self {
        Self {
            speeds_ms: [150, 110, 70],
            quit_hold_ms: 3000,
            flash_ms: 400,
            win_score: 11,
            win_margin: 2,
        }
    }
}

/// Complete board configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct BoardConfig {
    pub bus: BusConfig,
    pub alarm: AlarmConfig,
    pub pong: PongConfig,
    /// LED expander refresh policy
    pub expander: RefreshPolicy,
    pub app: AppKind,
}

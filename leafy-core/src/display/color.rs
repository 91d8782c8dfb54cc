//! Backlight colors

/// Packed `0xRRGGBB` backlight color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Color(pub u32);

impl Color {
    pub const BLACK: Color = Color(0x00_00_00);
    pub const WHITE: Color = Color(0xFF_FF_FF);
    pub const RED: Color = Color(0xFF_00_00);
    pub const GREEN: Color = Color(0x00_FF_00);
    pub const BLUE: Color = Color(0x00_00_FF);
    pub const YELLOW: Color = Color(0xFF_FF_00);
    pub const CYAN: Color = Color(0x00_FF_FF);
    pub const MAGENTA: Color = Color(0xFF_00_FF);

    /// Build from channel intensities
    pub const fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Color(((red as u32) << 16) | ((green as u32) << 8) | blue as u32)
    }

    /// Split into `[red, green, blue]` intensities
    pub const fn channels(self) -> [u8; 3] {
        [
            ((self.0 >> 16) & 0xFF) as u8,
            ((self.0 >> 8) & 0xFF) as u8,
            (self.0 & 0xFF) as u8,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channels() {
        assert_eq!(Color::YELLOW.channels(), [0xFF, 0xFF, 0x00]);
        assert_eq!(Color(0x12_34_56).channels(), [0x12, 0x34, 0x56]);
        assert_eq!(Color::rgb(0x12, 0x34, 0x56), Color(0x12_34_56));
    }

    #[test]
    fn test_upper_byte_ignored() {
        assert_eq!(Color(0xAB_00_00_FF).channels(), [0x00, 0x00, 0xFF]);
    }
}

//! Fixed-width text cells for the character LCD

use core::fmt::{self, Write};

/// Characters per LCD line
pub const LCD_COLS: usize = 16;

/// One 16-character line, always space padded
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct TextCell {
    chars: [u8; LCD_COLS],
}

impl Default for TextCell {
    fn default() -> Self {
        Self::blank()
    }
}

impl TextCell {
    /// A line of spaces
    pub const fn blank() -> Self {
        Self {
            chars: [b' '; LCD_COLS],
        }
    }

    /// Replace the content with formatted text
    ///
    /// Output past 16 characters is dropped, the remainder is filled with
    /// spaces. Characters outside printable ASCII are shown as `?`.
    pub fn format(&mut self, args: fmt::Arguments<'_>) {
        let mut writer = CellWriter {
            chars: &mut self.chars,
            pos: 0,
        };
        // The writer never fails, it truncates
        let _ = writer.write_fmt(args);
        let end = writer.pos;
        self.chars[end..].fill(b' ');
    }

    /// Replace the content with plain text
    pub fn set(&mut self, text: &str) {
        self.format(format_args!("{}", text));
    }

    /// Raw character bytes
    pub fn as_bytes(&self) -> &[u8; LCD_COLS] {
        &self.chars
    }

    /// Content as a string slice (always valid ASCII)
    pub fn as_str(&self) -> &str {
        core::str::from_utf8(&self.chars).unwrap_or("")
    }
}

impl fmt::Debug for TextCell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.as_str())
    }
}

struct CellWriter<'a> {
    chars: &'a mut [u8; LCD_COLS],
    pos: usize,
}

impl Write for CellWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.pos >= LCD_COLS {
                break;
            }
            self.chars[self.pos] = if c.is_ascii_graphic() || c == ' ' {
                c as u8
            } else {
                b'?'
            };
            self.pos += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_text_is_padded() {
        let mut cell = TextCell::blank();
        cell.set("ARMED");
        assert_eq!(cell.as_str(), "ARMED           ");
    }

    #[test]
    fn test_long_text_is_truncated() {
        let mut cell = TextCell::blank();
        cell.set("PLAYER 1 WINS THE MATCH");
        assert_eq!(cell.as_str(), "PLAYER 1 WINS TH");
    }

    #[test]
    fn test_format_arguments() {
        let mut cell = TextCell::blank();
        cell.format(format_args!("{:02} - {:02}", 3, 11));
        assert_eq!(cell.as_str(), "03 - 11         ");
    }

    #[test]
    fn test_rewrite_clears_previous_content() {
        let mut cell = TextCell::blank();
        cell.set("Speed: SLOW");
        cell.set("");
        assert_eq!(cell, TextCell::blank());
    }

    #[test]
    fn test_non_ascii_replaced() {
        let mut cell = TextCell::blank();
        cell.set("5°C");
        assert_eq!(&cell.as_str()[..3], "5?C");
    }

    proptest! {
        #[test]
        fn prop_cell_is_prefix_then_spaces(text in "[ -~]{0,40}") {
            let mut cell = TextCell::blank();
            cell.set(&text);
            let shown = text.len().min(LCD_COLS);
            prop_assert_eq!(&cell.as_str()[..shown], &text[..shown]);
            prop_assert!(cell.as_bytes()[shown..].iter().all(|&b| b == b' '));
        }
    }
}

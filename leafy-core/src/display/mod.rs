//! 2x16 character LCD with RGB backlight
//!
//! Content changes only touch local buffers and set dirty flags. Once per
//! poll tick, [`Display::update`] submits every dirty buffer whose
//! descriptor is idle. Content set several times between two submissions
//! goes out once, with the latest value.

pub mod color;
pub mod text;

use core::fmt;

pub use color::Color;
pub use text::{TextCell, LCD_COLS};

use crate::bus::{BusDriver, I2cQueue, SubmitError, Transfer};

/// LCD controller 7-bit address
pub const LCD_ADDRESS: u8 = 0x3E;
/// Backlight controller 7-bit address
pub const BACKLIGHT_ADDRESS: u8 = 0x2D;
/// Number of LCD lines
pub const LCD_ROWS: usize = 2;

/// Control byte: another command follows
const CTRL_COMMAND: u8 = 0x80;
/// Control byte: data bytes follow
const CTRL_DATA: u8 = 0x40;
/// Set DDRAM address command
const CMD_SET_DDRAM: u8 = 0x80;
/// DDRAM start address of each line
const LINE_DDRAM: [u8; LCD_ROWS] = [0x00, 0x40];

/// Function set 8-bit/2-line, display on, clear, entry mode increment
#[rustfmt::skip]
pub const INIT_SEQUENCE: [u8; 8] = [
    CTRL_COMMAND, 0x38,
    CTRL_COMMAND, 0x0C,
    CTRL_COMMAND, 0x01,
    CTRL_COMMAND, 0x06,
];

/// Backlight channel intensity registers (red, green, blue)
const BACKLIGHT_REGISTERS: [u8; 3] = [0x01, 0x02, 0x03];

/// Line frame: select line, then 16 data bytes
const LINE_FRAME_LEN: usize = 3 + LCD_COLS;

/// Statically allocated descriptors owned by the display
pub struct DisplayTransfers {
    init: Transfer,
    lines: [Transfer; LCD_ROWS],
    backlight: [Transfer; 3],
}

impl Default for DisplayTransfers {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayTransfers {
    pub const fn new() -> Self {
        Self {
            init: Transfer::write(LCD_ADDRESS),
            lines: [Transfer::write(LCD_ADDRESS), Transfer::write(LCD_ADDRESS)],
            backlight: [
                Transfer::write(BACKLIGHT_ADDRESS),
                Transfer::write(BACKLIGHT_ADDRESS),
                Transfer::write(BACKLIGHT_ADDRESS),
            ],
        }
    }

    /// Descriptor carrying line `line`
    pub fn line(&self, line: usize) -> Option<&Transfer> {
        self.lines.get(line)
    }

    /// Head of the red -> green -> blue chain
    pub fn backlight(&self) -> &Transfer {
        &self.backlight[0]
    }

    /// Blue channel, the tail of the backlight chain
    pub fn backlight_tail(&self) -> &Transfer {
        &self.backlight[2]
    }

    pub fn init(&self) -> &Transfer {
        &self.init
    }
}

/// LCD and backlight driver state
pub struct Display {
    transfers: &'static DisplayTransfers,
    lines: [TextCell; LCD_ROWS],
    line_dirty: [bool; LCD_ROWS],
    color: Color,
    backlight_dirty: bool,
    init_pending: bool,
}

impl Display {
    /// Bind to the display descriptors
    ///
    /// Links the backlight chain. The backlight starts dirty with all
    /// channels off so the first update pushes a known state.
    pub fn new(transfers: &'static DisplayTransfers) -> Self {
        transfers.backlight[0].link(&transfers.backlight[1]);
        transfers.backlight[1].link(&transfers.backlight[2]);
        Self {
            transfers,
            lines: [TextCell::blank(); LCD_ROWS],
            line_dirty: [false; LCD_ROWS],
            color: Color::BLACK,
            backlight_dirty: true,
            init_pending: false,
        }
    }

    /// Send the controller initialization sequence
    ///
    /// Line and color updates are held back until the sequence has been
    /// handed to the bus, so it always goes out first. If the bus refuses
    /// it now, [`Display::update`] retries.
    pub fn enable<D: BusDriver>(&mut self, queue: &mut I2cQueue<D>) -> Result<(), SubmitError> {
        self.init_pending = true;
        self.submit_init(queue)
    }

    fn submit_init<D: BusDriver>(&mut self, queue: &mut I2cQueue<D>) -> Result<(), SubmitError> {
        let transfers = self.transfers;
        let init = &transfers.init;
        if init.is_busy() {
            return Err(SubmitError::Busy);
        }
        init.stage(&INIT_SEQUENCE);
        queue.submit(init)?;
        self.init_pending = false;
        Ok(())
    }

    /// Format text into a line and mark it dirty
    ///
    /// A line index past the last line is ignored.
    pub fn print(&mut self, line: usize, args: fmt::Arguments<'_>) {
        if let Some(cell) = self.lines.get_mut(line) {
            cell.format(args);
            self.line_dirty[line] = true;
        }
    }

    /// Set a line to plain text and mark it dirty
    pub fn set_line_text(&mut self, line: usize, text: &str) {
        self.print(line, format_args!("{}", text));
    }

    /// Set the backlight color and mark the channel batch dirty
    pub fn set_color(&mut self, color: Color) {
        self.color = color;
        self.backlight_dirty = true;
    }

    /// Submit every dirty buffer whose descriptor is idle
    ///
    /// Dirty is cleared on submission, not on completion. A descriptor
    /// whose last transfer failed has its content marked dirty again so it
    /// is resent. A resent init sequence clears the screen, so every line
    /// is repainted after it.
    pub fn update<D: BusDriver>(&mut self, queue: &mut I2cQueue<D>) {
        let transfers = self.transfers;
        let init = &transfers.init;
        if !init.is_busy() && init.take_failure().is_some() {
            self.init_pending = true;
            self.line_dirty = [true; LCD_ROWS];
        }
        if self.init_pending && self.submit_init(queue).is_err() {
            return;
        }

        for (line, transfer) in transfers.lines.iter().enumerate() {
            if transfer.is_busy() {
                continue;
            }
            if transfer.take_failure().is_some() {
                self.line_dirty[line] = true;
            }
            if !self.line_dirty[line] {
                continue;
            }
            self.line_dirty[line] = false;

            let mut frame = [0u8; LINE_FRAME_LEN];
            frame[0] = CTRL_COMMAND;
            frame[1] = CMD_SET_DDRAM | LINE_DDRAM[line];
            frame[2] = CTRL_DATA;
            frame[3..].copy_from_slice(self.lines[line].as_bytes());
            transfer.stage(&frame);

            if queue.submit(transfer).is_err() {
                self.line_dirty[line] = true;
            }
        }

        let [red, green, blue] = &transfers.backlight;
        if blue.is_busy() {
            return;
        }
        for channel in &transfers.backlight {
            if channel.take_failure().is_some() {
                self.backlight_dirty = true;
            }
        }
        if !self.backlight_dirty {
            return;
        }
        self.backlight_dirty = false;

        let values = self.color.channels();
        for ((channel, register), value) in [red, green, blue]
            .into_iter()
            .zip(BACKLIGHT_REGISTERS)
            .zip(values)
        {
            channel.stage(&[register, value]);
        }
        if queue.submit(red).is_err() {
            self.backlight_dirty = true;
        }
    }

    /// Current content of a line
    pub fn line_text(&self, line: usize) -> Option<&str> {
        self.lines.get(line).map(TextCell::as_str)
    }

    /// Current backlight color
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn is_line_dirty(&self, line: usize) -> bool {
        self.line_dirty.get(line).copied().unwrap_or(false)
    }

    pub fn is_backlight_dirty(&self) -> bool {
        self.backlight_dirty
    }

    /// The descriptors this display owns
    pub fn transfers(&self) -> &'static DisplayTransfers {
        self.transfers
    }
}

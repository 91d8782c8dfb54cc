//! I/O-expander bridge for the virtual port
//!
//! Two 8-bit I2C port expanders back [`PortId::X`](leafy_hal::PortId):
//! the LED device mirrors ODR bits 0-7, the button device feeds IDR bits
//! 8-15. Both are active-low on the wire, so every byte is inverted on its
//! way through.

use crate::bus::{BusDriver, I2cQueue, Transfer};
use crate::gpio::VirtualPort;
use leafy_hal::GpioPort;

/// LED output expander 7-bit address
pub const LED_EXPANDER_ADDRESS: u8 = 0x38;
/// Button input expander 7-bit address
pub const BUTTON_EXPANDER_ADDRESS: u8 = 0x39;

/// When the LED byte is sent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RefreshPolicy {
    /// Resend on every tick the descriptor is idle
    #[default]
    Always,
    /// Send only when the byte changed or the last send failed
    OnChange,
}

/// Statically allocated descriptors owned by the bridge
pub struct ExpanderTransfers {
    leds: Transfer,
    buttons: Transfer,
}

impl Default for ExpanderTransfers {
    fn default() -> Self {
        Self::new()
    }
}

impl ExpanderTransfers {
    pub const fn new() -> Self {
        Self {
            leds: Transfer::write(LED_EXPANDER_ADDRESS),
            buttons: Transfer::read(BUTTON_EXPANDER_ADDRESS, 1),
        }
    }

    pub fn leds(&self) -> &Transfer {
        &self.leds
    }

    pub fn buttons(&self) -> &Transfer {
        &self.buttons
    }
}

/// Bridge state
pub struct IoExpander {
    transfers: &'static ExpanderTransfers,
    policy: RefreshPolicy,
    last_sent: Option<u8>,
}

impl IoExpander {
    pub fn new(transfers: &'static ExpanderTransfers, policy: RefreshPolicy) -> Self {
        Self {
            transfers,
            policy,
            last_sent: None,
        }
    }

    pub fn policy(&self) -> RefreshPolicy {
        self.policy
    }

    /// One bridge pass
    ///
    /// Stages the inverted low ODR byte into the LED transfer, copies the
    /// inverted last received button byte into the IDR high byte, then
    /// submits whichever descriptor is idle. Neither step waits.
    pub fn update<D: BusDriver>(&mut self, port: &mut VirtualPort, queue: &mut I2cQueue<D>) {
        let transfers = self.transfers;
        let leds = &transfers.leds;
        let buttons = &transfers.buttons;

        if !leds.is_busy() {
            let wire = !(port.output() as u8);
            let failed = leds.take_failure().is_some();
            if failed {
                self.last_sent = None;
            }
            let send = match self.policy {
                RefreshPolicy::Always => true,
                RefreshPolicy::OnChange => self.last_sent != Some(wire),
            };
            if send {
                leds.stage(&[wire]);
                if queue.submit(leds).is_ok() {
                    self.last_sent = Some(wire);
                }
            }
        }

        if !buttons.is_busy() {
            let rx = buttons.with_data(|d| d.first().copied().unwrap_or(0xFF));
            port.set_input(u16::from(!rx) << 8);
            // A failed read keeps the previous byte; just ask again
            let _ = buttons.take_failure();
            let _ = queue.submit(buttons);
        }
    }
}

//! Board wiring
//!
//! Statics shared between the interrupt-side tasks and the poll loop, and
//! construction of the poll-loop runner.

use defmt::*;
use leafy_apps::{AlarmInputs, AnyApp, Runner};
use leafy_core::config::BoardConfig;
use leafy_core::{Board, BoardTransfers, InterruptTable};
use leafy_hal::{Pin, PortId};
use leafy_hal_stm32l5::{BoardPorts, EdgeLatch, SysClock};

use crate::channels::ChannelDriver;

/// Every I2C descriptor on the board
pub static TRANSFERS: BoardTransfers = BoardTransfers::new();

/// Edge handlers per EXTI line
pub static INTERRUPTS: InterruptTable = InterruptTable::new();

/// Pending edges latched by the edge tasks
pub static EXTI: EdgeLatch = EdgeLatch::new();

/// Alarm button and motion flags
pub static ALARM_INPUTS: AlarmInputs<SysClock> = AlarmInputs::new(SysClock);

pub type FirmwareRunner = Runner<BoardPorts, ChannelDriver, &'static EdgeLatch, AnyApp<SysClock>>;

/// I2C2 SDA and SCL, owned by the embassy driver
const BUS_PINS: [Pin; 2] = [Pin::new(PortId::F, 0), Pin::new(PortId::F, 1)];

/// Assemble the board context and the configured application
pub fn build(config: &BoardConfig) -> FirmwareRunner {
    let mut ports = BoardPorts::new();
    for pin in BUS_PINS {
        if let Err(e) = ports.reserve(pin) {
            warn!("Could not reserve {}: {}", pin, e);
        }
    }

    let board = Board::new(
        ports,
        ChannelDriver,
        &EXTI,
        &INTERRUPTS,
        &TRANSFERS,
        config.expander,
    );
    let app = AnyApp::from_config(config, &ALARM_INPUTS);
    info!("Application: {}", app.kind());

    Runner::new(board, app)
}

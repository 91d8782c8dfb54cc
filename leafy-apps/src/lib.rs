//! Applications for the Leafy board
//!
//! Each application is a state machine polled once per loop tick. It reads
//! event flags raised by interrupt handlers and the virtual expander port,
//! advances on the millisecond clock, and drives pins and the display
//! through the [`Board`](leafy_core::Board). Nothing here touches the bus
//! directly or waits for anything.
//!
//! - [`alarm`] - Home-security alarm (button, motion sensor, RGB LED)
//! - [`pong::linear`] - Linear Pong, three paddle buttons per player
//! - [`pong::duel`] - Linear Pong, one edge-triggered button per player

#![no_std]
#![deny(unsafe_code)]

pub mod alarm;
pub mod app;
pub mod pong;

pub use alarm::{Alarm, AlarmInputs, AlarmState};
pub use app::{AnyApp, App, Runner};
pub use pong::{duel::DuelPong, linear::LinearPong};

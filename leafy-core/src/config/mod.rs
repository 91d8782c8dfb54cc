//! Board configuration
//!
//! Plain structs with defaults matching the shipped board, plus a minimal
//! TOML reader for the `board.toml` the firmware embeds.

pub mod toml;
pub mod types;

pub use self::toml::{parse_config, ParseError};
pub use types::*;

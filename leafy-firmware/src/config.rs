//! Board configuration loading
//!
//! `board.toml` is compiled into the image and validated by `build.rs`;
//! parsing it again at boot only fails if the two readers disagree.

use defmt::*;
use leafy_core::config::{parse_config, BoardConfig};

/// Embedded board file (edit board.toml and rebuild to customize)
const EMBEDDED_CONFIG: &str = include_str!("../board.toml");

/// Parse the embedded board file, falling back to defaults
pub fn load() -> BoardConfig {
    match parse_config(EMBEDDED_CONFIG) {
        Ok(config) => {
            info!(
                "Config loaded: app={}, i2c={}Hz, expander={}",
                config.app, config.bus.frequency_hz, config.expander
            );
            config
        }
        Err(e) => {
            warn!("Invalid board.toml ({}), using defaults", e);
            BoardConfig::default()
        }
    }
}

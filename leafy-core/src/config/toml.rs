//! Minimal TOML reader for `board.toml`
//!
//! Handles only the subset the board file uses. It does NOT support the
//! full TOML spec.
//!
//! Supported:
//! - `[section]` headers: `bus`, `alarm`, `pong`, `expander`, `app`
//! - `key = value` with integer, string and `[a, b, c]` integer arrays
//! - Comments (`# ...`), including trailing ones
//!
//! Unknown keys are ignored; unknown sections are an error.

use super::types::{AppKind, BoardConfig, PONG_SPEEDS};
use crate::expander::RefreshPolicy;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header
    InvalidSection,
    /// Value of the wrong type or spelling
    InvalidValue,
    /// Array with the wrong number of items
    TooManyItems,
    /// Value parsed but outside its usable range
    OutOfRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Bus,
    Alarm,
    Pong,
    Expander,
    App,
}

/// Parse a board file, starting from defaults
pub fn parse_config(input: &str) -> Result<BoardConfig, ParseError> {
    let mut config = BoardConfig::default();
    let mut section = Section::Root;

    for line in input.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if line.starts_with('[') && line.ends_with(']') {
            section = parse_section_header(&line[1..line.len() - 1])?;
            continue;
        }

        if let Some((key, value)) = parse_key_value(line) {
            apply_value(section, key, value, &mut config)?;
        }
    }

    validate(&config)?;
    Ok(config)
}

fn parse_section_header(header: &str) -> Result<Section, ParseError> {
    match header.trim() {
        "bus" => Ok(Section::Bus),
        "alarm" => Ok(Section::Alarm),
        "pong" => Ok(Section::Pong),
        "expander" => Ok(Section::Expander),
        "app" => Ok(Section::App),
        _ => Err(ParseError::InvalidSection),
    }
}

fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let eq_pos = line.find('=')?;
    let key = line[..eq_pos].trim();
    let value = line[eq_pos + 1..].trim();

    // Strip a trailing comment unless the # sits inside a string
    let value = match value.find('#') {
        Some(hash_pos) if value[..hash_pos].matches('"').count() % 2 == 0 => {
            value[..hash_pos].trim()
        }
        _ => value,
    };

    if key.is_empty() || value.is_empty() {
        return None;
    }

    Some((key, value))
}

/// Strip surrounding quotes; bare words are accepted too
fn parse_string(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Integer literals may use `_` separators (`100_000`)
fn parse_int<T: core::str::FromStr>(value: &str) -> Result<T, ParseError> {
    let mut digits: heapless::String<16> = heapless::String::new();
    for c in value.chars().filter(|&c| c != '_') {
        digits.push(c).map_err(|_| ParseError::InvalidValue)?;
    }
    digits.parse().map_err(|_| ParseError::InvalidValue)
}

fn parse_speeds(value: &str) -> Result<[u32; PONG_SPEEDS], ParseError> {
    let inner = value
        .strip_prefix('[')
        .and_then(|v| v.strip_suffix(']'))
        .ok_or(ParseError::InvalidValue)?;

    let mut speeds = [0u32; PONG_SPEEDS];
    let mut count = 0;
    for item in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let slot = speeds.get_mut(count).ok_or(ParseError::TooManyItems)?;
        *slot = parse_int(item)?;
        count += 1;
    }
    if count != PONG_SPEEDS {
        return Err(ParseError::TooManyItems);
    }
    Ok(speeds)
}

fn parse_policy(value: &str) -> Result<RefreshPolicy, ParseError> {
    match parse_string(value) {
        "always" => Ok(RefreshPolicy::Always),
        "on_change" => Ok(RefreshPolicy::OnChange),
        _ => Err(ParseError::InvalidValue),
    }
}

fn parse_app(value: &str) -> Result<AppKind, ParseError> {
    match parse_string(value) {
        "alarm" => Ok(AppKind::Alarm),
        "pong" => Ok(AppKind::Pong),
        "duel" => Ok(AppKind::Duel),
        _ => Err(ParseError::InvalidValue),
    }
}

fn apply_value(
    section: Section,
    key: &str,
    value: &str,
    config: &mut BoardConfig,
) -> Result<(), ParseError> {
    match section {
        Section::Root => {}
        Section::Bus => match key {
            "frequency_hz" => config.bus.frequency_hz = parse_int(value)?,
            "timeout_ms" => config.bus.timeout_ms = parse_int(value)?,
            _ => {} // Ignore unknown keys
        },
        Section::Alarm => match key {
            "debounce_ms" => config.alarm.debounce_ms = parse_int(value)?,
            "brief_max_ms" => config.alarm.brief_max_ms = parse_int(value)?,
            "held_ms" => config.alarm.held_ms = parse_int(value)?,
            "toggle_ms" => config.alarm.toggle_ms = parse_int(value)?,
            _ => {}
        },
        Section::Pong => match key {
            "speeds_ms" => config.pong.speeds_ms = parse_speeds(value)?,
            "quit_hold_ms" => config.pong.quit_hold_ms = parse_int(value)?,
            "flash_ms" => config.pong.flash_ms = parse_int(value)?,
            "win_score" => config.pong.win_score = parse_int(value)?,
            "win_margin" => config.pong.win_margin = parse_int(value)?,
            _ => {}
        },
        Section::Expander => {
            if key == "policy" {
                config.expander = parse_policy(value)?;
            }
        }
        Section::App => {
            if key == "run" {
                config.app = parse_app(value)?;
            }
        }
    }
    Ok(())
}

fn validate(config: &BoardConfig) -> Result<(), ParseError> {
    if !(10_000..=1_000_000).contains(&config.bus.frequency_hz) || config.bus.timeout_ms == 0 {
        return Err(ParseError::OutOfRange);
    }
    if config.alarm.brief_max_ms == 0 || config.alarm.toggle_ms == 0 {
        return Err(ParseError::OutOfRange);
    }
    if config.pong.speeds_ms.contains(&0) || config.pong.flash_ms == 0 {
        return Err(ParseError::OutOfRange);
    }
    if config.pong.win_score == 0 {
        return Err(ParseError::OutOfRange);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOARD: &str = r#"
# Leafy board
[bus]
frequency_hz = 400_000

[alarm]
held_ms = 2500   # shorter hold on the demo unit

[pong]
speeds_ms = [200, 120, 60]
win_score = 5

[expander]
policy = "on_change"

[app]
run = "duel"
"#;

    #[test]
    fn test_parse_board_file() {
        let config = parse_config(BOARD).unwrap();
        assert_eq!(config.bus.frequency_hz, 400_000);
        assert_eq!(config.alarm.held_ms, 2500);
        assert_eq!(config.alarm.brief_max_ms, 2000);
        assert_eq!(config.pong.speeds_ms, [200, 120, 60]);
        assert_eq!(config.pong.win_score, 5);
        assert_eq!(config.pong.win_margin, 2);
        assert_eq!(config.expander, RefreshPolicy::OnChange);
        assert_eq!(config.app, AppKind::Duel);
    }

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(parse_config("").unwrap(), BoardConfig::default());
    }

    #[test]
    fn test_unknown_section_rejected() {
        assert_eq!(
            parse_config("[stepper]\nmicrosteps = 16"),
            Err(ParseError::InvalidSection)
        );
    }

    #[test]
    fn test_unknown_key_ignored() {
        let config = parse_config("[alarm]\nsiren = 1").unwrap();
        assert_eq!(config.alarm, Default::default());
    }

    #[test]
    fn test_bad_values() {
        assert_eq!(
            parse_config("[app]\nrun = \"tetris\""),
            Err(ParseError::InvalidValue)
        );
        assert_eq!(
            parse_config("[pong]\nspeeds_ms = [1, 2]"),
            Err(ParseError::TooManyItems)
        );
        assert_eq!(
            parse_config("[pong]\nspeeds_ms = [150, 0, 70]"),
            Err(ParseError::OutOfRange)
        );
        assert_eq!(
            parse_config("[bus]\nfrequency_hz = fast"),
            Err(ParseError::InvalidValue)
        );
    }

    #[test]
    fn test_parse_key_value() {
        assert_eq!(parse_key_value("run = \"alarm\" # x"), Some(("run", "\"alarm\"")));
        assert_eq!(parse_key_value("key ="), None);
        assert_eq!(parse_key_value("no equals"), None);
    }
}

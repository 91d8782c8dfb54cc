//! Build script for leafy-firmware
//!
//! - Passes the linker scripts (memory.x comes from embassy-stm32)
//! - Validates board.toml at compile time

use std::fs;
use std::path::Path;

fn main() {
    setup_linker();
    validate_config();
}

/// Linker scripts for cortex-m-rt and defmt
fn setup_linker() {
    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate board.toml at compile time
///
/// Uses the full `toml` parser; the boot-time reader only knows a subset.
fn validate_config() {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    let config_content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Failed to read board.toml                                ║\n\
                ║                                                                  ║\n\
                ║  Error: {:<56} ║\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                e
            );
        }
    };

    let config: toml::Value = match toml::from_str(&config_content) {
        Ok(value) => value,
        Err(e) => {
            panic!(
                "\n\
                ╔══════════════════════════════════════════════════════════════════╗\n\
                ║  ERROR: Invalid TOML syntax in board.toml                        ║\n\
                ╠══════════════════════════════════════════════════════════════════╣\n\
                {}\n\
                ╚══════════════════════════════════════════════════════════════════╝\n",
                format_error_lines(&e.to_string())
            );
        }
    };

    let mut errors = Vec::new();
    validate_sections(&config, &mut errors);
    validate_bus(&config, &mut errors);
    validate_timings(&config, &mut errors);
    validate_pong(&config, &mut errors);
    validate_choices(&config, &mut errors);

    if !errors.is_empty() {
        panic!(
            "\n\
            ╔══════════════════════════════════════════════════════════════════╗\n\
            ║  ERROR: Invalid board configuration                              ║\n\
            ╠══════════════════════════════════════════════════════════════════╣\n\
            {}\n\
            ╚══════════════════════════════════════════════════════════════════╝\n",
            errors
                .iter()
                .map(|e| format!("║  • {:<62} ║", e))
                .collect::<Vec<_>>()
                .join("\n")
        );
    }

    println!("cargo:warning=board.toml validated successfully");
}

/// Format error message lines with box drawing
fn format_error_lines(msg: &str) -> String {
    msg.lines()
        .map(|line| {
            let truncated = if line.len() > 64 {
                format!("{}...", &line[..61])
            } else {
                line.to_string()
            };
            format!("║  {:<64} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SECTIONS: [&str; 5] = ["bus", "alarm", "pong", "expander", "app"];

/// Only known sections, each a table
fn validate_sections(config: &toml::Value, errors: &mut Vec<String>) {
    let Some(root) = config.as_table() else {
        return;
    };
    for (name, value) in root {
        if !SECTIONS.contains(&name.as_str()) {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }
}

fn integer(config: &toml::Value, section: &str, key: &str) -> Option<i64> {
    config.get(section)?.get(key)?.as_integer()
}

fn check_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    min: i64,
    max: i64,
    errors: &mut Vec<String>,
) {
    let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
        return;
    };
    match value.as_integer() {
        Some(v) if (min..=max).contains(&v) => {}
        Some(_) => errors.push(format!("[{}] {} must be {}-{}", section, key, min, max)),
        None => errors.push(format!("[{}] {} must be an integer", section, key)),
    }
}

fn validate_bus(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "bus", "frequency_hz", 10_000, 1_000_000, errors);
    check_range(config, "bus", "timeout_ms", 1, 10_000, errors);
}

fn validate_timings(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "alarm", "debounce_ms", 0, 1_000, errors);
    check_range(config, "alarm", "brief_max_ms", 1, 60_000, errors);
    check_range(config, "alarm", "held_ms", 1, 60_000, errors);
    check_range(config, "alarm", "toggle_ms", 1, 60_000, errors);

    if let (Some(brief), Some(held)) = (
        integer(config, "alarm", "brief_max_ms"),
        integer(config, "alarm", "held_ms"),
    ) {
        if brief > held {
            errors.push("[alarm] brief_max_ms should not exceed held_ms".to_string());
        }
    }
}

fn validate_pong(config: &toml::Value, errors: &mut Vec<String>) {
    check_range(config, "pong", "quit_hold_ms", 1, 60_000, errors);
    check_range(config, "pong", "flash_ms", 1, 10_000, errors);
    check_range(config, "pong", "win_score", 1, 99, errors);
    check_range(config, "pong", "win_margin", 0, 99, errors);

    if let Some(speeds) = config.get("pong").and_then(|p| p.get("speeds_ms")) {
        match speeds.as_array() {
            Some(items) if items.len() == 3 => {
                let valid = items
                    .iter()
                    .all(|s| s.as_integer().is_some_and(|v| (1..=10_000).contains(&v)));
                if !valid {
                    errors.push("[pong] speeds_ms entries must be 1-10000".to_string());
                }
            }
            _ => errors.push("[pong] speeds_ms must be an array of 3 integers".to_string()),
        }
    }
}

fn validate_choices(config: &toml::Value, errors: &mut Vec<String>) {
    let choices: [(&str, &str, &[&str]); 2] = [
        ("expander", "policy", &["always", "on_change"]),
        ("app", "run", &["alarm", "pong", "duel"]),
    ];
    for (section, key, allowed) in choices {
        let Some(value) = config.get(section).and_then(|s| s.get(key)) else {
            continue;
        };
        match value.as_str() {
            Some(v) if allowed.contains(&v) => {}
            _ => errors.push(format!(
                "[{}] {} must be one of: {}",
                section,
                key,
                allowed.join(", ")
            )),
        }
    }
}

//! Build script for quizbox-firmware
//!
//! - Sets up linker search paths and scripts for memory.x
//! - Validates quizbox.toml at compile time
//! - Checks that the CYW43439 firmware blobs are present

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Blobs embedded with `include_bytes!` by the Wi-Fi setup
const CYW43_BLOBS: [&str; 2] = ["cyw43-firmware/43439A0.bin", "cyw43-firmware/43439A0_clm.bin"];

fn main() {
    setup_linker();
    validate_config();
    check_cyw43_firmware();
}

/// Print an error box and abort the build
fn fail(title: &str, lines: &[String]) -> ! {
    let body = lines
        .iter()
        .map(|l| format!("║  {:<64} ║", l))
        .collect::<Vec<_>>()
        .join("\n");
    panic!(
        "\n\
        ╔════════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<58} ║\n\
        ╠════════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚════════════════════════════════════════════════════════════════════╝\n",
        title, body
    );
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = match env::var("OUT_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => fail("OUT_DIR not set", &[e.to_string()]),
    };

    if let Err(e) = fs::write(out_dir.join("memory.x"), include_bytes!("memory.x")) {
        fail("Failed to copy memory.x", &[e.to_string()]);
    }
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rustc-link-arg-bins=--nmagic");
    println!("cargo:rustc-link-arg-bins=-Tlink.x");
    println!("cargo:rustc-link-arg-bins=-Tlink-rp.x");
    println!("cargo:rustc-link-arg-bins=-Tdefmt.x");

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Validate quizbox.toml configuration at compile time
///
/// Mirrors the checks the firmware applies at boot, so a bad file fails
/// the build instead of silently falling back to defaults on the device.
fn validate_config() {
    println!("cargo:rerun-if-changed=quizbox.toml");

    let config_path = Path::new("quizbox.toml");
    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail(
            "Failed to read quizbox.toml",
            &[
                e.to_string(),
                "The firmware embeds quizbox.toml from the crate directory.".into(),
            ],
        ),
    };

    let config: toml::Value = match toml::from_str(&content) {
        Ok(value) => value,
        Err(e) => fail(
            "Invalid TOML syntax in quizbox.toml",
            &e.to_string().lines().map(String::from).collect::<Vec<_>>(),
        ),
    };

    let mut errors = Vec::new();

    let Some(root) = config.as_table() else {
        fail("quizbox.toml must be a table", &[]);
    };
    for (name, value) in root {
        if !matches!(name.as_str(), "network" | "motion" | "voting" | "display") {
            errors.push(format!("unknown section [{}]", name));
        } else if !value.is_table() {
            errors.push(format!("[{}] must be a table", name));
        }
    }

    validate_network(&config, &mut errors);
    validate_motion(&config, &mut errors);
    validate_voting(&config, &mut errors);
    validate_display(&config, &mut errors);

    if !errors.is_empty() {
        fail(
            "Invalid configuration in quizbox.toml",
            &errors.iter().map(|e| format!("• {}", e)).collect::<Vec<_>>(),
        );
    }
}

/// Integer key, if present; records an error if out of range
fn int_in_range(
    config: &toml::Value,
    section: &str,
    key: &str,
    range: std::ops::RangeInclusive<i64>,
    errors: &mut Vec<String>,
) -> Option<i64> {
    match config.get(section).and_then(|s| s.get(key)) {
        None => None,
        Some(toml::Value::Integer(v)) if range.contains(v) => Some(*v),
        Some(toml::Value::Integer(v)) => {
            errors.push(format!(
                "[{}] {} = {} outside {}..={}",
                section,
                key,
                v,
                range.start(),
                range.end()
            ));
            None
        }
        Some(_) => {
            errors.push(format!("[{}] {} must be an integer", section, key));
            None
        }
    }
}

fn string_max_len(
    config: &toml::Value,
    section: &str,
    key: &str,
    max: usize,
    errors: &mut Vec<String>,
) {
    match config.get(section).and_then(|s| s.get(key)) {
        None => {}
        Some(toml::Value::String(s)) if s.len() <= max => {}
        Some(toml::Value::String(_)) => {
            errors.push(format!("[{}] {} longer than {} bytes", section, key, max))
        }
        Some(_) => errors.push(format!("[{}] {} must be a string", section, key)),
    }
}

fn validate_network(config: &toml::Value, errors: &mut Vec<String>) {
    string_max_len(config, "network", "ssid", 32, errors);
    string_max_len(config, "network", "password", 64, errors);
    int_in_range(config, "network", "http_port", 1..=65535, errors);
    int_in_range(config, "network", "join_attempts", 1..=255, errors);

    if let Some(toml::Value::String(pw)) = config.get("network").and_then(|n| n.get("password")) {
        if !pw.is_empty() && pw.len() < 8 {
            errors.push("[network] WPA2 password must be at least 8 characters".into());
        }
    }
}

fn validate_motion(config: &toml::Value, errors: &mut Vec<String>) {
    let u32_max = i64::from(u32::MAX);
    let i32_span = i64::from(i32::MIN)..=i64::from(i32::MAX);

    int_in_range(config, "motion", "max_speed", 1..=u32_max, errors);
    int_in_range(config, "motion", "acceleration", 1..=u32_max, errors);
    let limit = int_in_range(config, "motion", "max_move_steps", 1..=u32_max, errors)
        .unwrap_or(8192);
    for key in ["legacy_step_steps", "vote_step_steps"] {
        if let Some(steps) = int_in_range(config, "motion", key, i32_span.clone(), errors) {
            if steps.abs() > limit {
                errors.push(format!(
                    "[motion] {} = {} exceeds max_move_steps ({})",
                    key, steps, limit
                ));
            }
        }
    }
}

fn validate_voting(config: &toml::Value, errors: &mut Vec<String>) {
    match config.get("voting").and_then(|v| v.get("trigger_level")) {
        None => {}
        Some(toml::Value::String(level)) if matches!(level.as_str(), "high" | "low" | "HIGH" | "LOW") => {}
        Some(_) => errors.push("[voting] trigger_level must be \"high\" or \"low\"".into()),
    }
    int_in_range(config, "voting", "cooldown_ms", 0..=i64::from(u32::MAX), errors);
}

fn validate_display(config: &toml::Value, errors: &mut Vec<String>) {
    int_in_range(config, "display", "i2c_address", 0x08..=0x77, errors);
    int_in_range(config, "display", "scroll_interval_ms", 1..=i64::from(u32::MAX), errors);
    int_in_range(config, "display", "page_interval_ms", 1..=i64::from(u32::MAX), errors);
}

/// Check the CYW43439 firmware blobs exist
///
/// They are redistributable binaries from the embassy repository
/// (`cyw43-firmware/`), not part of this source tree.
fn check_cyw43_firmware() {
    let missing: Vec<String> = CYW43_BLOBS
        .iter()
        .filter(|path| {
            println!("cargo:rerun-if-changed={}", path);
            !Path::new(path).exists()
        })
        .map(|path| format!("missing {}", path))
        .collect();

    if !missing.is_empty() {
        let mut lines = missing;
        lines.push(String::new());
        lines.push("Copy 43439A0.bin and 43439A0_clm.bin from the embassy".into());
        lines.push("repository's cyw43-firmware/ directory.".into());
        fail("CYW43439 firmware not found", &lines);
    }
}

//! Minimal TOML parser for `quizbox.toml`
//!
//! Handles only the subset the configuration file uses. It does NOT
//! support the full TOML grammar.
//!
//! Supported features:
//! - [section] headers
//! - Key = value pairs (string, integer, boolean)
//! - Decimal and `0x` hexadecimal integers, with `_` separators
//! - `\"` and `\\` escapes in strings
//! - Comments (# ...), including after a value
//!
//! NOT supported:
//! - Arrays and tables beyond one level
//! - Multi-line strings
//! - Floats and datetimes
//!
//! Unknown keys are ignored so newer files still load on older firmware.

use heapless::String;

use crate::traits::Level;

use super::types::QuizboxConfig;

/// Parse error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ParseError {
    /// Unknown or malformed section header (1-based line)
    InvalidSection(usize),
    /// Line is neither a header nor `key = value`
    InvalidLine(usize),
    /// Value has the wrong type or is out of range
    InvalidValue(usize),
    /// String longer than its field
    TooLong(usize),
}

/// Current parsing context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Root,
    Network,
    Motion,
    Voting,
    Display,
}

/// Parse TOML text into a configuration
///
/// Keys not present keep their defaults. The result is not validated;
/// call [`QuizboxConfig::validate`] afterwards.
pub fn parse_config(input: &str) -> Result<QuizboxConfig, ParseError> {
    let mut config = QuizboxConfig::default();
    let mut section = Section::Root;

    for (index, line) in input.lines().enumerate() {
        let line_no = index + 1;
        let line = strip_comment(line).trim();

        if line.is_empty() {
            continue;
        }

        if line.starts_with('[') {
            if !line.ends_with(']') {
                return Err(ParseError::InvalidSection(line_no));
            }
            section = parse_section_header(&line[1..line.len() - 1])
                .ok_or(ParseError::InvalidSection(line_no))?;
            continue;
        }

        let (key, value) = parse_key_value(line).ok_or(ParseError::InvalidLine(line_no))?;
        apply_value(&mut config, section, key, value, line_no)?;
    }

    Ok(config)
}

fn parse_section_header(header: &str) -> Option<Section> {
    match header.trim() {
        "network" => Some(Section::Network),
        "motion" => Some(Section::Motion),
        "voting" => Some(Section::Voting),
        "display" => Some(Section::Display),
        _ => None,
    }
}

/// Drop a trailing comment that is not inside a string
fn strip_comment(line: &str) -> &str {
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in line.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            '#' if !in_string => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Parse "key = value" line
fn parse_key_value(line: &str) -> Option<(&str, &str)> {
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    let value = value.trim();
    if key.is_empty() || value.is_empty() {
        return None;
    }
    Some((key, value))
}

fn apply_value(
    config: &mut QuizboxConfig,
    section: Section,
    key: &str,
    value: &str,
    line: usize,
) -> Result<(), ParseError> {
    match section {
        Section::Network => {
            let n = &mut config.network;
            match key {
                "ssid" => n.ssid = parse_string(value, line)?,
                "password" => n.password = parse_string(value, line)?,
                "http_port" => n.http_port = parse_int(value, line)?,
                "join_attempts" => n.join_attempts = parse_int(value, line)?,
                _ => {} // Ignore unknown keys
            }
        }
        Section::Motion => {
            let m = &mut config.motion;
            match key {
                "max_speed" => m.max_speed = parse_int(value, line)?,
                "acceleration" => m.acceleration = parse_int(value, line)?,
                "max_move_steps" => m.max_move_steps = parse_int(value, line)?,
                "legacy_step_steps" => m.legacy_step_steps = parse_int(value, line)?,
                "vote_step_steps" => m.vote_step_steps = parse_int(value, line)?,
                _ => {}
            }
        }
        Section::Voting => {
            let v = &mut config.voting;
            match key {
                "trigger_level" => v.trigger_level = parse_level(value, line)?,
                "cooldown_ms" => v.cooldown_ms = parse_int(value, line)?,
                _ => {}
            }
        }
        Section::Display => {
            let d = &mut config.display;
            match key {
                "i2c_address" => d.i2c_address = parse_int(value, line)?,
                "scroll_interval_ms" => d.scroll_interval_ms = parse_int(value, line)?,
                "page_interval_ms" => d.page_interval_ms = parse_int(value, line)?,
                _ => {}
            }
        }
        Section::Root => {}
    }
    Ok(())
}

/// Parse a quoted string into a bounded buffer
fn parse_string<const N: usize>(value: &str, line: usize) -> Result<String<N>, ParseError> {
    let inner = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .ok_or(ParseError::InvalidValue(line))?;

    let mut out = String::new();
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        let c = match c {
            '\\' => match chars.next() {
                Some('"') => '"',
                Some('\\') => '\\',
                _ => return Err(ParseError::InvalidValue(line)),
            },
            '"' => return Err(ParseError::InvalidValue(line)),
            c => c,
        };
        out.push(c).map_err(|_| ParseError::TooLong(line))?;
    }
    Ok(out)
}

/// Parse a decimal or `0x` hexadecimal integer into any integer type
fn parse_int<T: TryFrom<i64>>(value: &str, line: usize) -> Result<T, ParseError> {
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let (radix, digits) = match digits.strip_prefix("0x") {
        Some(hex) => (16, hex),
        None => (10, digits),
    };
    if digits.is_empty() || digits.starts_with('_') || digits.ends_with('_') {
        return Err(ParseError::InvalidValue(line));
    }

    let mut magnitude: i64 = 0;
    for c in digits.chars().filter(|&c| c != '_') {
        let digit = c.to_digit(radix).ok_or(ParseError::InvalidValue(line))?;
        magnitude = magnitude
            .checked_mul(i64::from(radix))
            .and_then(|m| m.checked_add(i64::from(digit)))
            .ok_or(ParseError::InvalidValue(line))?;
    }

    let signed = if negative { -magnitude } else { magnitude };
    T::try_from(signed).map_err(|_| ParseError::InvalidValue(line))
}

/// Parse a trigger level: "high" or "low"
fn parse_level(value: &str, line: usize) -> Result<Level, ParseError> {
    let value: String<8> = parse_string(value, line)?;
    match value.as_str() {
        "high" | "HIGH" => Ok(Level::High),
        "low" | "LOW" => Ok(Level::Low),
        _ => Err(ParseError::InvalidValue(line)),
    }
}

//! Embedded configuration loader
//!
//! Parses and validates the embedded `quizbox.toml`. Falls back to the
//! built-in defaults when either step fails; `build.rs` runs the same
//! checks, so a fallback here means the two have drifted apart.

use defmt::*;

use quizbox_core::config::{parse_config, ConfigError, ParseError, QuizboxConfig};

/// Embedded configuration (compiled into firmware)
/// Edit quizbox.toml and rebuild to customize
const EMBEDDED_CONFIG: &str = include_str!("../../quizbox.toml");

/// Reasons the embedded configuration was rejected
#[derive(Debug, Clone, Copy)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// TOML parsing failed
    Parse(ParseError),
    /// Parsed values are inconsistent
    Invalid(ConfigError),
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

impl From<ConfigError> for LoadError {
    fn from(e: ConfigError) -> Self {
        LoadError::Invalid(e)
    }
}

/// Load the embedded configuration, or defaults if it is unusable
pub fn load_config() -> QuizboxConfig {
    info!("Loading embedded configuration ({} bytes)", EMBEDDED_CONFIG.len());

    match try_load(EMBEDDED_CONFIG) {
        Ok(config) => {
            log_config_summary(&config);
            config
        }
        Err(e) => {
            warn!("Embedded config rejected: {:?}, using defaults", e);
            let config = QuizboxConfig::default();
            log_config_summary(&config);
            config
        }
    }
}

fn try_load(text: &str) -> Result<QuizboxConfig, LoadError> {
    let config = parse_config(text)?;
    config.validate()?;
    Ok(config)
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &QuizboxConfig) {
    info!("Configuration loaded");
    if config.has_network() {
        debug!(
            "  network: ssid={}, port={}, {} join attempts",
            config.network.ssid.as_str(),
            config.network.http_port,
            config.network.join_attempts
        );
    } else {
        debug!("  network: disabled (no ssid)");
    }
    debug!(
        "  motion: {} steps/s, {} steps/s^2, limit {}",
        config.motion.max_speed, config.motion.acceleration, config.motion.max_move_steps
    );
    debug!(
        "  steps: legacy {}, vote {}",
        config.motion.legacy_step_steps, config.motion.vote_step_steps
    );
    debug!(
        "  voting: trigger {}, cooldown {} ms",
        config.voting.trigger_level, config.voting.cooldown_ms
    );
    debug!(
        "  display: addr {=u8:#x}, scroll {} ms, page {} ms",
        config.display.i2c_address,
        config.display.scroll_interval_ms,
        config.display.page_interval_ms
    );
}

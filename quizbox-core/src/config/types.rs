//! Configuration types
//!
//! Board-agnostic settings loaded from `quizbox.toml`. Every section has
//! defaults matching the reference build, so a missing file or section
//! still produces a working apparatus.

use heapless::String;

use crate::display::PresenterTiming;
use crate::motion::SpeedProfile;
use crate::traits::Level;

/// Maximum SSID length (802.11)
pub const MAX_SSID_LEN: usize = 32;

/// Maximum WPA2 passphrase length
pub const MAX_PASSWORD_LEN: usize = 64;

/// Default largest relative move per request (two output revolutions)
pub const DEFAULT_MAX_MOVE_STEPS: u32 = 8192;

/// Configuration validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// `max_speed` must be positive
    ZeroSpeed,
    /// `acceleration` must be positive
    ZeroAcceleration,
    /// `max_move_steps` must be positive
    ZeroMoveLimit,
    /// A fixed step size exceeds `max_move_steps`
    StepExceedsLimit,
    /// Scroll and page intervals must be positive
    ZeroInterval,
    /// `join_attempts` must be positive
    ZeroJoinAttempts,
    /// I2C address outside the 7-bit range
    InvalidI2cAddress,
}

/// Wi-Fi and HTTP settings
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NetworkConfig {
    /// Network to join; empty disables networking
    pub ssid: String<MAX_SSID_LEN>,
    /// WPA2 passphrase; empty joins an open network
    pub password: String<MAX_PASSWORD_LEN>,
    /// HTTP listen port
    pub http_port: u16,
    /// Join attempts before giving up
    pub join_attempts: u8,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            ssid: String::new(),
            password: String::new(),
            http_port: 80,
            join_attempts: 10,
        }
    }
}

/// Pointer stepper settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MotionConfig {
    /// Cruise speed (micro-steps/s)
    pub max_speed: u32,
    /// Acceleration (micro-steps/s²)
    pub acceleration: u32,
    /// Largest |steps| accepted per request
    pub max_move_steps: u32,
    /// Relative move issued by `/step`
    pub legacy_step_steps: i32,
    /// Feedback move per vote (positive for A, mirrored for B)
    pub vote_step_steps: i32,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            max_speed: 1000,
            acceleration: 500,
            max_move_steps: DEFAULT_MAX_MOVE_STEPS,
            legacy_step_steps: 512,
            vote_step_steps: 256,
        }
    }
}

impl MotionConfig {
    /// Speed profile for the motion controller
    pub fn profile(&self) -> SpeedProfile {
        SpeedProfile::new(self.max_speed, self.acceleration)
    }
}

/// Vote sensor settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VotingConfig {
    /// Sensor level that means "covered"
    pub trigger_level: Level,
    /// Minimum time between accepted votes (shared)
    pub cooldown_ms: u32,
}

impl Default for VotingConfig {
    fn default() -> Self {
        Self {
            // Comparator LDR modules drive high in the dark
            trigger_level: Level::High,
            cooldown_ms: crate::voting::DEFAULT_COOLDOWN_MS,
        }
    }
}

/// LCD settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DisplayConfig {
    /// PCF8574 backpack address
    pub i2c_address: u8,
    /// Marquee step interval
    pub scroll_interval_ms: u32,
    /// Base page dwell
    pub page_interval_ms: u32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        let timing = PresenterTiming::default();
        Self {
            i2c_address: 0x27,
            scroll_interval_ms: timing.scroll_interval_ms,
            page_interval_ms: timing.page_interval_ms,
        }
    }
}

impl DisplayConfig {
    /// Presenter timing constants
    pub fn timing(&self) -> PresenterTiming {
        PresenterTiming {
            scroll_interval_ms: self.scroll_interval_ms,
            page_interval_ms: self.page_interval_ms,
        }
    }
}

/// Complete apparatus configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct QuizboxConfig {
    /// `[network]`
    pub network: NetworkConfig,
    /// `[motion]`
    pub motion: MotionConfig,
    /// `[voting]`
    pub voting: VotingConfig,
    /// `[display]`
    pub display: DisplayConfig,
}

impl QuizboxConfig {
    /// Check semantic constraints the parser cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        let motion = &self.motion;
        if motion.max_speed == 0 {
            return Err(ConfigError::ZeroSpeed);
        }
        if motion.acceleration == 0 {
            return Err(ConfigError::ZeroAcceleration);
        }
        if motion.max_move_steps == 0 {
            return Err(ConfigError::ZeroMoveLimit);
        }
        if motion.legacy_step_steps.unsigned_abs() > motion.max_move_steps
            || motion.vote_step_steps.unsigned_abs() > motion.max_move_steps
        {
            return Err(ConfigError::StepExceedsLimit);
        }

        if self.display.scroll_interval_ms == 0 || self.display.page_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        if self.display.i2c_address > 0x7F {
            return Err(ConfigError::InvalidI2cAddress);
        }

        if self.network.join_attempts == 0 {
            return Err(ConfigError::ZeroJoinAttempts);
        }

        Ok(())
    }

    /// Check if Wi-Fi credentials are present
    pub fn has_network(&self) -> bool {
        !self.network.ssid.is_empty()
    }
}

//! Configuration for the chaser controller
//!
//! Values are fixed for the lifetime of a controller. They are loaded once
//! (defaults, then file, then environment, then command line) and copied into
//! the frame handler at construction.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Upper bound accepted for either speed
pub const MAX_SPEED: f64 = 10.0;

/// Thresholds and speeds used by the locator and the motion policy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyThresholds {
    /// Intensity classified as a target pixel
    pub brightness_threshold: u8,
    /// Forward speed when the target is centered
    pub linear_speed: f64,
    /// Turn rate when the target is off to one side
    pub angular_speed: f64,
}

impl Default for PolicyThresholds {
    fn default() -> Self {
        Self {
            brightness_threshold: 255,
            linear_speed: 0.4,
            angular_speed: 0.5,
        }
    }
}

impl PolicyThresholds {
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, value) in [
            ("linear_speed", self.linear_speed),
            ("angular_speed", self.angular_speed),
        ] {
            if !value.is_finite() {
                return Err(ConfigError::Validation(format!("{} must be finite", name)));
            }
            if !(0.0..=MAX_SPEED).contains(&value) {
                return Err(ConfigError::Validation(format!(
                    "{} must be between 0.0 and {}, got {}",
                    name, MAX_SPEED, value
                )));
            }
        }
        Ok(())
    }
}

/// How a pixel intensity is compared against the brightness threshold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PixelMatch {
    /// Intensity equals the threshold (deployed behavior)
    #[default]
    Exact,
    /// Intensity is at least the threshold
    AtLeast,
}

impl std::str::FromStr for PixelMatch {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(PixelMatch::Exact),
            "at_least" | "at-least" | "atleast" => Ok(PixelMatch::AtLeast),
            other => Err(ConfigError::Parse(format!("unknown pixel match mode '{}'", other))),
        }
    }
}

/// Locator options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocatorConfig {
    pub matching: PixelMatch,
}

/// Settings for the surrounding runtime, not read by the decision pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Camera stream the frames come from
    pub camera_topic: String,
    /// Endpoint velocity commands are sent to
    pub command_service: String,
    /// Frames buffered between the source and the handler
    pub frame_queue_depth: usize,
    /// Log level (error, warn, info, debug, trace)
    pub log_level: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            camera_topic: "/camera/rgb/image_raw".to_string(),
            command_service: "/ball_chaser/command_robot".to_string(),
            frame_queue_depth: 10,
            log_level: "info".to_string(),
        }
    }
}

/// Complete controller configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChaserConfig {
    pub thresholds: PolicyThresholds,
    pub locator: LocatorConfig,
    pub runtime: RuntimeConfig,
}

impl ChaserConfig {
    /// Load configuration from a JSON, TOML or YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_str(&content)
    }

    /// Parse configuration, trying JSON, then TOML, then YAML
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        if let Ok(config) = serde_json::from_str::<ChaserConfig>(content) {
            return Ok(config);
        }

        let toml_err = match toml::from_str::<ChaserConfig>(content) {
            Ok(config) => return Ok(config),
            Err(e) => e,
        };

        match serde_yaml::from_str::<ChaserConfig>(content) {
            Ok(config) => Ok(config),
            Err(yaml_err) => Err(ConfigError::Parse(format!(
                "not valid JSON, TOML or YAML (toml: {}; yaml: {})",
                toml_err, yaml_err
            ))),
        }
    }

    /// Defaults overridden by `CHASER_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Override fields from `CHASER_*` environment variables
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override fields from any key lookup using the `CHASER_*` names
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("CHASER_BRIGHTNESS_THRESHOLD") {
            self.thresholds.brightness_threshold = parse_value("CHASER_BRIGHTNESS_THRESHOLD", &value)?;
        }
        if let Some(value) = lookup("CHASER_LINEAR_SPEED") {
            self.thresholds.linear_speed = parse_value("CHASER_LINEAR_SPEED", &value)?;
        }
        if let Some(value) = lookup("CHASER_ANGULAR_SPEED") {
            self.thresholds.angular_speed = parse_value("CHASER_ANGULAR_SPEED", &value)?;
        }
        if let Some(value) = lookup("CHASER_PIXEL_MATCH") {
            self.locator.matching = value.parse()?;
        }
        if let Some(value) = lookup("CHASER_QUEUE_DEPTH") {
            self.runtime.frame_queue_depth = parse_value("CHASER_QUEUE_DEPTH", &value)?;
        }
        if let Some(value) = lookup("CHASER_LOG_LEVEL") {
            self.runtime.log_level = value;
        }
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;

        if self.runtime.frame_queue_depth == 0 {
            return Err(ConfigError::Validation(
                "runtime.frame_queue_depth must be > 0".to_string(),
            ));
        }

        const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
        if !LEVELS.contains(&self.runtime.log_level.to_ascii_lowercase().as_str()) {
            return Err(ConfigError::Validation(format!(
                "runtime.log_level must be one of {:?}, got '{}'",
                LEVELS, self.runtime.log_level
            )));
        }

        Ok(())
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigError::Parse(format!("{}='{}': {}", key, value, e)))
}

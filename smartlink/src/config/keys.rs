//! `section.key` addressing for config settings.
//!
//! The `config get/set/reset` subcommands name settings as strings. Each
//! [`ConfigKey`] owns one field of [`ConfigFile`] and a value specification
//! that rejects input the link runtime could not use.

use std::str::FromStr;

use thiserror::Error;

use super::defaults::clamp_max_attempts;
use super::parser::{expand_tilde, parse_bool};
use super::settings::ConfigFile;
use super::writer::path_to_string;
use crate::prefetch::{PriorityClass, ProximityMargin, MAX_ATTEMPTS_LIMIT};

/// Errors from addressing or assigning a setting by name.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    #[error("No setting named '{0}'")]
    UnknownKey(String),

    /// The value failed the key's specification.
    #[error("{key} {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
///
/// Each key maps to a specific field in [`ConfigFile`] and knows how to
/// get and set its value with proper validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    // Link settings
    LinkPrefetchEnabled,
    LinkPriority,
    LinkEnableViewport,
    LinkEnableHover,
    LinkViewportDelayMs,
    LinkHoverDelayMs,
    LinkShowStatus,

    // Viewport settings
    ViewportProximityMargin,
    ViewportIntersectionThreshold,

    // Retry settings
    RetryMaxAttempts,
    RetryBaseDelayMs,

    // Logging settings
    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == s.to_lowercase())
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Get the canonical key name (e.g., "link.priority").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::LinkPrefetchEnabled => "link.prefetch_enabled",
            ConfigKey::LinkPriority => "link.priority",
            ConfigKey::LinkEnableViewport => "link.enable_viewport",
            ConfigKey::LinkEnableHover => "link.enable_hover",
            ConfigKey::LinkViewportDelayMs => "link.viewport_delay_ms",
            ConfigKey::LinkHoverDelayMs => "link.hover_delay_ms",
            ConfigKey::LinkShowStatus => "link.show_status",
            ConfigKey::ViewportProximityMargin => "viewport.proximity_margin",
            ConfigKey::ViewportIntersectionThreshold => "viewport.intersection_threshold",
            ConfigKey::RetryMaxAttempts => "retry.max_attempts",
            ConfigKey::RetryBaseDelayMs => "retry.base_delay_ms",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Get the section name (e.g., "link").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Get the key name within the section (e.g., "priority").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::LinkPrefetchEnabled => config.link.prefetch_enabled.to_string(),
            ConfigKey::LinkPriority => config.link.priority.to_string(),
            ConfigKey::LinkEnableViewport => config.link.enable_viewport.to_string(),
            ConfigKey::LinkEnableHover => config.link.enable_hover.to_string(),
            ConfigKey::LinkViewportDelayMs => config.link.viewport_delay_ms.to_string(),
            ConfigKey::LinkHoverDelayMs => config.link.hover_delay_ms.to_string(),
            ConfigKey::LinkShowStatus => config.link.show_status.to_string(),
            ConfigKey::ViewportProximityMargin => config.viewport.proximity_margin.to_string(),
            ConfigKey::ViewportIntersectionThreshold => {
                config.viewport.intersection_threshold.to_string()
            }
            ConfigKey::RetryMaxAttempts => config.retry.max_attempts.to_string(),
            ConfigKey::RetryBaseDelayMs => config.retry.base_delay_ms.to_string(),
            ConfigKey::LoggingFile => path_to_string(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        self.validate(value)?;
        self.apply(config, value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    fn apply(&self, config: &mut ConfigFile, value: &str) -> Result<(), String> {
        match self {
            ConfigKey::LinkPrefetchEnabled => config.link.prefetch_enabled = parse_bool(value),
            ConfigKey::LinkPriority => {
                config.link.priority = value.parse::<PriorityClass>().map_err(|e| e.to_string())?
            }
            ConfigKey::LinkEnableViewport => config.link.enable_viewport = parse_bool(value),
            ConfigKey::LinkEnableHover => config.link.enable_hover = parse_bool(value),
            ConfigKey::LinkViewportDelayMs => {
                config.link.viewport_delay_ms = parse_number(value)?
            }
            ConfigKey::LinkHoverDelayMs => config.link.hover_delay_ms = parse_number(value)?,
            ConfigKey::LinkShowStatus => config.link.show_status = parse_bool(value),
            ConfigKey::ViewportProximityMargin => {
                config.viewport.proximity_margin =
                    value.parse::<ProximityMargin>().map_err(|e| e.to_string())?
            }
            ConfigKey::ViewportIntersectionThreshold => {
                config.viewport.intersection_threshold = parse_number(value)?
            }
            ConfigKey::RetryMaxAttempts => {
                config.retry.max_attempts = clamp_max_attempts(parse_number(value)?)
            }
            ConfigKey::RetryBaseDelayMs => config.retry.base_delay_ms = parse_number(value)?,
            ConfigKey::LoggingFile => config.logging.file = expand_tilde(value),
        }
        Ok(())
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    /// Get the validation specification for this key.
    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::LinkPrefetchEnabled
            | ConfigKey::LinkEnableViewport
            | ConfigKey::LinkEnableHover
            | ConfigKey::LinkShowStatus => Box::new(BooleanSpec),
            ConfigKey::LinkPriority => Box::new(OneOfSpec::new(&["high", "medium", "low"])),
            ConfigKey::LinkViewportDelayMs
            | ConfigKey::LinkHoverDelayMs
            | ConfigKey::RetryBaseDelayMs => Box::new(NonNegativeIntegerSpec),
            ConfigKey::ViewportProximityMargin => Box::new(MarginSpec),
            ConfigKey::ViewportIntersectionThreshold => Box::new(FractionSpec),
            ConfigKey::RetryMaxAttempts => Box::new(BoundedIntegerSpec {
                max: MAX_ATTEMPTS_LIMIT as u64,
            }),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// Get all supported configuration keys.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::LinkPrefetchEnabled,
            ConfigKey::LinkPriority,
            ConfigKey::LinkEnableViewport,
            ConfigKey::LinkEnableHover,
            ConfigKey::LinkViewportDelayMs,
            ConfigKey::LinkHoverDelayMs,
            ConfigKey::LinkShowStatus,
            ConfigKey::ViewportProximityMargin,
            ConfigKey::ViewportIntersectionThreshold,
            ConfigKey::RetryMaxAttempts,
            ConfigKey::RetryBaseDelayMs,
            ConfigKey::LoggingFile,
        ]
    }
}

fn parse_number<T: FromStr>(value: &str) -> Result<T, String> {
    value
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", value))
}

// ============================================================================
// Value Specifications
// ============================================================================

/// Accepts or rejects a raw string before it is written into a setting.
trait ValueSpecification {
    /// `Err` carries a reason phrased to follow the key name.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

/// One of a fixed set of words, case-insensitive.
struct OneOfSpec {
    options: &'static [&'static str],
}

impl OneOfSpec {
    fn new(options: &'static [&'static str]) -> Self {
        Self { options }
    }
}

impl ValueSpecification for OneOfSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        if self.options.iter().any(|opt| *opt == lower) {
            Ok(())
        } else {
            Err(format!("must be one of: {}", self.options.join(", ")))
        }
    }
}

/// Specification for non-negative integer values.
struct NonNegativeIntegerSpec;

impl ValueSpecification for NonNegativeIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<u64>()
            .map(|_| ())
            .map_err(|_| "must be a non-negative integer".to_string())
    }
}

/// Specification for integers in `0..=max`.
struct BoundedIntegerSpec {
    max: u64,
}

impl ValueSpecification for BoundedIntegerSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u64>() {
            Ok(n) if n <= self.max => Ok(()),
            _ => Err(format!("must be an integer between 0 and {}", self.max)),
        }
    }
}

/// Specification for fractions in `0.0..=1.0`.
struct FractionSpec;

impl ValueSpecification for FractionSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<f64>() {
            Ok(n) if (0.0..=1.0).contains(&n) => Ok(()),
            _ => Err("must be a number between 0.0 and 1.0".to_string()),
        }
    }
}

/// Specification for CSS-like margins.
struct MarginSpec;

impl ValueSpecification for MarginSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<ProximityMargin>()
            .map(|_| ())
            .map_err(|_| "must be 1 to 4 lengths like '200px' or '10%'".to_string())
    }
}

/// A boolean in one of the spellings the INI parser accepts.
struct BooleanSpec;

const BOOLEAN_WORDS: [&str; 8] = ["true", "false", "yes", "no", "on", "off", "1", "0"];

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let word = value.trim().to_lowercase();
        BOOLEAN_WORDS
            .contains(&word.as_str())
            .then_some(())
            .ok_or_else(|| "must be a boolean (true/false, yes/no, on/off, 1/0)".to_string())
    }
}

/// A file path with a file name component.
struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let trimmed = value.trim();
        if trimmed.is_empty() || trimmed.ends_with('/') {
            Err("must name a file".to_string())
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_parsing() {
        assert_eq!(
            "link.priority".parse::<ConfigKey>().unwrap(),
            ConfigKey::LinkPriority
        );
        assert_eq!(
            "RETRY.MAX_ATTEMPTS".parse::<ConfigKey>().unwrap(),
            ConfigKey::RetryMaxAttempts
        );
        assert!(matches!(
            "link.unknown".parse::<ConfigKey>(),
            Err(ConfigKeyError::UnknownKey(_))
        ));
    }

    #[test]
    fn test_section_and_key_name() {
        let key = ConfigKey::ViewportProximityMargin;
        assert_eq!(key.section(), "viewport");
        assert_eq!(key.key_name(), "proximity_margin");
    }

    #[test]
    fn test_every_key_round_trips_its_default() {
        let config = ConfigFile::default();
        for key in ConfigKey::all() {
            let mut copy = config.clone();
            key.set(&mut copy, &key.get(&config))
                .unwrap_or_else(|e| panic!("{}: {}", key.name(), e));
            assert_eq!(key.get(&copy), key.get(&config), "{}", key.name());
        }
    }

    #[test]
    fn test_set_priority() {
        let mut config = ConfigFile::default();
        ConfigKey::LinkPriority.set(&mut config, "High").unwrap();
        assert_eq!(config.link.priority, PriorityClass::High);
        assert_eq!(ConfigKey::LinkPriority.get(&config), "high");
    }

    #[test]
    fn test_set_rejects_invalid_values() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::LinkPriority.set(&mut config, "urgent").is_err());
        assert!(ConfigKey::LinkShowStatus.set(&mut config, "maybe").is_err());
        assert!(ConfigKey::LinkHoverDelayMs.set(&mut config, "-1").is_err());
        assert!(ConfigKey::ViewportIntersectionThreshold
            .set(&mut config, "2")
            .is_err());
        assert!(ConfigKey::ViewportProximityMargin
            .set(&mut config, "wide")
            .is_err());
        assert!(ConfigKey::RetryMaxAttempts.set(&mut config, "11").is_err());
        assert!(ConfigKey::LoggingFile.set(&mut config, "  ").is_err());
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_set_numeric_values() {
        let mut config = ConfigFile::default();
        ConfigKey::RetryMaxAttempts.set(&mut config, "5").unwrap();
        ConfigKey::RetryBaseDelayMs.set(&mut config, "250").unwrap();
        ConfigKey::ViewportIntersectionThreshold
            .set(&mut config, "0.75")
            .unwrap();

        assert_eq!(config.retry.max_attempts, 5);
        assert_eq!(config.retry.base_delay_ms, 250);
        assert_eq!(config.viewport.intersection_threshold, 0.75);
    }
}

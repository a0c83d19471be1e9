//! Settings structs for all configuration sections.
//!
//! Each struct represents one `[section]` of the INI config file.
//! These are pure data types with no parsing or serialization logic.

use std::path::PathBuf;

use crate::prefetch::{PriorityClass, ProximityMargin};

/// Complete application configuration loaded from config.ini.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigFile {
    /// Link behaviour: gating, triggers, presentation
    pub link: LinkSettings,
    /// Options handed to the visibility notifier
    pub viewport: ViewportSettings,
    /// Retry policy for failed prefetches
    pub retry: RetrySettings,
    /// Logging settings
    pub logging: LoggingSettings,
}

/// Link configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSettings {
    /// Master switch for prefetching
    pub prefetch_enabled: bool,
    /// Minimum network quality class: "high", "medium" or "low"
    pub priority: PriorityClass,
    pub enable_viewport: bool,
    pub enable_hover: bool,
    /// Delay after entering the viewport, in milliseconds
    pub viewport_delay_ms: u64,
    /// Delay after pointer enter or focus, in milliseconds
    pub hover_delay_ms: u64,
    /// Expose the status indicator
    pub show_status: bool,
}

/// Visibility notifier configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportSettings {
    pub proximity_margin: ProximityMargin,
    /// Fraction of the element (0.0–1.0) that must be visible
    pub intersection_threshold: f64,
}

/// Retry configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrySettings {
    /// Retries after the first failure (0–10)
    pub max_attempts: u32,
    /// Delay before the first retry, in milliseconds
    pub base_delay_ms: u64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    /// Log file path
    pub file: PathBuf,
}

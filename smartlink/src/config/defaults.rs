//! Default values and constants for all configuration settings.
//!
//! Contains all `DEFAULT_*` constants, clamping helpers, and the
//! `ConfigFile::default()` implementation.

use super::settings::*;
use crate::prefetch::visibility::DEFAULT_INTERSECTION_THRESHOLD;
use crate::prefetch::{
    PriorityClass, ProximityMargin, DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS, MAX_ATTEMPTS_LIMIT,
};

// =============================================================================
// Link defaults
// =============================================================================

/// Default viewport trigger delay in milliseconds (request immediately).
pub const DEFAULT_VIEWPORT_DELAY_MS: u64 = 0;

/// Default hover trigger delay in milliseconds (request immediately).
pub const DEFAULT_HOVER_DELAY_MS: u64 = 0;

// =============================================================================
// Retry defaults
// =============================================================================

/// Default base retry delay in milliseconds.
pub const DEFAULT_RETRY_BASE_DELAY_MS: u64 = DEFAULT_BASE_DELAY.as_millis() as u64;

/// Default log file name inside the config directory.
pub const DEFAULT_LOG_FILE_NAME: &str = "smartlink.log";

/// Clamps `max_attempts` to the supported range and logs a warning if clamped.
pub(super) fn clamp_max_attempts(value: u32) -> u32 {
    if value > MAX_ATTEMPTS_LIMIT {
        tracing::warn!(
            requested = value,
            max = MAX_ATTEMPTS_LIMIT,
            "max_attempts above limit, clamping to {}",
            MAX_ATTEMPTS_LIMIT
        );
        MAX_ATTEMPTS_LIMIT
    } else {
        value
    }
}

// =============================================================================
// ConfigFile::default()
// =============================================================================

impl Default for ConfigFile {
    fn default() -> Self {
        let config_dir = super::file::config_directory();

        Self {
            link: LinkSettings {
                prefetch_enabled: true,
                priority: PriorityClass::Medium,
                enable_viewport: true,
                enable_hover: true,
                viewport_delay_ms: DEFAULT_VIEWPORT_DELAY_MS,
                hover_delay_ms: DEFAULT_HOVER_DELAY_MS,
                show_status: false,
            },
            viewport: ViewportSettings {
                proximity_margin: ProximityMargin::default(),
                intersection_threshold: DEFAULT_INTERSECTION_THRESHOLD,
            },
            retry: RetrySettings {
                max_attempts: DEFAULT_MAX_ATTEMPTS,
                base_delay_ms: DEFAULT_RETRY_BASE_DELAY_MS,
            },
            logging: LoggingSettings {
                file: config_dir.join(DEFAULT_LOG_FILE_NAME),
            },
        }
    }
}

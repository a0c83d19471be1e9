//! Per-link configuration.
//!
//! Every option has a default, so a link built with
//! [`LinkConfig::default()`] prefetches as soon as it becomes visible, at
//! medium priority, retrying twice with a one second base backoff.

use std::time::Duration;

use super::retry::{DEFAULT_BASE_DELAY, DEFAULT_MAX_ATTEMPTS};
use super::trigger::TriggerConfig;
use super::types::PriorityClass;
use super::visibility::{ProximityMargin, VisibilityOptions, DEFAULT_INTERSECTION_THRESHOLD};

// ==================== Retry Defaults ====================

/// Upper bound accepted for `max_attempts`.
///
/// Values above this are clamped when read from a config file.
pub const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Configuration of one link.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkConfig {
    // ==================== Gating ====================
    /// Master switch. When false the link never prefetches.
    pub prefetch_enabled: bool,

    /// Minimum network quality at which the link prefetches.
    pub priority: PriorityClass,

    // ==================== Visibility ====================
    /// Margin grown around the viewport before testing intersection.
    ///
    /// Handed to the visibility notifier. Default: 200px.
    pub proximity_margin: ProximityMargin,

    /// Fraction of the element that must intersect. Default: 0.1.
    pub intersection_threshold: f64,

    // ==================== Triggers ====================
    pub enable_viewport: bool,
    pub enable_hover: bool,

    /// Delay between entering the viewport and requesting. Default: 0.
    pub viewport_delay: Duration,

    /// Delay between pointer enter or focus and requesting. Default: 0.
    pub hover_delay: Duration,

    // ==================== Retry ====================
    /// Retries after the first failure.
    pub max_attempts: u32,

    /// Delay before the first retry. Doubles on each subsequent retry.
    pub base_retry_delay: Duration,

    // ==================== Presentation ====================
    /// Whether the status indicator is exposed.
    pub show_status: bool,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            prefetch_enabled: true,
            priority: PriorityClass::Medium,
            proximity_margin: ProximityMargin::default(),
            intersection_threshold: DEFAULT_INTERSECTION_THRESHOLD,
            enable_viewport: true,
            enable_hover: true,
            viewport_delay: Duration::ZERO,
            hover_delay: Duration::ZERO,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_retry_delay: DEFAULT_BASE_DELAY,
            show_status: false,
        }
    }
}

impl LinkConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefetch_enabled(mut self, enabled: bool) -> Self {
        self.prefetch_enabled = enabled;
        self
    }

    pub fn with_priority(mut self, priority: PriorityClass) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_viewport_delay(mut self, delay: Duration) -> Self {
        self.viewport_delay = delay;
        self
    }

    pub fn with_hover_delay(mut self, delay: Duration) -> Self {
        self.hover_delay = delay;
        self
    }

    pub fn with_viewport_enabled(mut self, enabled: bool) -> Self {
        self.enable_viewport = enabled;
        self
    }

    pub fn with_hover_enabled(mut self, enabled: bool) -> Self {
        self.enable_hover = enabled;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn with_base_retry_delay(mut self, delay: Duration) -> Self {
        self.base_retry_delay = delay;
        self
    }

    pub fn with_show_status(mut self, show: bool) -> Self {
        self.show_status = show;
        self
    }

    pub fn with_visibility(mut self, options: VisibilityOptions) -> Self {
        self.proximity_margin = options.proximity_margin;
        self.intersection_threshold = options.intersection_threshold;
        self
    }

    pub fn trigger_config(&self) -> TriggerConfig {
        TriggerConfig {
            enable_viewport: self.enable_viewport,
            enable_hover: self.enable_hover,
            viewport_delay: self.viewport_delay,
            hover_delay: self.hover_delay,
        }
    }

    pub fn visibility_options(&self) -> VisibilityOptions {
        VisibilityOptions {
            proximity_margin: self.proximity_margin,
            intersection_threshold: self.intersection_threshold,
        }
    }
}

//! INI parsing logic for converting `Ini` → `ConfigFile`.
//!
//! This module contains the `parse_ini()` function and its helpers.
//! It is the single place where INI key names are mapped to struct fields.

use std::path::PathBuf;
use std::str::FromStr;

use ini::Ini;

use super::defaults::clamp_max_attempts;
use super::file::ConfigFileError;
use super::settings::ConfigFile;

/// Parse an `Ini` object into a `ConfigFile`.
///
/// Starts from `ConfigFile::default()` and overlays any values found in the INI.
pub(super) fn parse_ini(ini: &Ini) -> Result<ConfigFile, ConfigFileError> {
    let mut config = ConfigFile::default();

    // [link] section
    if let Some(section) = ini.section(Some("link")) {
        if let Some(v) = section.get("prefetch_enabled") {
            config.link.prefetch_enabled = parse_bool(v);
        }
        if let Some(v) = section.get("priority") {
            config.link.priority = parse_value(
                "link",
                "priority",
                v,
                "must be one of: high, medium, low",
            )?;
        }
        if let Some(v) = section.get("enable_viewport") {
            config.link.enable_viewport = parse_bool(v);
        }
        if let Some(v) = section.get("enable_hover") {
            config.link.enable_hover = parse_bool(v);
        }
        if let Some(v) = section.get("viewport_delay_ms") {
            config.link.viewport_delay_ms = parse_value(
                "link",
                "viewport_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("hover_delay_ms") {
            config.link.hover_delay_ms = parse_value(
                "link",
                "hover_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
        if let Some(v) = section.get("show_status") {
            config.link.show_status = parse_bool(v);
        }
    }

    // [viewport] section
    if let Some(section) = ini.section(Some("viewport")) {
        if let Some(v) = section.get("proximity_margin") {
            config.viewport.proximity_margin = parse_value(
                "viewport",
                "proximity_margin",
                v,
                "expected 1 to 4 lengths like '200px' or '10%'",
            )?;
        }
        if let Some(v) = section.get("intersection_threshold") {
            let threshold: f64 = parse_value(
                "viewport",
                "intersection_threshold",
                v,
                "must be a number between 0.0 and 1.0",
            )?;
            if !(0.0..=1.0).contains(&threshold) {
                return Err(ConfigFileError::InvalidValue {
                    section: "viewport".to_string(),
                    key: "intersection_threshold".to_string(),
                    value: v.to_string(),
                    reason: "must be a number between 0.0 and 1.0".to_string(),
                });
            }
            config.viewport.intersection_threshold = threshold;
        }
    }

    // [retry] section
    if let Some(section) = ini.section(Some("retry")) {
        if let Some(v) = section.get("max_attempts") {
            let parsed: u32 = parse_value(
                "retry",
                "max_attempts",
                v,
                "must be a non-negative integer",
            )?;
            config.retry.max_attempts = clamp_max_attempts(parsed);
        }
        if let Some(v) = section.get("base_delay_ms") {
            config.retry.base_delay_ms = parse_value(
                "retry",
                "base_delay_ms",
                v,
                "must be a non-negative integer (milliseconds)",
            )?;
        }
    }

    // [logging] section
    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = expand_tilde(v);
            }
        }
    }

    Ok(config)
}

/// Parse a trimmed value, mapping failure to `InvalidValue`.
fn parse_value<T: FromStr>(
    section: &str,
    key: &str,
    value: &str,
    reason: &str,
) -> Result<T, ConfigFileError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigFileError::InvalidValue {
            section: section.to_string(),
            key: key.to_string(),
            value: value.to_string(),
            reason: reason.to_string(),
        })
}

/// Parse a boolean the lenient way: true/1/yes/on, anything else is false.
pub(super) fn parse_bool(value: &str) -> bool {
    let v = value.trim().to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
pub(super) fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

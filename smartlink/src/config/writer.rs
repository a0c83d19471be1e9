//! INI serialization logic for converting `ConfigFile` → INI string.
//!
//! This module contains the `to_config_string()` function that produces
//! the commented INI representation written to `config.ini`.

use std::path::Path;

use super::settings::ConfigFile;

/// Convert a `ConfigFile` to a commented INI string for saving.
pub(super) fn to_config_string(config: &ConfigFile) -> String {
    format!(
        r#"[link]
; Master switch. When false, links never prefetch.
prefetch_enabled = {}
; Minimum network quality at which links prefetch:
;   high   - all networks except slow-2g
;   medium - 3g and better (default)
;   low    - 4g only
; Data Saver disables prefetching regardless of priority.
priority = {}
; Prefetch when the link scrolls into (or near) the viewport
enable_viewport = {}
; Prefetch when the pointer enters the link or it receives focus
enable_hover = {}
; Delay in milliseconds before a viewport trigger requests (default: 0)
viewport_delay_ms = {}
; Delay in milliseconds before a hover/focus trigger requests (default: 0)
hover_delay_ms = {}
; Show the prefetch status indicator (default: false)
show_status = {}

[viewport]
; Margin grown around the viewport before visibility is tested.
; CSS shorthand with px or % lengths, e.g. 200px or 100px 0px
proximity_margin = {}
; Fraction of the link (0.0-1.0) that must be visible (default: 0.1)
intersection_threshold = {}

[retry]
; Retries after the first failed prefetch, 0-10 (default: 2)
max_attempts = {}
; Delay in milliseconds before the first retry; doubles each retry (default: 1000)
base_delay_ms = {}

[logging]
; Log file location
file = {}
"#,
        config.link.prefetch_enabled,
        config.link.priority,
        config.link.enable_viewport,
        config.link.enable_hover,
        config.link.viewport_delay_ms,
        config.link.hover_delay_ms,
        config.link.show_status,
        config.viewport.proximity_margin,
        config.viewport.intersection_threshold,
        config.retry.max_attempts,
        config.retry.base_delay_ms,
        path_to_string(&config.logging.file),
    )
}

/// Convert path to string, collapsing home dir to ~.
pub(super) fn path_to_string(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::super::settings::ConfigFile;
    use crate::prefetch::PriorityClass;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.ini");

        let mut config = ConfigFile::default();
        config.link.priority = PriorityClass::Low;
        config.link.hover_delay_ms = 150;
        config.link.show_status = true;
        config.viewport.proximity_margin = "100px 0px".parse().unwrap();
        config.viewport.intersection_threshold = 0.25;
        config.retry.max_attempts = 4;
        config.retry.base_delay_ms = 500;

        config.save_to(&config_path).unwrap();

        let loaded = ConfigFile::load_from(&config_path).unwrap();
        assert_eq!(loaded.link, config.link);
        assert_eq!(loaded.viewport, config.viewport);
        assert_eq!(loaded.retry, config.retry);
    }

    #[test]
    fn test_written_file_is_commented() {
        let content = super::to_config_string(&ConfigFile::default());
        assert!(content.contains("[link]"));
        assert!(content.contains("priority = medium"));
        assert!(content.contains("proximity_margin = 200px"));
        assert!(content.contains("; Data Saver disables prefetching"));
    }
}

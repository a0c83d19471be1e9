//! Loading and saving `~/.smartlink/config.ini`.
//!
//! A missing file is not an error: every setting has a default, so a fresh
//! install behaves exactly like one with a default config written out.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use ini::Ini;
use thiserror::Error;

use super::settings::ConfigFile;
use crate::prefetch::LinkConfig;

/// Errors reading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// The file exists but is not valid INI.
    #[error("Cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ini::Error,
    },

    /// Filesystem failure creating the directory or writing the file.
    #[error("Cannot write {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A setting holds a value the runtime would reject.
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

impl ConfigFile {
    /// Read the user's config, falling back to defaults when absent.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let ini = Ini::load_from_file(path).map_err(|source| ConfigFileError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        super::parser::parse_ini(&ini)
    }

    /// Write the user's config, creating `~/.smartlink` if needed.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let io_error = |source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        fs::write(path, super::writer::to_config_string(self)).map_err(io_error)
    }

    /// Write a default config to `path` unless a file is already there.
    ///
    /// Returns `true` when a file was written.
    pub fn ensure_exists_at(path: &Path) -> Result<bool, ConfigFileError> {
        if path.exists() {
            return Ok(false);
        }
        Self::default().save_to(path)?;
        Ok(true)
    }

    /// Per-link runtime settings derived from the file.
    pub fn link_config(&self) -> LinkConfig {
        LinkConfig {
            prefetch_enabled: self.link.prefetch_enabled,
            priority: self.link.priority,
            proximity_margin: self.viewport.proximity_margin,
            intersection_threshold: self.viewport.intersection_threshold,
            enable_viewport: self.link.enable_viewport,
            enable_hover: self.link.enable_hover,
            viewport_delay: Duration::from_millis(self.link.viewport_delay_ms),
            hover_delay: Duration::from_millis(self.link.hover_delay_ms),
            max_attempts: self.retry.max_attempts,
            base_retry_delay: Duration::from_millis(self.retry.base_delay_ms),
            show_status: self.link.show_status,
        }
    }
}

/// `~/.smartlink`, or `./.smartlink` when no home directory is known.
pub fn config_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".smartlink")
}

pub fn config_file_path() -> PathBuf {
    config_directory().join("config.ini")
}

//! Shared startup for commands that run links.
//!
//! Loads the user's config and installs logging at the configured path, so
//! command handlers start from a ready `ConfigFile`.

use smartlink::config::ConfigFile;
use smartlink::logging::{init_logging, LoggingGuard};
use tracing::info;

use crate::error::CliError;

/// Session state for one CLI command.
pub struct CliRunner {
    config: ConfigFile,
    // Held until the command returns so buffered log lines reach the file.
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load config, start logging and record which command is running.
    ///
    /// Log lines are mirrored to stdout only when stdout is not a terminal,
    /// keeping interactive output readable while piped runs stay complete.
    pub fn start(command: &str, debug: bool) -> Result<Self, CliError> {
        let config = ConfigFile::load()?;

        let stdout_enabled = !atty::is(atty::Stream::Stdout);
        let logging = init_logging(&config.logging.file, stdout_enabled, debug)
            .map_err(|e| CliError::LoggingInit(e.to_string()))?;

        info!(
            version = smartlink::VERSION,
            command,
            log_file = %logging.path().display(),
            "SmartLink CLI starting"
        );

        Ok(Self {
            config,
            _logging: logging,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }
}

//! Errors surfaced by `smartlink` subcommands.
//!
//! Every handler returns [`CliError`]; `main` turns it into a message on
//! stderr, an optional hint, and exit status 1.

use std::fmt;
use std::process;

use smartlink::config::ConfigFileError;
use smartlink::prefetch::PrefetchError;

#[derive(Debug)]
pub enum CliError {
    /// The log file could not be prepared.
    LoggingInit(String),
    /// Unknown key or rejected value in a `config` subcommand.
    Config(String),
    ConfigFile(ConfigFileError),
    /// A malformed `--script` step or similar argument.
    InvalidArgument(String),
    /// A command was sent to a link that had already shut down.
    Link(PrefetchError),
}

impl CliError {
    fn hint(&self) -> Option<&'static [&'static str]> {
        match self {
            CliError::ConfigFile(ConfigFileError::InvalidValue { .. }) => Some(&[
                "Fix the value in the config file, or reset it with:",
                "  smartlink config reset <section.key>",
            ]),
            CliError::ConfigFile(ConfigFileError::Parse { .. }) => Some(&[
                "Regenerate a clean file by removing it and running:",
                "  smartlink config init",
            ]),
            CliError::InvalidArgument(_) => Some(&[
                "Simulation steps are comma-separated, for example:",
                "  viewport-enter,wait:500,network:2g,pointer-enter,wait:3000",
            ]),
            _ => None,
        }
    }

    /// Report the error on stderr and terminate with status 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);
        if let Some(lines) = self.hint() {
            eprintln!();
            for line in lines {
                eprintln!("{}", line);
            }
        }
        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "Could not start logging: {}", msg),
            CliError::Config(msg) => write!(f, "Config: {}", msg),
            CliError::ConfigFile(e) => write!(f, "{}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Link(e) => write!(f, "Link error: {}", e),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::ConfigFile(e) => Some(e),
            CliError::Link(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigFileError> for CliError {
    fn from(e: ConfigFileError) -> Self {
        CliError::ConfigFile(e)
    }
}

impl From<PrefetchError> for CliError {
    fn from(e: PrefetchError) -> Self {
        CliError::Link(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_value_has_reset_hint() {
        let err = CliError::from(ConfigFileError::InvalidValue {
            section: "retry".to_string(),
            key: "max_attempts".to_string(),
            value: "many".to_string(),
            reason: "must be a number".to_string(),
        });
        let hint = err.hint().unwrap();
        assert!(hint.iter().any(|l| l.contains("config reset")));
    }

    #[test]
    fn test_closed_link_has_no_hint() {
        let err = CliError::from(PrefetchError::LinkClosed);
        assert!(err.hint().is_none());
        assert!(err.to_string().starts_with("Link error"));
    }
}

//! Logging setup for SmartLink binaries.
//!
//! Link tasks log through `tracing` with a `target_path` field on every event,
//! so one link's lifecycle can be filtered out of a busy log. This module
//! installs the subscriber that receives those events:
//! - a plain-text file sink, truncated when a session starts
//! - an optional compact stdout sink for piping CLI output
//! - an `EnvFilter` honouring RUST_LOG

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Keeps the background log writer alive. Dropping it flushes the file.
pub struct LoggingGuard {
    _writer: WorkerGuard,
    path: PathBuf,
}

impl LoggingGuard {
    /// File the session is logging to.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Install the global subscriber writing to `log_path`.
///
/// The parent directory is created and any previous content of the file is
/// discarded. `debug` selects the level used when RUST_LOG is unset.
///
/// # Errors
///
/// Fails when the directory cannot be created or the file cannot be truncated.
pub fn init_logging(
    log_path: &Path,
    stdout_enabled: bool,
    debug: bool,
) -> Result<LoggingGuard, io::Error> {
    let (dir, file_name) = split_log_path(log_path)?;
    fs::create_dir_all(&dir)?;
    fs::write(log_path, "")?;

    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::never(
        &dir, file_name,
    ));

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .with_span_events(FmtSpan::CLOSE);

    let stdout_layer = stdout_enabled.then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(io::stdout)
            .with_target(false)
            .compact()
    });

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(LoggingGuard {
        _writer: guard,
        path: log_path.to_path_buf(),
    })
}

/// Split a log file path into its directory and file name.
///
/// A bare file name logs to the working directory.
fn split_log_path(log_path: &Path) -> Result<(PathBuf, &std::ffi::OsStr), io::Error> {
    let file_name = log_path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path {} has no file name", log_path.display()),
        )
    })?;
    let dir = match log_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok((dir, file_name))
}

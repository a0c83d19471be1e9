//! Configuration for smart links.
//!
//! Settings are persisted in an INI file (`~/.smartlink/config.ini`) and
//! converted into the runtime [`LinkConfig`](crate::prefetch::LinkConfig):
//!
//! - [`settings`]: one struct per `[section]`
//! - [`defaults`]: `DEFAULT_*` constants and `ConfigFile::default()`
//! - `parser` / `writer`: INI ↔ [`ConfigFile`]
//! - [`keys`]: get/set by `section.key` name with validation
//!
//! # Example
//!
//! ```ignore
//! use smartlink::config::{ConfigFile, ConfigKey};
//!
//! let mut config = ConfigFile::load()?;
//! "link.priority".parse::<ConfigKey>()?.set(&mut config, "high")?;
//! config.save()?;
//!
//! let link_config = config.link_config();
//! ```

pub mod defaults;
mod file;
pub mod keys;
mod parser;
pub mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use keys::{ConfigKey, ConfigKeyError};
pub use settings::{ConfigFile, LinkSettings, LoggingSettings, RetrySettings, ViewportSettings};

//! Config command - inspect and edit `~/.smartlink/config.ini`.
//!
//! Keys are addressed as `section.key` (for example `retry.max_attempts`).
//! Every write goes through [`ConfigKey::set`], so the file never holds a
//! value the link runtime would reject.

use clap::Subcommand;
use smartlink::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of one or more keys
    Get {
        /// Keys in section.key form (e.g. link.priority)
        #[arg(required = true)]
        keys: Vec<String>,
    },

    /// Validate and store a value
    Set {
        /// Key in section.key form (e.g. retry.base_delay_ms)
        key: String,

        value: String,
    },

    /// Restore a key to its built-in default
    Reset {
        /// Key in section.key form
        key: String,
    },

    /// Print every key, marking values that differ from the defaults
    List,

    /// Print the config file location
    Path,

    /// Write a default config file unless one exists
    Init,
}

/// Dispatch a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { keys } => get(&keys),
        ConfigCommands::Set { key, value } => set(&key, &value),
        ConfigCommands::Reset { key } => reset(&key),
        ConfigCommands::List => list(),
        ConfigCommands::Path => {
            println!("{}", config_file_path().display());
            Ok(())
        }
        ConfigCommands::Init => init(),
    }
}

fn lookup(name: &str) -> Result<ConfigKey, CliError> {
    name.parse().map_err(|_| {
        CliError::Config(format!(
            "no setting named '{}' (run 'smartlink config list' for the full set)",
            name
        ))
    })
}

fn get(names: &[String]) -> Result<(), CliError> {
    let keys = names
        .iter()
        .map(|name| lookup(name))
        .collect::<Result<Vec<_>, _>>()?;
    let config = ConfigFile::load()?;

    match keys.as_slice() {
        [key] => println!("{}", key.get(&config)),
        _ => {
            for key in keys {
                println!("{} = {}", key.name(), key.get(&config));
            }
        }
    }
    Ok(())
}

fn set(name: &str, value: &str) -> Result<(), CliError> {
    let key = lookup(name)?;
    let mut config = ConfigFile::load()?;

    let previous = key.get(&config);
    key.set(&mut config, value)
        .map_err(|e| CliError::Config(e.to_string()))?;
    config.save()?;

    println!("{}: {} -> {}", key.name(), previous, key.get(&config));
    Ok(())
}

fn reset(name: &str) -> Result<(), CliError> {
    let key = lookup(name)?;
    let default = key.get(&ConfigFile::default());
    set(key.name(), &default)
}

fn list() -> Result<(), CliError> {
    let config = ConfigFile::load()?;
    let defaults = ConfigFile::default();

    println!("# {}", config_file_path().display());

    let mut section = None;
    for key in ConfigKey::all() {
        if section != Some(key.section()) {
            section = Some(key.section());
            println!();
            println!("[{}]", key.section());
        }

        let value = key.get(&config);
        let marker = if value == key.get(&defaults) {
            ""
        } else {
            "  (modified)"
        };
        println!("{:<24} = {}{}", key.key_name(), value, marker);
    }
    Ok(())
}

fn init() -> Result<(), CliError> {
    let path = config_file_path();
    let created = ConfigFile::ensure_exists_at(&path)?;
    let verb = if created { "Created" } else { "Kept existing" };
    println!("{} {}", verb, path.display());
    Ok(())
}

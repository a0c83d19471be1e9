//! CLI command implementations.
//!
//! Each subcommand has its own module with argument definitions and handlers.
//!
//! # Command Modules
//!
//! - [`check`] - Eligibility decisions and network status report
//! - [`config`] - Configuration management (get, set, reset, list, path, init)
//! - [`simulate`] - Drive a link through a scripted event sequence

pub mod check;
pub mod common;
pub mod config;
pub mod simulate;

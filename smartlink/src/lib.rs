//! SmartLink - network-aware link prefetching
//!
//! This library decides when a navigation link should warm its destination
//! ahead of time: on visibility or hover, gated by network quality and the
//! link's priority, with cancellable calls and exponential-backoff retries.
//!
//! # High-Level API
//!
//! ```ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use smartlink::config::ConfigFile;
//! use smartlink::prefetch::{NetworkSource, SimulatedPrimitive, SmartLink};
//!
//! let config = ConfigFile::load()?;
//! let network = NetworkSource::default();
//! let primitive = Arc::new(SimulatedPrimitive::new(Duration::from_millis(80)));
//!
//! let link = SmartLink::builder("/docs", primitive)
//!     .config(config.link_config())
//!     .network(network.clone())
//!     .spawn();
//!
//! link.viewport_enter()?;
//! ```

pub mod config;
pub mod logging;
pub mod prefetch;

/// Version of the SmartLink library and CLI.
///
/// This is synchronized across all components in the workspace.
/// The version is defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
    }
}

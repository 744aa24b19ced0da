//! Subscriber setup for binaries embedding the session.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the host process.

use tracing_subscriber::EnvFilter;

use crate::config::EnvConfig;

pub fn filter_directive(config: &EnvConfig) -> String {
    match &config.log_filter {
        Some(filter) => filter.clone(),
        None if config.debug => "debug".to_owned(),
        None => "info".to_owned(),
    }
}

/// Installs a stderr fmt subscriber. Returns false when one is already set.
pub fn init(config: &EnvConfig) -> bool {
    let filter = EnvFilter::try_new(filter_directive(config))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(config.debug)
        .try_init()
        .is_ok()
}

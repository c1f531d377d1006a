//! Tracing setup

use tracing_subscriber::EnvFilter;

use crate::{config::CrudConfig, error::Result};

fn env_filter(config: &CrudConfig) -> EnvFilter {
    EnvFilter::try_new(&config.service.log_level).unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize JSON formatted tracing
///
/// The filter comes from `service.log_level`; an invalid directive falls back
/// to `info`. Calling this after a global subscriber is installed is a no-op.
#[cfg(feature = "observability")]
pub fn init_tracing(config: &CrudConfig) -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .json()
        .with_env_filter(env_filter(config))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Tracing initialized for service: {}", config.service.name);
    }

    Ok(())
}

/// Initialize plain text tracing
#[cfg(not(feature = "observability"))]
pub fn init_tracing(config: &CrudConfig) -> Result<()> {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .try_init()
        .is_ok();

    if installed {
        tracing::info!("Tracing initialized for service: {}", config.service.name);
    }

    Ok(())
}

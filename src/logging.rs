//! Tracing subscriber setup
//!
//! The library only emits `tracing` events. Binaries that embed it call
//! [`init_tracing`] once at startup; `RUST_LOG` overrides the default filter.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{Error, Result};

/// Install a global fmt subscriber filtered by `RUST_LOG`, or by
/// `default_filter` (e.g. `"info"` or `"trueno_ab=debug"`) when unset.
///
/// # Errors
///
/// Returns error if `default_filter` is not a valid directive or a global
/// subscriber is already installed
pub fn init_tracing(default_filter: &str) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_filter)
            .map_err(|e| Error::Other(format!("Invalid log filter {default_filter:?}: {e}")))?,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(true))
        .try_init()
        .map_err(|e| Error::Other(format!("Tracing already initialized: {e}")))?;

    tracing::info!(filter = default_filter, "Logging initialized");
    Ok(())
}

//! Diagnostic output of the shop process.
//!
//! `RUST_LOG` picks the levels (for example `pide_shop=debug`), `info` otherwise.
//! Order transitions do not go through here, they have their own log (see [`crate::transition_log`]).
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::ShopError;

/// Installs the global subscriber. Call once, before anything logs.
///
/// # Errors
///
/// Returns `ShopError::LoggingInit` if a global subscriber is already installed.
pub fn init_logging() -> Result<(), ShopError> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(false).with_thread_names(true))
        .try_init()
        .map_err(|e| ShopError::LoggingInit(e.to_string()))
}

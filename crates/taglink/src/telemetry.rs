//! Log subscriber setup for the `taglink` binary.

use taglink_error::{ConfigError, TaglinkResult};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,taglink=debug";

/// Build the log filter: `debug` everywhere when `verbose`, otherwise
/// `RUST_LOG` or [`DEFAULT_FILTER`].
pub fn env_filter(verbose: bool) -> EnvFilter {
    if verbose {
        return EnvFilter::new("debug");
    }
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Logs go to stderr so stdout stays
/// reserved for command output.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init_telemetry(verbose: bool, json: bool) -> TaglinkResult<()> {
    let registry = tracing_subscriber::registry().with(env_filter(verbose));

    let installed = if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .try_init()
    };
    installed.map_err(|e| ConfigError::new(format!("Failed to initialize logging: {}", e)))?;

    tracing::debug!(verbose, json, "Telemetry initialized");
    Ok(())
}

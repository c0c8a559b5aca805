//! Logging setup for providers and translators.
//!
//! Logs go to **stderr**. Stdout carries the handshake line a host reads to
//! find the provider's address, so nothing else may be written there.
//!
//! # Quick Start
//!
//! ```no_run
//! use athanor_sdk::schema::Schema;
//! use athanor_sdk::{init_logging, serve, ProviderService};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), athanor_sdk::ProviderError> {
//!     init_logging();
//!
//!     tracing::info!("Starting provider");
//!     serve(ProviderService::new(Schema::new("storage", "0.1.0"))).await
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: log filter, e.g. `info`, `debug` or `athanor_sdk=debug`

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_LOG_LEVEL: &str = "info";

fn filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn subscriber(default_level: &str) -> impl tracing::Subscriber + Send + Sync + 'static {
    tracing_subscriber::registry().with(filter(default_level)).with(
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false),
    )
}

/// Install the stderr subscriber, filtered by `RUST_LOG` or `info`.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default(DEFAULT_LOG_LEVEL);
}

/// Like [`init_logging`], with a different level when `RUST_LOG` is unset.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    subscriber(default_level).init();
}

/// Install the subscriber unless one is already set.
///
/// Returns `false` if a subscriber was already installed.
pub fn try_init_logging() -> bool {
    subscriber(DEFAULT_LOG_LEVEL).try_init().is_ok()
}

#[cfg(test)]
mod tests {
    // The global subscriber can be set once per process, so only the
    // non-panicking entry point is exercised here.

    use super::*;

    #[test]
    fn test_env_filter_parsing() {
        assert!(EnvFilter::try_new(DEFAULT_LOG_LEVEL).is_ok());
        assert!(EnvFilter::try_new("athanor_sdk=debug").is_ok());
        assert!(EnvFilter::try_new("warn,athanor_sdk::server=debug").is_ok());
    }

    #[test]
    fn test_try_init_is_idempotent() {
        try_init_logging();
        assert!(!try_init_logging());
    }
}

//! Tracing subscriber setup.
//!
//! Library crates only emit `tracing` events; the embedding process decides
//! where they go. These helpers install the default `fmt` + `EnvFilter`
//! registry used by Trawl front-ends and tests.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "info,trawl=debug";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Initialize the global tracing subscriber.
///
/// # Panics
/// Panics if a global subscriber has already been installed.
pub fn init_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(env_filter())
        .init();
}

/// Initialize the global tracing subscriber unless one is already installed.
///
/// Returns `true` if this call installed the subscriber. Safe to call from
/// every test.
pub fn try_init_tracing() -> bool {
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_test_writer())
        .with(env_filter())
        .try_init()
        .is_ok()
}

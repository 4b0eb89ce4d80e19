//! # Logging
//!
//! The crate only emits `tracing` events; installing a subscriber is left to the host
//! application. [`init_logging`] is a convenience for binaries, demos and tests that
//! have no subscriber of their own.

use std::sync::OnceLock;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

static LOGGER_INITIALIZED: OnceLock<()> = OnceLock::new();

const DEFAULT_LEVEL: &str = "info";

/// Installs a console subscriber filtered by `RUST_LOG`, defaulting to `info`.
pub fn init_logging() {
    init_logging_with(DEFAULT_LEVEL);
}

/// Installs a console subscriber filtered by `RUST_LOG`, defaulting to `default_level`.
///
/// Only the first call has an effect. An already installed global subscriber is kept.
pub fn init_logging_with(default_level: &str) {
    LOGGER_INITIALIZED.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

        let subscriber = tracing_subscriber::registry().with(filter).with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_level(true),
        );

        if subscriber.try_init().is_err() {
            tracing::debug!("global tracing subscriber already set, keeping it");
        }
    });
}

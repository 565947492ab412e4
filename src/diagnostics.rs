//! # Diagnostics
//!
//! The logger reports its own lifecycle (opens, failed opens, reopens after
//! a missing file, dropped records) through the `tracing` ecosystem rather
//! than through the log file it manages. This keeps a broken log file from
//! hiding the reason it broke.
//!
//! ## Environment Configuration
//!
//! Set `RUST_LOG` to control what is shown:
//! - `RUST_LOG=swarmlog=debug` - every open and close
//! - `RUST_LOG=warn` - only failures

use once_cell::sync::Lazy;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Filter used when `RUST_LOG` is not set
pub const DEFAULT_DIAGNOSTICS_FILTER: &str = "swarmlog=info,warn";

/// Install a stderr `tracing` subscriber for the crate's own diagnostics.
///
/// Safe to call any number of times. If the host application already set a
/// global subscriber, that one is kept.
pub fn init_diagnostics() {
    static INIT: Lazy<()> = Lazy::new(|| {
        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIAGNOSTICS_FILTER));

        let installed = tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(true)
                    .with_line_number(true),
            )
            .try_init();

        if installed.is_err() {
            tracing::debug!("global subscriber already set, keeping it");
        }
    });

    Lazy::force(&INIT);
}

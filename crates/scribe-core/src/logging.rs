//! Tracing subscriber setup.
//!
//! Diagnostics go to stderr so stdout stays free for the transcript.
//! `RUST_LOG` takes precedence over the configured level.

use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Call once at startup; later calls are no-ops.
///
/// # Arguments
///
/// * `level` - Default filter directive when `RUST_LOG` is unset (e.g. `"info"`).
/// * `json` - Emit JSON lines instead of the compact human format.
pub fn init_subscriber(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    // try_init fails if a global subscriber is already set
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };
    match installed {
        Ok(()) => tracing::debug!(default_level = level, json, "logging initialized"),
        Err(_) => tracing::trace!("subscriber already installed, keeping it"),
    }
}

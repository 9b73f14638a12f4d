//! Structured logging with `tracing`.
//!
//! The library crates only emit `tracing` events; installing a subscriber
//! is left to the embedding shell (or a test) via [`init_subscriber`].

/// Initialize the global tracing subscriber with stderr output.
///
/// Call once at startup. Subsequent calls are no-ops. The `TASKPAD_LOG`
/// environment variable overrides `level` using the usual `EnvFilter`
/// directive syntax.
///
/// # Arguments
///
/// * `level` - Minimum log level to display when `TASKPAD_LOG` is unset.
pub fn init_subscriber(level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter =
        EnvFilter::try_from_env("TASKPAD_LOG").unwrap_or_else(|_| EnvFilter::new(level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .compact();

    // try_init is a no-op if a subscriber is already set
    let _ = subscriber.try_init();
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

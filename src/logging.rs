use std::io;
use tracing_subscriber::EnvFilter;

/// Diagnostic logging to stderr. `RUST_LOG` takes precedence over `verbose`.
pub fn init(verbose: bool) {
    let log_level = if verbose { "debug" } else { "warn" };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

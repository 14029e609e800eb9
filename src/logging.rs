//! Diagnostic logging to stderr. Progress lines for -v go to stdout separately.

use tracing_subscriber::EnvFilter;

/// Default filter: warnings only, or debug for this crate when verbose. RUST_LOG overrides.
pub fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "warn,armoread=debug"
    } else {
        "warn"
    }
}

/// Install the stderr subscriber. Safe to call once per process; later calls are ignored.
pub fn init_logging(verbose: bool) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter(verbose)));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

use std::io;
use std::time::Instant;

use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Installs the stderr logger. `RUST_LOG` wins over `verbose` when set.
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .try_init();
}

/// Runs `f` and logs how long it took at debug level.
pub fn timed<T>(label: &str, f: impl FnOnce() -> T) -> T {
    let start = Instant::now();
    let out = f();
    debug!(elapsed_ms = start.elapsed().as_secs_f64() * 1000.0, "{label} finished");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timed_returns_result() {
        assert_eq!(timed("sum", || 2 + 2), 4);
    }

    #[test]
    fn test_init_twice_is_harmless() {
        init(false);
        init(true);
    }
}

//! Subscriber setup for binaries. Library code only emits events.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

/// Environment variable holding a `tracing` filter, e.g. `blockctl=debug`.
pub const LOG_ENV: &str = "BLOCKCTL_LOG";

static INIT: Once = Once::new();

/// Filter from `BLOCKCTL_LOG`, or `fallback` when unset or unparsable.
pub fn filter(fallback: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Install a stderr `fmt` subscriber. Later calls, and calls after another
/// subscriber was installed, do nothing.
pub fn init(fallback: &str) {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter(fallback))
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init("warn");
        init("debug");
    }

    #[test]
    fn fallback_filter_is_used() {
        if std::env::var_os(LOG_ENV).is_none() {
            assert_eq!(filter("blockctl=debug").to_string(), "blockctl=debug");
        }
    }
}

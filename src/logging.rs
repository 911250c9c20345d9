//! Tracing bootstrap for the binary.
//!
//! Output goes to stderr so stdout stays clean for command output.

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Environment variable holding an env-filter directive string.
pub const ENV_VAR: &str = "CADENCE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Picks the filter: `CADENCE_LOG`, then the configured level, then `warn`.
pub fn filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_env(ENV_VAR)
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber. A second call is a no-op.
pub fn init(configured: Option<&str>) {
    let installed = tracing_subscriber::registry()
        .with(filter(configured))
        .with(fmt::layer().with_writer(std::io::stderr))
        .try_init();
    if installed.is_err() {
        tracing::debug!("subscriber already installed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_twice_does_not_panic() {
        init(Some("info"));
        init(None);
    }

    #[test]
    fn configured_level_is_used_without_env() {
        if std::env::var_os(ENV_VAR).is_some() {
            return;
        }
        assert_eq!(filter(Some("debug")).to_string(), "debug");
        assert_eq!(filter(None).to_string(), "warn");
    }
}

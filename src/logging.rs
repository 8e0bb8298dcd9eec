//! Logging initialization
//!
//! Built on `tracing-subscriber`. `RUST_LOG` wins over the configured level.

use crate::config::LoggingConfig;
use tracing_subscriber::EnvFilter;

/// Build the filter: `RUST_LOG` if set and valid, otherwise the configured level.
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()))
}

/// Install the global fmt subscriber.
///
/// Returns `false` if a global subscriber was already installed, in which case
/// the existing one is left alone.
pub fn init_logging(config: &LoggingConfig) -> bool {
    let installed = tracing_subscriber::fmt()
        .with_env_filter(env_filter(config))
        .with_ansi(config.ansi)
        .with_target(true)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(target: "proto_bridge", level = config.level.as_str(), "Logging initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_init_is_idempotent() {
        let config = LoggingConfig {
            level: LogLevel::Debug,
            ansi: false,
        };
        init_logging(&config);
        assert!(!init_logging(&config));
    }
}

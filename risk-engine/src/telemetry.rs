//! Tracing subscriber setup

use crate::config::LogConfig;
use crate::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber
///
/// `RUST_LOG` wins over the configured level. Output goes to stderr so
/// command-line JSON on stdout stays clean.
pub fn init(config: &LogConfig) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            Error::Config(format!("invalid log level/filter '{}': {}", config.level, e))
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false);

    let installed = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().with_ansi(false).try_init()
    };
    installed.map_err(|e| Error::Config(format!("telemetry error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_level_rejected() {
        if std::env::var("RUST_LOG").is_ok() {
            return;
        }
        let config = LogConfig {
            level: "kyb=verbose".to_string(),
            json: false,
        };
        assert!(matches!(init(&config), Err(Error::Config(_))));
    }
}

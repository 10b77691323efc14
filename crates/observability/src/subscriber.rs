//! Installs the global `tracing` subscriber.

use anyhow::Context;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::SystemTime;

use crate::config::{LogFormat, ObservabilityConfig};

/// Installs a fmt subscriber for `config`.
///
/// Only the first successful call in a process takes effect; later calls
/// leave the installed subscriber in place and return `Ok`. An invalid filter
/// is an error.
pub fn init_with(config: &ObservabilityConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.filter)
        .with_context(|| format!("invalid log filter {:?}", config.filter))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_timer(SystemTime)
        .with_target(false);

    let installed = match config.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    if installed.is_ok() {
        tracing::debug!(format = %config.format, filter = %config.filter, "tracing initialized");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_init_is_a_no_op() {
        let config = ObservabilityConfig {
            filter: "debug".to_string(),
            format: LogFormat::Compact,
        };
        init_with(&config).unwrap();
        init_with(&config).unwrap();
        init_with(&ObservabilityConfig::default()).unwrap();
    }

    #[test]
    fn invalid_filter_is_rejected() {
        let config = ObservabilityConfig {
            filter: "comercia=notalevel".to_string(),
            format: LogFormat::Json,
        };
        assert!(init_with(&config).is_err());
    }
}

//! Tracing/logging setup shared by every binary that embeds the domain crates.

pub mod config;
pub mod subscriber;

pub use config::{ConfigError, LogFormat, ObservabilityConfig};

/// Initialize process-wide tracing from the environment.
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() -> anyhow::Result<()> {
    let config = ObservabilityConfig::from_env()?;
    subscriber::init_with(&config)
}

pub use subscriber::init_with;

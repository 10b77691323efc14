//! Environment-driven logging configuration.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

pub const FILTER_VAR: &str = "RUST_LOG";
pub const FORMAT_VAR: &str = "COMERCIA_LOG_FORMAT";

const DEFAULT_FILTER: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown log format {0:?} (expected json, pretty or compact)")]
    UnknownFormat(String),
}

/// Output layout of the fmt subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Json,
    Pretty,
    Compact,
}

impl LogFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Json => "json",
            LogFormat::Pretty => "pretty",
            LogFormat::Compact => "compact",
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" => Ok(LogFormat::Pretty),
            "compact" => Ok(LogFormat::Compact),
            _ => Err(ConfigError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// `EnvFilter` directives, e.g. `info,comercia_infra=debug`.
    pub filter: String,
    pub format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            format: LogFormat::default(),
        }
    }
}

impl ObservabilityConfig {
    /// Reads `RUST_LOG` and `COMERCIA_LOG_FORMAT`; unset or blank values fall
    /// back to the defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let present = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let mut config = Self::default();
        if let Some(filter) = present(FILTER_VAR) {
            config.filter = filter.trim().to_string();
        }
        if let Some(format) = present(FORMAT_VAR) {
            config.format = format.parse()?;
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_to_info_json() {
        let config = ObservabilityConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, ObservabilityConfig::default());
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Json);
    }

    #[test]
    fn reads_both_variables() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            ("RUST_LOG", "warn,comercia_infra=debug"),
            ("COMERCIA_LOG_FORMAT", " Pretty "),
        ]))
        .unwrap();
        assert_eq!(config.filter, "warn,comercia_infra=debug");
        assert_eq!(config.format, LogFormat::Pretty);
    }

    #[test]
    fn blank_values_fall_back() {
        let config = ObservabilityConfig::from_lookup(lookup(&[
            ("RUST_LOG", "  "),
            ("COMERCIA_LOG_FORMAT", ""),
        ]))
        .unwrap();
        assert_eq!(config, ObservabilityConfig::default());
    }

    #[test]
    fn rejects_unknown_format() {
        let err = ObservabilityConfig::from_lookup(lookup(&[("COMERCIA_LOG_FORMAT", "xml")]))
            .unwrap_err();
        assert_eq!(err, ConfigError::UnknownFormat("xml".to_string()));
    }

    #[test]
    fn format_parses_and_displays() {
        for format in [LogFormat::Json, LogFormat::Pretty, LogFormat::Compact] {
            assert_eq!(format.to_string().parse::<LogFormat>().unwrap(), format);
        }
        assert_eq!("COMPACT".parse::<LogFormat>().unwrap(), LogFormat::Compact);
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: ObservabilityConfig =
            serde_json::from_value(serde_json::json!({ "format": "compact" })).unwrap();
        assert_eq!(config.filter, "info");
        assert_eq!(config.format, LogFormat::Compact);
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

use crate::exposition::ListenerAddr;
use crate::filter::AllowlistFilter;

pub const LISTENER_CONFIG: &str = "prometheus.metrics.reporter.listener";
pub const LISTENER_ENABLE_CONFIG: &str = "prometheus.metrics.reporter.listener.enable";
pub const ALLOWLIST_CONFIG: &str = "prometheus.metrics.reporter.allowlist";

pub const LISTENER_CONFIG_DEFAULT: &str = "http://:8080";

/// Configuration failure, surfaced synchronously to the caller at startup
/// or reconfiguration time. Never silently defaulted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid allowlist pattern(s): {patterns}")]
    InvalidAllowlist { patterns: String },
    #[error("invalid listener {text:?}, expected format http://[host]:[port]")]
    InvalidListener { text: String },
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Typed view of the reporter's string properties map.
#[derive(Debug, Clone)]
pub struct ReporterConfig {
    listener: ListenerAddr,
    listener_enabled: bool,
    allowlist: AllowlistFilter,
}

impl ReporterConfig {
    /// Parse and validate the properties map, failing fast on the first
    /// malformed entry.
    pub fn parse(props: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let listener = props
            .get(LISTENER_CONFIG)
            .map_or(LISTENER_CONFIG_DEFAULT, String::as_str)
            .parse()?;
        let listener_enabled = match props.get(LISTENER_ENABLE_CONFIG) {
            None => true,
            Some(v) => match v.to_ascii_lowercase().as_str() {
                "true" => true,
                "false" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: LISTENER_ENABLE_CONFIG,
                        value: v.clone(),
                        reason: "expected true or false",
                    });
                }
            },
        };
        let allowlist = Self::parse_allowlist(props)?;
        Ok(ReporterConfig {
            listener,
            listener_enabled,
            allowlist,
        })
    }

    /// Compile just the allowlist entry, for reconfiguration where the
    /// rest of the map is left untouched.
    pub fn parse_allowlist(props: &HashMap<String, String>) -> Result<AllowlistFilter, ConfigError> {
        match props.get(ALLOWLIST_CONFIG) {
            Some(expression) => AllowlistFilter::compile(expression),
            None => Ok(AllowlistFilter::match_all()),
        }
    }

    pub fn listener(&self) -> &ListenerAddr {
        &self.listener
    }

    pub fn listener_enabled(&self) -> bool {
        self.listener_enabled
    }

    pub fn allowlist(&self) -> &AllowlistFilter {
        &self.allowlist
    }

    pub fn is_allowed(&self, name: &str) -> bool {
        self.allowlist.matches(name)
    }
}

impl fmt::Display for ReporterConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listener={}, listener_enabled={}, allowlist={}",
            self.listener, self.listener_enabled, self.allowlist
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn props(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = ReporterConfig::parse(&HashMap::new()).unwrap();
        assert_eq!(config.listener().to_string(), "http://:8080");
        assert!(config.listener_enabled());
        assert!(config.is_allowed("random_name"));
    }

    #[test]
    fn overrides() {
        let config = ReporterConfig::parse(&props(&[
            (LISTENER_CONFIG, "http://:0"),
            (ALLOWLIST_CONFIG, "kafka_server.*"),
            (LISTENER_ENABLE_CONFIG, "false"),
        ]))
        .unwrap();
        assert_eq!(config.listener().port(), 0);
        assert!(!config.listener_enabled());
        assert!(!config.is_allowed("random_name"));
        assert!(config.is_allowed("kafka_server_metric"));
    }

    #[test]
    fn invalid_entries() {
        assert!(matches!(
            ReporterConfig::parse(&props(&[(LISTENER_CONFIG, "tcp://:8080")])),
            Err(ConfigError::InvalidListener { .. })
        ));
        assert!(matches!(
            ReporterConfig::parse(&props(&[(ALLOWLIST_CONFIG, "hell[o,s]world")])),
            Err(ConfigError::InvalidAllowlist { .. })
        ));
        assert!(matches!(
            ReporterConfig::parse(&props(&[(LISTENER_ENABLE_CONFIG, "yes")])),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}

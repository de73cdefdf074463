/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::ConfigError;

static LISTENER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^http://\[?([0-9a-zA-Z\-%._:]*)\]?:([0-9]+)$").unwrap());

/// Address the scrape endpoint listens on, parsed from
/// `http://[host]:port`.
///
/// The host may be empty (bind all interfaces) or an IPv6 literal with or
/// without brackets. The port is mandatory; any trailing characters,
/// missing port or negative port fail with
/// [`ConfigError::InvalidListener`] carrying the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ListenerAddr {
    host: String,
    port: u16,
}

impl ListenerAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        ListenerAddr {
            host: host.into(),
            port,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Socket address string suitable for binding: an empty host binds
    /// all interfaces and IPv6 hosts get bracketed.
    pub(crate) fn bind_addr(&self) -> String {
        if self.host.is_empty() {
            format!("0.0.0.0:{}", self.port)
        } else if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl FromStr for ListenerAddr {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidListener {
            text: s.to_string(),
        };
        let caps = LISTENER_RE.captures(s).ok_or_else(invalid)?;
        let host = caps[1].to_string();
        let port = caps[2].parse::<u16>().map_err(|_| invalid())?;
        Ok(ListenerAddr { host, port })
    }
}

impl fmt::Display for ListenerAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "http://{}:{}", self.host, self.port)
    }
}

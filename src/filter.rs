/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::fmt;

use regex::Regex;

use crate::config::ConfigError;

/// Compiled metric-name allowlist.
///
/// The expression is a comma-separated list of regex alternatives. Each
/// alternative must fully match a candidate name for it to be admitted.
/// Compilation is eager: a malformed alternative fails here, at
/// configuration time, never at match time. The filter itself is
/// immutable; runtime updates replace the whole instance through an
/// atomic swap in [`crate::report::Reporter`].
#[derive(Debug, Clone)]
pub struct AllowlistFilter {
    regex: Regex,
    source: String,
}

impl AllowlistFilter {
    /// Filter admitting every metric name. Used when no allowlist is
    /// configured.
    pub fn match_all() -> Self {
        AllowlistFilter {
            regex: Regex::new("^(?s:.*)$").unwrap(),
            source: ".*".to_string(),
        }
    }

    /// Compile a comma-separated list of regex alternatives.
    ///
    /// An empty expression admits everything. Every alternative is
    /// compiled on its own first so the error names all offending items;
    /// note this also rejects escaped commas, a comma always separates
    /// alternatives.
    pub fn compile(expression: &str) -> Result<Self, ConfigError> {
        if expression.is_empty() {
            return Ok(AllowlistFilter::match_all());
        }

        let items: Vec<&str> = expression.split(',').collect();
        let invalid: Vec<&str> = items
            .iter()
            .copied()
            .filter(|item| Regex::new(item).is_err())
            .collect();
        if !invalid.is_empty() {
            return Err(ConfigError::InvalidAllowlist {
                patterns: invalid.join(","),
            });
        }

        let joined = items.join("|");
        let regex = Regex::new(&format!("^(?:{joined})$")).map_err(|_| {
            ConfigError::InvalidAllowlist {
                patterns: expression.to_string(),
            }
        })?;
        Ok(AllowlistFilter {
            regex,
            source: expression.to_string(),
        })
    }

    /// Full-match membership test against the compiled pattern.
    pub fn matches(&self, name: &str) -> bool {
        self.regex.is_match(name)
    }

    /// The original expression this filter was compiled from.
    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for AllowlistFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

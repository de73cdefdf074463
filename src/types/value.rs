/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::fmt;

/// Current value of a gauge-kind metric as sampled from the producer.
///
/// Producers report either a number or a free-form value. Numbers are
/// widened to f64 at collection time, free-form values are exported as an
/// info data point carrying the string form.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricValue {
    Double(f64),
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

impl MetricValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            MetricValue::Double(f) => Some(*f),
            MetricValue::Signed(i) => Some(*i as f64),
            MetricValue::Unsigned(u) => Some(*u as f64),
            MetricValue::Text(_) => None,
        }
    }

    pub fn is_numeric(&self) -> bool {
        !matches!(self, MetricValue::Text(_))
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Double(v)
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Signed(v)
    }
}

impl From<u64> for MetricValue {
    fn from(v: u64) -> Self {
        MetricValue::Unsigned(v)
    }
}

impl From<String> for MetricValue {
    fn from(v: String) -> Self {
        MetricValue::Text(v)
    }
}

impl From<&str> for MetricValue {
    fn from(v: &str) -> Self {
        MetricValue::Text(v.to_string())
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Unsigned(u) => f.write_str(itoa::Buffer::new().format(*u)),
            MetricValue::Signed(i) => f.write_str(itoa::Buffer::new().format(*i)),
            MetricValue::Double(v) => f.write_str(ryu::Buffer::new().format(*v)),
            MetricValue::Text(s) => f.write_str(s),
        }
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::Arc;

use super::Labels;

#[derive(Debug, Clone, PartialEq)]
pub struct CounterDataPoint {
    pub labels: Labels,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GaugeDataPoint {
    pub labels: Labels,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quantile {
    pub quantile: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryDataPoint {
    pub labels: Labels,
    pub count: u64,
    pub sum: f64,
    pub quantiles: Vec<Quantile>,
}

/// Free-form value exported as a constant series with an extra label
/// carrying the value, keyed by the metric's attribute name.
#[derive(Debug, Clone, PartialEq)]
pub struct InfoDataPoint {
    pub labels: Labels,
    pub attribute: Arc<str>,
    pub value: String,
}

/// One collected metric: all data points sharing one output name and one
/// snapshot kind.
#[derive(Debug, Clone, PartialEq)]
pub enum MetricSnapshot {
    Counter {
        name: Arc<str>,
        data: Vec<CounterDataPoint>,
    },
    Gauge {
        name: Arc<str>,
        data: Vec<GaugeDataPoint>,
    },
    Summary {
        name: Arc<str>,
        data: Vec<SummaryDataPoint>,
    },
    Info {
        name: Arc<str>,
        data: Vec<InfoDataPoint>,
    },
}

impl MetricSnapshot {
    pub fn name(&self) -> &str {
        match self {
            MetricSnapshot::Counter { name, .. } => name,
            MetricSnapshot::Gauge { name, .. } => name,
            MetricSnapshot::Summary { name, .. } => name,
            MetricSnapshot::Info { name, .. } => name,
        }
    }

    pub fn data_point_count(&self) -> usize {
        match self {
            MetricSnapshot::Counter { data, .. } => data.len(),
            MetricSnapshot::Gauge { data, .. } => data.len(),
            MetricSnapshot::Summary { data, .. } => data.len(),
            MetricSnapshot::Info { data, .. } => data.len(),
        }
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::Arc;

use super::MetricValue;

/// Live view of a monotonic count owned by the producer.
pub trait CounterSource: Send + Sync {
    fn count(&self) -> u64;
}

/// Live view of a point-in-time value owned by the producer.
pub trait GaugeSource: Send + Sync {
    fn value(&self) -> MetricValue;
}

/// Live view of a sample distribution owned by the producer.
///
/// Quantiles are computed through the producer's own estimator each time
/// they are read, never precomputed or cached here.
pub trait SamplingSource: Send + Sync {
    fn count(&self) -> u64;
    fn sum(&self) -> f64;
    fn quantile(&self, q: f64) -> f64;
}

impl<F> CounterSource for F
where
    F: Fn() -> u64 + Send + Sync,
{
    fn count(&self) -> u64 {
        self()
    }
}

impl<F> GaugeSource for F
where
    F: Fn() -> MetricValue + Send + Sync,
{
    fn value(&self) -> MetricValue {
        self()
    }
}

/// Sampling capability of one registered metric.
///
/// The variant is decided once at registration time. The wrapped trait
/// objects are non-owning views into producer state: every collection pass
/// re-reads the current value, nothing is cached.
#[derive(Clone)]
pub enum MetricSource {
    Counter(Arc<dyn CounterSource>),
    Gauge(Arc<dyn GaugeSource>),
    Timer(Arc<dyn SamplingSource>),
    Histogram(Arc<dyn SamplingSource>),
    Meter(Arc<dyn CounterSource>),
}

impl MetricSource {
    pub fn counter(source: impl CounterSource + 'static) -> Self {
        MetricSource::Counter(Arc::new(source))
    }

    pub fn gauge(source: impl GaugeSource + 'static) -> Self {
        MetricSource::Gauge(Arc::new(source))
    }

    pub fn timer(source: impl SamplingSource + 'static) -> Self {
        MetricSource::Timer(Arc::new(source))
    }

    pub fn histogram(source: impl SamplingSource + 'static) -> Self {
        MetricSource::Histogram(Arc::new(source))
    }

    pub fn meter(source: impl CounterSource + 'static) -> Self {
        MetricSource::Meter(Arc::new(source))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            MetricSource::Counter(_) => "counter",
            MetricSource::Gauge(_) => "gauge",
            MetricSource::Timer(_) => "timer",
            MetricSource::Histogram(_) => "histogram",
            MetricSource::Meter(_) => "meter",
        }
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::debug;

use super::{MetricsCollector, SnapshotBuilders};
use crate::registry::ExpositionRegistry;
use crate::report::Reporter;
use crate::types::{
    CounterDataPoint, GaugeDataPoint, InfoDataPoint, MetricSnapshot, MetricSource, MetricValue,
    Quantile, SamplingSource, SummaryDataPoint,
};

/// Fixed quantile ladder computed for every timer and histogram at each
/// collection pass.
const QUANTILES: [f64; 6] = [0.50, 0.75, 0.95, 0.98, 0.99, 0.999];

/// Collector for the legacy-style (broker) metrics subsystem.
///
/// Conversion policy:
/// - counter -> counter data point with the raw count
/// - numeric gauge -> gauge data point, widened to f64
/// - non-numeric gauge -> info data point keyed by the attribute name
/// - timer / histogram -> summary data point with count, sum and the
///   quantile ladder read through the source's own estimator
/// - meter -> counter data point with the cumulative count, rates are
///   not exported
pub struct ServerCollector {
    reporters: Mutex<Vec<Arc<Reporter>>>,
    registered: AtomicBool,
}

impl ServerCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(ServerCollector {
            reporters: Mutex::new(Vec::new()),
            registered: AtomicBool::new(false),
        })
    }

    /// Bind this collector to the process-wide registry, exactly once.
    /// Returns whether this call performed the binding.
    pub fn register(self: &Arc<Self>, registry: &ExpositionRegistry) -> bool {
        if self
            .registered
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            registry.add_collector(self.clone());
            true
        } else {
            false
        }
    }

    pub fn add_reporter(&self, reporter: Arc<Reporter>) {
        self.reporters.lock().unwrap().push(reporter);
    }

    pub fn remove_reporter(&self, reporter: &Arc<Reporter>) {
        self.reporters
            .lock()
            .unwrap()
            .retain(|r| !Arc::ptr_eq(r, reporter));
    }
}

fn quantiles(sampling: &dyn SamplingSource) -> Vec<Quantile> {
    QUANTILES
        .iter()
        .map(|&q| Quantile {
            quantile: q,
            value: sampling.quantile(q),
        })
        .collect()
}

impl MetricsCollector for ServerCollector {
    fn collect(&self) -> Vec<MetricSnapshot> {
        let reporters = self.reporters.lock().unwrap().clone();
        let mut builders = SnapshotBuilders::default();
        for reporter in &reporters {
            for wrapper in reporter.allowed_metrics() {
                debug!(
                    "collecting server metric {} with labels: {}",
                    wrapper.name(),
                    wrapper.labels()
                );
                let labels = wrapper.labels().clone();
                match wrapper.source() {
                    MetricSource::Counter(counter) => builders.push_counter(
                        wrapper.name_arc(),
                        CounterDataPoint {
                            labels,
                            value: counter.count(),
                        },
                    ),
                    MetricSource::Gauge(gauge) => match gauge.value() {
                        MetricValue::Text(value) => builders.push_info(
                            wrapper.name_arc(),
                            InfoDataPoint {
                                labels,
                                attribute: wrapper.attribute_arc(),
                                value,
                            },
                        ),
                        numeric => builders.push_gauge(
                            wrapper.name_arc(),
                            GaugeDataPoint {
                                labels,
                                value: numeric.as_f64().unwrap_or_default(),
                            },
                        ),
                    },
                    MetricSource::Timer(sampling) | MetricSource::Histogram(sampling) => builders
                        .push_summary(
                            wrapper.name_arc(),
                            SummaryDataPoint {
                                labels,
                                count: sampling.count(),
                                sum: sampling.sum(),
                                quantiles: quantiles(sampling.as_ref()),
                            },
                        ),
                    MetricSource::Meter(meter) => builders.push_counter(
                        wrapper.name_arc(),
                        CounterDataPoint {
                            labels,
                            value: meter.count(),
                        },
                    ),
                }
            }
        }
        builders.build()
    }
}

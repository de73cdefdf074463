/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use log::{debug, warn};

use super::{MetricsCollector, SnapshotBuilders};
use crate::registry::ExpositionRegistry;
use crate::report::Reporter;
use crate::types::{GaugeDataPoint, InfoDataPoint, MetricSnapshot, MetricSource, MetricValue};

/// Collector for the client-style metrics subsystem.
///
/// Client metrics expose a single polled value per metric: numbers become
/// gauge data points, anything else becomes an info data point whose label
/// key is the metric's attribute name.
pub struct ClientCollector {
    reporters: Mutex<Vec<Arc<Reporter>>>,
    registered: AtomicBool,
}

impl ClientCollector {
    pub fn new() -> Arc<Self> {
        Arc::new(ClientCollector {
            reporters: Mutex::new(Vec::new()),
            registered: AtomicBool::new(false),
        })
    }

    /// Bind this collector to the process-wide registry.
    ///
    /// First caller wins; the compare-and-set keeps the binding
    /// exactly-once even under concurrent first-time callers. Returns
    /// whether this call performed the binding.
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

impl MetricsCollector for ClientCollector {
    fn collect(&self) -> Vec<MetricSnapshot> {
        let reporters = self.reporters.lock().unwrap().clone();
        let mut builders = SnapshotBuilders::default();
        for reporter in &reporters {
            for wrapper in reporter.allowed_metrics() {
                debug!(
                    "collecting client metric {} with labels: {}",
                    wrapper.name(),
                    wrapper.labels()
                );
                let MetricSource::Gauge(gauge) = wrapper.source() else {
                    warn!(
                        "client metric {} has unexpected kind {}",
                        wrapper.name(),
                        wrapper.source().kind()
                    );
                    continue;
                };
                match gauge.value() {
                    MetricValue::Text(value) => builders.push_info(
                        wrapper.name_arc(),
                        InfoDataPoint {
                            labels: wrapper.labels().clone(),
                            attribute: wrapper.attribute_arc(),
                            value,
                        },
                    ),
                    numeric => {
                        // as_f64 is total for the non-text variants
                        let value = numeric.as_f64().unwrap_or_default();
                        builders.push_gauge(
                            wrapper.name_arc(),
                            GaugeDataPoint {
                                labels: wrapper.labels().clone(),
                                value,
                            },
                        );
                    }
                }
            }
        }
        builders.build()
    }
}

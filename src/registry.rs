/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::{Arc, Mutex};

use crate::collect::MetricsCollector;
use crate::types::MetricSnapshot;

/// Process-wide set of collectors, pulled by the exposition server on
/// each scrape.
///
/// Owned by the process composition root and handed to the components
/// that need it; there is no hidden global instance.
#[derive(Default)]
pub struct ExpositionRegistry {
    collectors: Mutex<Vec<Arc<dyn MetricsCollector>>>,
}

impl ExpositionRegistry {
    pub fn add_collector(&self, collector: Arc<dyn MetricsCollector>) {
        self.collectors.lock().unwrap().push(collector);
    }

    pub fn collector_count(&self) -> usize {
        self.collectors.lock().unwrap().len()
    }

    /// Run one collection pass over every registered collector.
    ///
    /// Sampling is not atomic across metrics or collectors; each scrape
    /// observes a point-in-time view per metric.
    pub fn collect(&self) -> Vec<MetricSnapshot> {
        let collectors = self.collectors.lock().unwrap().clone();
        let mut snapshots = Vec::new();
        for collector in &collectors {
            snapshots.extend(collector.collect());
        }
        snapshots
    }
}

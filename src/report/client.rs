/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::Arc;

use log::debug;

use super::Reporter;
use crate::collect::ClientCollector;
use crate::config::ReporterConfig;
use crate::exposition::{ExpositionServer, acquire_server, release_server};
use crate::registry::ExpositionRegistry;
use crate::types::{Labels, MetricSource, sanitize_metric_name};
use crate::wrapper::{MetricId, MetricWrapper};

/// Integration adapter for the client-style metrics subsystem.
///
/// Turns the subsystem's native registration callbacks into calls on the
/// shared [`Reporter`] contract. Client hosts have no dynamic
/// reconfiguration, so the reporter is not reconfigurable and drops
/// non-admitted metrics instead of retaining them.
pub struct ClientMetricsReporter {
    config: ReporterConfig,
    reporter: Arc<Reporter>,
    collector: Arc<ClientCollector>,
    server: Option<Arc<ExpositionServer>>,
    prefix: Option<String>,
}

impl ClientMetricsReporter {
    /// Wire a client reporter into the composition root's collector and
    /// registry. The collector is bound to the registry on first use;
    /// the scrape server starts here when the listener is enabled.
    pub fn new(
        config: ReporterConfig,
        collector: Arc<ClientCollector>,
        registry: Arc<ExpositionRegistry>,
    ) -> anyhow::Result<Self> {
        collector.register(&registry);
        let reporter = Arc::new(Reporter::new(config.allowlist().clone(), false));
        collector.add_reporter(reporter.clone());
        let server = if config.listener_enabled() {
            Some(acquire_server(config.listener(), registry)?)
        } else {
            None
        };
        debug!("client metrics reporter configured with {config}");
        Ok(ClientMetricsReporter {
            config,
            reporter,
            collector,
            server,
            prefix: None,
        })
    }

    /// Namespace prefix delivered by the host's metrics context; applied
    /// to metrics registered afterwards.
    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = Some(sanitize_metric_name(None, prefix));
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

    /// The actually bound scrape port, when the listener is enabled.
    pub fn port(&self) -> Option<u16> {
        self.server.as_ref().map(|s| s.port())
    }

    /// Fire-and-forget registration event from a producer thread.
    pub fn notify_metric_registered(
        &self,
        id: MetricId,
        raw_name: &str,
        labels: Labels,
        source: MetricSource,
        attribute: &str,
    ) {
        let wrapper = MetricWrapper::named(
            self.prefix.as_deref(),
            raw_name,
            labels,
            source,
            attribute,
        );
        self.reporter.add_metric(id, Arc::new(wrapper));
    }

    /// Fire-and-forget removal event from a producer thread.
    pub fn notify_metric_removed(&self, id: &MetricId) {
        self.reporter.remove_metric(id);
    }

    /// Detach from the collector and release the scrape server.
    pub fn close(&mut self) {
        self.collector.remove_reporter(&self.reporter);
        if let Some(server) = self.server.take() {
            release_server(server);
        }
    }
}

impl Drop for ClientMetricsReporter {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collect::MetricsCollector;
    use crate::config::{ALLOWLIST_CONFIG, LISTENER_ENABLE_CONFIG};
    use crate::types::MetricValue;
    use std::collections::HashMap;

    fn config(entries: &[(&str, &str)]) -> ReporterConfig {
        let mut props: HashMap<String, String> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        props.insert(LISTENER_ENABLE_CONFIG.to_string(), "false".to_string());
        ReporterConfig::parse(&props).unwrap()
    }

    #[test]
    fn registration_flows_to_collector() {
        let registry = Arc::new(ExpositionRegistry::default());
        let collector = ClientCollector::new();
        let mut reporter =
            ClientMetricsReporter::new(config(&[]), collector.clone(), registry.clone()).unwrap();
        reporter.set_prefix("kafka.consumer");

        reporter.notify_metric_registered(
            "m1".into(),
            "records-consumed-total",
            Labels::new(),
            MetricSource::gauge(|| MetricValue::Double(12.0)),
            "records-consumed-total",
        );

        let snapshots = registry.collect();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].name(), "kafka_consumer_records_consumed_total");

        reporter.notify_metric_removed(&"m1".into());
        assert!(registry.collect().is_empty());
    }

    #[test]
    fn allowlist_drops_without_retention() {
        let registry = Arc::new(ExpositionRegistry::default());
        let collector = ClientCollector::new();
        let reporter = ClientMetricsReporter::new(
            config(&[(ALLOWLIST_CONFIG, "kafka_producer.*")]),
            collector,
            registry,
        )
        .unwrap();

        reporter.notify_metric_registered(
            "m1".into(),
            "records-consumed-total",
            Labels::new(),
            MetricSource::gauge(|| MetricValue::Double(1.0)),
            "records-consumed-total",
        );
        assert!(reporter.reporter().allowed_metrics().is_empty());
        assert!(!reporter.reporter().is_reconfigurable());
    }

    #[test]
    fn close_detaches_reporter() {
        let registry = Arc::new(ExpositionRegistry::default());
        let collector = ClientCollector::new();
        let mut reporter =
            ClientMetricsReporter::new(config(&[]), collector.clone(), registry).unwrap();
        reporter.notify_metric_registered(
            "m1".into(),
            "name",
            Labels::new(),
            MetricSource::gauge(|| MetricValue::Double(1.0)),
            "name",
        );
        assert_eq!(collector.collect().len(), 1);

        reporter.close();
        assert!(collector.collect().is_empty());
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info};

use super::Reporter;
use crate::collect::ServerCollector;
use crate::config::{ConfigError, ReporterConfig};
use crate::exposition::{ExpositionServer, acquire_server, release_server};
use crate::registry::ExpositionRegistry;
use crate::types::{Labels, MetricSource, sanitize_metric_name};
use crate::wrapper::{MetricId, MetricWrapper};

/// Integration adapter for the legacy-style (broker) metrics subsystem.
///
/// Broker hosts support dynamic reconfiguration of the allowlist, so the
/// underlying reporter is reconfigurable: filtered-out metrics stay in the
/// held partition and can be re-admitted without re-registration.
pub struct ServerMetricsReporter {
    config: ReporterConfig,
    reporter: Arc<Reporter>,
    collector: Arc<ServerCollector>,
    server: Option<Arc<ExpositionServer>>,
    prefix: Option<String>,
}

impl ServerMetricsReporter {
    pub fn new(
        config: ReporterConfig,
        collector: Arc<ServerCollector>,
        registry: Arc<ExpositionRegistry>,
    ) -> anyhow::Result<Self> {
        collector.register(&registry);
        let reporter = Arc::new(Reporter::new(config.allowlist().clone(), true));
        collector.add_reporter(reporter.clone());
        let server = if config.listener_enabled() {
            Some(acquire_server(config.listener(), registry)?)
        } else {
            None
        };
        debug!("server metrics reporter configured with {config}");
        Ok(ServerMetricsReporter {
            config,
            reporter,
            collector,
            server,
            prefix: None,
        })
    }

    pub fn set_prefix(&mut self, prefix: &str) {
        self.prefix = Some(sanitize_metric_name(None, prefix));
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn reporter(&self) -> &Arc<Reporter> {
        &self.reporter
    }

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

    /// Apply an updated allowlist delivered as a full replacement
    /// properties map, then reclassify every retained metric.
    pub fn reconfigure(&self, props: &HashMap<String, String>) -> Result<(), ConfigError> {
        let allowlist = ReporterConfig::parse_allowlist(props)?;
        info!("updated allowlist to {allowlist}");
        self.reporter.update_allowlist(allowlist);
        Ok(())
    }

    /// Validate a candidate reconfiguration without applying it.
    pub fn validate_reconfiguration(props: &HashMap<String, String>) -> Result<(), ConfigError> {
        ReporterConfig::parse_allowlist(props).map(|_| ())
    }

    /// Detach from the collector and release the scrape server.
    pub fn close(&mut self) {
        self.collector.remove_reporter(&self.reporter);
        if let Some(server) = self.server.take() {
            release_server(server);
        }
    }
}

impl Drop for ServerMetricsReporter {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ALLOWLIST_CONFIG, LISTENER_ENABLE_CONFIG};

    fn config(entries: &[(&str, &str)]) -> ReporterConfig {
        let mut props: HashMap<String, String> = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        props.insert(LISTENER_ENABLE_CONFIG.to_string(), "false".to_string());
        ReporterConfig::parse(&props).unwrap()
    }

    fn props(entries: &[(&str, &str)]) -> HashMap<String, String> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn reconfigure_readmits_held_metrics() {
        let registry = Arc::new(ExpositionRegistry::default());
        let collector = ServerCollector::new();
        let reporter = ServerMetricsReporter::new(
            config(&[(ALLOWLIST_CONFIG, "kafka_server.*")]),
            collector,
            registry.clone(),
        )
        .unwrap();

        reporter.notify_metric_registered(
            "m1".into(),
            "kafka_network_requests",
            Labels::new(),
            MetricSource::counter(|| 2u64),
            "requests",
        );
        assert!(registry.collect().is_empty());
        assert!(reporter.reporter().is_reconfigurable());

        reporter
            .reconfigure(&props(&[(ALLOWLIST_CONFIG, "kafka_network.*")]))
            .unwrap();
        let snapshots = registry.collect();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].name(), "kafka_network_requests");
    }

    #[test]
    fn reconfigure_rejects_bad_pattern() {
        let registry = Arc::new(ExpositionRegistry::default());
        let collector = ServerCollector::new();
        let reporter =
            ServerMetricsReporter::new(config(&[]), collector, registry).unwrap();

        let err = reporter
            .reconfigure(&props(&[(ALLOWLIST_CONFIG, "hell[o,s]world")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidAllowlist { .. }));
        // the previous filter stays published
        assert!(reporter.reporter().filter().matches("anything"));
    }

    #[test]
    fn validate_without_applying() {
        assert!(ServerMetricsReporter::validate_reconfiguration(&props(&[(
            ALLOWLIST_CONFIG,
            "kafka_server.*"
        )]))
        .is_ok());
        assert!(ServerMetricsReporter::validate_reconfiguration(&props(&[(
            ALLOWLIST_CONFIG,
            "hell[o,s]world"
        )]))
        .is_err());
    }

    #[test]
    fn prefix_applies_to_new_registrations() {
        let registry = Arc::new(ExpositionRegistry::default());
        let collector = ServerCollector::new();
        let mut reporter =
            ServerMetricsReporter::new(config(&[]), collector, registry.clone()).unwrap();
        reporter.set_prefix("kafka.server");

        reporter.notify_metric_registered(
            "m1".into(),
            "BrokerTopicMetrics.MessagesInPerSec",
            Labels::new(),
            MetricSource::meter(|| 7u64),
            "MessagesInPerSec",
        );
        let snapshots = registry.collect();
        assert_eq!(
            snapshots[0].name(),
            "kafka_server_brokertopicmetrics_messagesinpersec"
        );
        assert_eq!(snapshots[0].data_point_count(), 1);
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::Arc;

use ahash::AHashMap;
use log::warn;

use crate::types::{
    CounterDataPoint, GaugeDataPoint, InfoDataPoint, MetricSnapshot, SummaryDataPoint,
};

enum SnapshotBuilder {
    Counter(Vec<CounterDataPoint>),
    Gauge(Vec<GaugeDataPoint>),
    Summary(Vec<SummaryDataPoint>),
    Info(Vec<InfoDataPoint>),
}

impl SnapshotBuilder {
    fn kind(&self) -> &'static str {
        match self {
            SnapshotBuilder::Counter(_) => "counter",
            SnapshotBuilder::Gauge(_) => "gauge",
            SnapshotBuilder::Summary(_) => "summary",
            SnapshotBuilder::Info(_) => "info",
        }
    }

    fn build(self, name: Arc<str>) -> MetricSnapshot {
        match self {
            SnapshotBuilder::Counter(data) => MetricSnapshot::Counter { name, data },
            SnapshotBuilder::Gauge(data) => MetricSnapshot::Gauge { name, data },
            SnapshotBuilder::Summary(data) => MetricSnapshot::Summary { name, data },
            SnapshotBuilder::Info(data) => MetricSnapshot::Info { name, data },
        }
    }
}

/// Per-pass grouping of data points by output metric name.
///
/// The first data point under a name decides the snapshot kind. Two
/// source metrics sanitizing to the same output name but different kinds
/// is a producer misconfiguration; later points of a clashing kind are
/// dropped with a warning so one bad pair cannot abort the pass.
#[derive(Default)]
pub(crate) struct SnapshotBuilders {
    inner: AHashMap<Arc<str>, SnapshotBuilder>,
}

impl SnapshotBuilders {
    pub(crate) fn push_counter(&mut self, name: Arc<str>, point: CounterDataPoint) {
        match self
            .inner
            .entry(name)
            .or_insert_with(|| SnapshotBuilder::Counter(Vec::new()))
        {
            SnapshotBuilder::Counter(data) => data.push(point),
            other => warn_kind_clash("counter", other.kind()),
        }
    }

    pub(crate) fn push_gauge(&mut self, name: Arc<str>, point: GaugeDataPoint) {
        match self
            .inner
            .entry(name)
            .or_insert_with(|| SnapshotBuilder::Gauge(Vec::new()))
        {
            SnapshotBuilder::Gauge(data) => data.push(point),
            other => warn_kind_clash("gauge", other.kind()),
        }
    }

    pub(crate) fn push_summary(&mut self, name: Arc<str>, point: SummaryDataPoint) {
        match self
            .inner
            .entry(name)
            .or_insert_with(|| SnapshotBuilder::Summary(Vec::new()))
        {
            SnapshotBuilder::Summary(data) => data.push(point),
            other => warn_kind_clash("summary", other.kind()),
        }
    }

    pub(crate) fn push_info(&mut self, name: Arc<str>, point: InfoDataPoint) {
        match self
            .inner
            .entry(name)
            .or_insert_with(|| SnapshotBuilder::Info(Vec::new()))
        {
            SnapshotBuilder::Info(data) => data.push(point),
            other => warn_kind_clash("info", other.kind()),
        }
    }

    pub(crate) fn build(self) -> Vec<MetricSnapshot> {
        self.inner
            .into_iter()
            .map(|(name, builder)| builder.build(name))
            .collect()
    }
}

fn warn_kind_clash(incoming: &'static str, existing: &'static str) {
    warn!("dropping {incoming} data point: metric name already collected as {existing}");
}

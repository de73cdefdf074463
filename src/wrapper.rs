/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::fmt;
use std::sync::Arc;

use crate::types::{Labels, MetricSource, sanitize_metric_name};

/// Opaque, producer-defined key distinguishing one metric instance.
///
/// Only ever used as a map key, never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricId(Arc<str>);

impl MetricId {
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        MetricId(id.into())
    }
}

impl From<&str> for MetricId {
    fn from(id: &str) -> Self {
        MetricId::new(id)
    }
}

impl From<String> for MetricId {
    fn from(id: String) -> Self {
        MetricId::new(id)
    }
}

impl fmt::Display for MetricId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Canonical record for one registered metric.
///
/// Created once at registration, immutable afterwards. The only mutable
/// state is the producer-owned value behind [`MetricSource`], which is
/// re-read on every collection pass.
#[derive(Clone)]
pub struct MetricWrapper {
    name: Arc<str>,
    labels: Labels,
    source: MetricSource,
    attribute: Arc<str>,
}

impl MetricWrapper {
    /// Build a wrapper with a precomputed output name.
    ///
    /// `attribute` is the metric's short name, used as the label key when
    /// a non-numeric value is exported as an info data point.
    pub fn new(
        name: impl Into<Arc<str>>,
        labels: Labels,
        source: MetricSource,
        attribute: &str,
    ) -> Self {
        MetricWrapper {
            name: name.into(),
            labels,
            source,
            attribute: Arc::from(attribute),
        }
    }

    /// Build a wrapper, deriving the output name from a namespace prefix
    /// and the raw producer-side name.
    pub fn named(
        prefix: Option<&str>,
        raw_name: &str,
        labels: Labels,
        source: MetricSource,
        attribute: &str,
    ) -> Self {
        MetricWrapper::new(
            sanitize_metric_name(prefix, raw_name),
            labels,
            source,
            attribute,
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn name_arc(&self) -> Arc<str> {
        self.name.clone()
    }

    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    pub fn source(&self) -> &MetricSource {
        &self.source
    }

    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    pub(crate) fn attribute_arc(&self) -> Arc<str> {
        self.attribute.clone()
    }
}

impl fmt::Debug for MetricWrapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricWrapper")
            .field("name", &self.name)
            .field("labels", &self.labels)
            .field("kind", &self.source.kind())
            .field("attribute", &self.attribute)
            .finish()
    }
}

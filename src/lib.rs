/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

//! Expose runtime metrics from a messaging client or broker process through
//! a Prometheus pull endpoint.
//!
//! Metrics arrive from two independently-evolving producer subsystems as
//! registration/removal events. Each metric is wrapped into a canonical
//! record, classified against a runtime-swappable allowlist, and the
//! admitted set is converted into typed snapshots on every scrape.

pub mod collect;
pub mod config;
pub mod exposition;
pub mod filter;
pub mod registry;
pub mod report;
pub mod types;
pub mod wrapper;

pub use collect::{ClientCollector, MetricsCollector, ServerCollector};
pub use config::{ConfigError, ReporterConfig};
pub use filter::AllowlistFilter;
pub use registry::ExpositionRegistry;
pub use report::{ClientMetricsReporter, Reporter, ServerMetricsReporter};
pub use wrapper::{MetricId, MetricWrapper};

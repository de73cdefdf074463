/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use crate::types::MetricSnapshot;

mod builder;
pub(crate) use builder::SnapshotBuilders;

mod client;
pub use client::ClientCollector;

mod server;
pub use server::ServerCollector;

/// One collection pass over a producer subsystem.
///
/// Implementations aggregate the admitted metrics of their bound reporters
/// into typed snapshots, sampling every value through its live accessor.
pub trait MetricsCollector: Send + Sync {
    fn collect(&self) -> Vec<MetricSnapshot>;
}

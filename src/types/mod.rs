/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

mod name;
pub use name::{sanitize_label_name, sanitize_metric_name};

mod value;
pub use value::MetricValue;

mod labels;
pub use labels::Labels;

mod source;
pub use source::{CounterSource, GaugeSource, MetricSource, SamplingSource};

mod snapshot;
pub use snapshot::{
    CounterDataPoint, GaugeDataPoint, InfoDataPoint, MetricSnapshot, Quantile, SummaryDataPoint,
};

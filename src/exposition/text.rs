/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::Arc;

use crate::types::{Labels, MetricSnapshot};

/// Serialize snapshots into the Prometheus text exposition format
/// (version 0.0.4).
///
/// Snapshot values are already exposition-legal (sanitized names, UTF-8
/// label values); this encoder only handles layout and label escaping.
pub fn encode_text(snapshots: &[MetricSnapshot]) -> String {
    let mut out = String::with_capacity(snapshots.len() * 64);
    for snapshot in snapshots {
        match snapshot {
            MetricSnapshot::Counter { name, data } => {
                push_type_line(&mut out, name, "counter");
                for point in data {
                    out.push_str(name);
                    push_labels(&mut out, &point.labels, &[]);
                    out.push(' ');
                    out.push_str(itoa::Buffer::new().format(point.value));
                    out.push('\n');
                }
            }
            MetricSnapshot::Gauge { name, data } => {
                push_type_line(&mut out, name, "gauge");
                for point in data {
                    out.push_str(name);
                    push_labels(&mut out, &point.labels, &[]);
                    out.push(' ');
                    push_f64(&mut out, point.value);
                    out.push('\n');
                }
            }
            MetricSnapshot::Summary { name, data } => {
                push_type_line(&mut out, name, "summary");
                for point in data {
                    for quantile in &point.quantiles {
                        let q = ryu::Buffer::new().format(quantile.quantile).to_string();
                        out.push_str(name);
                        push_labels(&mut out, &point.labels, &[("quantile", q.as_str())]);
                        out.push(' ');
                        push_f64(&mut out, quantile.value);
                        out.push('\n');
                    }
                    out.push_str(name);
                    out.push_str("_count");
                    push_labels(&mut out, &point.labels, &[]);
                    out.push(' ');
                    out.push_str(itoa::Buffer::new().format(point.count));
                    out.push('\n');
                    out.push_str(name);
                    out.push_str("_sum");
                    push_labels(&mut out, &point.labels, &[]);
                    out.push(' ');
                    push_f64(&mut out, point.sum);
                    out.push('\n');
                }
            }
            MetricSnapshot::Info { name, data } => {
                let info_name = info_series_name(name);
                push_type_line(&mut out, &info_name, "gauge");
                for point in data {
                    out.push_str(&info_name);
                    push_labels(
                        &mut out,
                        &point.labels,
                        &[(point.attribute.as_ref(), point.value.as_str())],
                    );
                    out.push_str(" 1\n");
                }
            }
        }
    }
    out
}

fn info_series_name(name: &Arc<str>) -> String {
    if name.ends_with("_info") {
        name.to_string()
    } else {
        format!("{name}_info")
    }
}

fn push_type_line(out: &mut String, name: &str, kind: &str) {
    out.push_str("# TYPE ");
    out.push_str(name);
    out.push(' ');
    out.push_str(kind);
    out.push('\n');
}

fn push_f64(out: &mut String, value: f64) {
    if value.is_finite() {
        out.push_str(ryu::Buffer::new().format(value));
    } else if value.is_nan() {
        out.push_str("NaN");
    } else if value > 0.0 {
        out.push_str("+Inf");
    } else {
        out.push_str("-Inf");
    }
}

fn push_labels(out: &mut String, labels: &Labels, extra: &[(&str, &str)]) {
    if labels.is_empty() && extra.is_empty() {
        return;
    }
    out.push('{');
    let mut first = true;
    for (name, value) in labels.iter().chain(extra.iter().copied()) {
        if !first {
            out.push(',');
        }
        first = false;
        out.push_str(name);
        out.push_str("=\"");
        push_escaped(out, value);
        out.push('"');
    }
    out.push('}');
}

fn push_escaped(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
}

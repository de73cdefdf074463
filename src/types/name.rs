/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

/// Map a raw metric identifier into a valid Prometheus metric name.
///
/// The raw name is lowercased, every byte outside `[a-z0-9_]` is replaced
/// with `_`, and the optional namespace prefix is joined with `_`. The
/// function is total and idempotent: sanitizing an already-sanitized name
/// with the same prefix returns it unchanged, so the prefix is never
/// applied twice.
pub fn sanitize_metric_name(prefix: Option<&str>, raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + prefix.map_or(0, |p| p.len() + 1));
    if let Some(prefix) = prefix
        && !prefix.is_empty()
    {
        push_sanitized(&mut out, prefix);
        out.push('_');
        if raw.starts_with(out.as_str()) {
            out.clear();
        }
    }
    push_sanitized(&mut out, raw);
    out
}

/// Map a raw tag key into a valid Prometheus label name.
///
/// Label names keep their case. Bytes outside `[a-zA-Z0-9_]` are replaced
/// with `_` and a leading digit gets a `_` prepended.
pub fn sanitize_label_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len() + 1);
    if raw.as_bytes().first().is_some_and(u8::is_ascii_digit) {
        out.push('_');
    }
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    out
}

fn push_sanitized(out: &mut String, part: &str) {
    for c in part.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' {
            out.push(c);
        } else if c.is_ascii_uppercase() {
            out.push(c.to_ascii_lowercase());
        } else {
            out.push('_');
        }
    }
}

/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::collections::BTreeMap;
use std::fmt;

use super::sanitize_label_name;

/// Label set attached to one metric: unique keys, sorted order.
///
/// Keys are passed through [`sanitize_label_name`] on insertion so the set
/// always holds exposition-legal names. Insertion order is irrelevant.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Labels {
    inner: BTreeMap<String, String>,
}

impl Labels {
    pub fn new() -> Self {
        Labels::default()
    }

    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.inner.insert(sanitize_label_name(name), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.inner.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Labels {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut labels = Labels::new();
        for (k, v) in iter {
            labels.insert(k.as_ref(), v);
        }
        labels
    }
}

impl fmt::Display for Labels {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut iter = self.inner.iter();
        let Some((name, value)) = iter.next() else {
            return Ok(());
        };
        f.write_str(name)?;
        f.write_str(": ")?;
        f.write_str(value)?;
        for (name, value) in iter {
            f.write_str(", ")?;
            f.write_str(name)?;
            f.write_str(": ")?;
            f.write_str(value)?;
        }
        Ok(())
    }
}

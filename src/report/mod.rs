/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 the prom-metrics-reporter authors.
 */

use std::sync::{Arc, Mutex};

use ahash::AHashMap;
use arc_swap::ArcSwap;
use log::trace;

use crate::filter::AllowlistFilter;
use crate::wrapper::{MetricId, MetricWrapper};

mod client;
pub use client::ClientMetricsReporter;

mod server;
pub use server::ServerMetricsReporter;

/// Membership and partitioning engine for one producer subsystem.
///
/// Every registered metric lives in exactly one of two partitions:
/// `admitted` (the current allowlist matches its output name) or `held`
/// (it does not, but the reporter is reconfigurable and retains it for
/// future re-admission). Non-reconfigurable reporters drop non-admitted
/// metrics instead of holding them, trading re-admission for memory.
///
/// All operations synchronize internally; producer threads, the scrape
/// thread and the configuration thread never coordinate with each other.
pub struct Reporter {
    filter: ArcSwap<AllowlistFilter>,
    admitted: Mutex<AHashMap<MetricId, Arc<MetricWrapper>>>,
    held: Mutex<AHashMap<MetricId, Arc<MetricWrapper>>>,
    reconfigurable: bool,
}

impl Reporter {
    pub fn new(filter: AllowlistFilter, reconfigurable: bool) -> Self {
        Reporter {
            filter: ArcSwap::from_pointee(filter),
            admitted: Mutex::new(AHashMap::new()),
            held: Mutex::new(AHashMap::new()),
            reconfigurable,
        }
    }

    pub fn is_reconfigurable(&self) -> bool {
        self.reconfigurable
    }

    /// The currently published filter.
    pub fn filter(&self) -> Arc<AllowlistFilter> {
        self.filter.load_full()
    }

    /// Atomically publish a new filter. Existing partition contents are
    /// left untouched until [`Reporter::reclassify`] runs; metrics added
    /// concurrently are classified against whichever filter they observe
    /// and converge on the next reclassify.
    pub fn swap_filter(&self, filter: AllowlistFilter) {
        self.filter.store(Arc::new(filter));
    }

    /// Publish a new filter and reclassify in one call.
    pub fn update_allowlist(&self, filter: AllowlistFilter) {
        self.swap_filter(filter);
        self.reclassify();
    }

    /// Register a metric, placing it in the partition dictated by the
    /// current filter. Re-registering an identity replaces its wrapper and
    /// clears any stale entry in the other partition.
    pub fn add_metric(&self, id: MetricId, wrapper: Arc<MetricWrapper>) {
        if self.filter.load().matches(wrapper.name()) {
            self.admitted.lock().unwrap().insert(id.clone(), wrapper);
            if self.reconfigurable {
                self.held.lock().unwrap().remove(&id);
            }
        } else {
            trace!(
                "ignoring metric {} as it does not match the allowlist",
                wrapper.name()
            );
            if self.reconfigurable {
                self.held.lock().unwrap().insert(id.clone(), wrapper);
                self.admitted.lock().unwrap().remove(&id);
            }
        }
    }

    /// Unregister a metric from both partitions. Removing an absent
    /// identity is a no-op.
    pub fn remove_metric(&self, id: &MetricId) {
        self.admitted.lock().unwrap().remove(id);
        self.held.lock().unwrap().remove(id);
    }

    /// Point-in-time view of the admitted partition.
    ///
    /// Safe to call while adds, removes and reclassifies proceed on other
    /// threads; the view may miss metrics added or include metrics removed
    /// during the same pass.
    pub fn allowed_metrics(&self) -> Vec<Arc<MetricWrapper>> {
        self.admitted.lock().unwrap().values().cloned().collect()
    }

    /// Re-evaluate every retained metric against the current filter,
    /// moving entries between partitions as needed. No-op for
    /// non-reconfigurable reporters.
    ///
    /// Each move inserts into the target partition before removing from
    /// the source one, so a concurrent [`Reporter::allowed_metrics`]
    /// caller never sees a moving metric absent from both partitions for
    /// longer than one map operation.
    pub fn reclassify(&self) {
        if !self.reconfigurable {
            return;
        }
        let filter = self.filter.load_full();

        let promoted: Vec<(MetricId, Arc<MetricWrapper>)> = {
            let held = self.held.lock().unwrap();
            held.iter()
                .filter(|(_, w)| filter.matches(w.name()))
                .map(|(id, w)| (id.clone(), w.clone()))
                .collect()
        };
        for (id, wrapper) in promoted {
            self.admitted.lock().unwrap().insert(id.clone(), wrapper);
            self.held.lock().unwrap().remove(&id);
        }

        let demoted: Vec<(MetricId, Arc<MetricWrapper>)> = {
            let admitted = self.admitted.lock().unwrap();
            admitted
                .iter()
                .filter(|(_, w)| !filter.matches(w.name()))
                .map(|(id, w)| (id.clone(), w.clone()))
                .collect()
        };
        for (id, wrapper) in demoted {
            self.held.lock().unwrap().insert(id.clone(), wrapper);
            self.admitted.lock().unwrap().remove(&id);
        }
    }

    #[cfg(test)]
    fn held_metrics(&self) -> Vec<Arc<MetricWrapper>> {
        self.held.lock().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Labels, MetricSource, MetricValue};

    fn gauge_wrapper(name: &str) -> Arc<MetricWrapper> {
        Arc::new(MetricWrapper::new(
            name,
            Labels::new(),
            MetricSource::gauge(|| MetricValue::Signed(0)),
            name,
        ))
    }

    fn names(wrappers: &[Arc<MetricWrapper>]) -> Vec<&str> {
        let mut names: Vec<&str> = wrappers.iter().map(|w| w.name()).collect();
        names.sort_unstable();
        names
    }

    #[test]
    fn partitions_on_add() {
        let reporter = Reporter::new(AllowlistFilter::compile("a.*").unwrap(), true);
        reporter.add_metric("a1".into(), gauge_wrapper("a_metric"));
        reporter.add_metric("b1".into(), gauge_wrapper("b_metric"));

        assert_eq!(names(&reporter.allowed_metrics()), ["a_metric"]);
        assert_eq!(names(&reporter.held_metrics()), ["b_metric"]);
    }

    #[test]
    fn non_reconfigurable_drops() {
        let reporter = Reporter::new(AllowlistFilter::compile("a.*").unwrap(), false);
        reporter.add_metric("b1".into(), gauge_wrapper("b_metric"));

        assert!(reporter.allowed_metrics().is_empty());
        assert!(reporter.held_metrics().is_empty());

        // filter is static, so reclassify has nothing to do
        reporter.reclassify();
        assert!(reporter.allowed_metrics().is_empty());
    }

    #[test]
    fn remove_is_total_and_idempotent() {
        let reporter = Reporter::new(AllowlistFilter::compile("a.*").unwrap(), true);
        reporter.add_metric("a1".into(), gauge_wrapper("a_metric"));
        reporter.add_metric("b1".into(), gauge_wrapper("b_metric"));

        reporter.remove_metric(&"a1".into());
        reporter.remove_metric(&"b1".into());
        reporter.remove_metric(&"absent".into());

        assert!(reporter.allowed_metrics().is_empty());
        assert!(reporter.held_metrics().is_empty());
    }

    #[test]
    fn reclassify_moves_both_ways() {
        let reporter = Reporter::new(AllowlistFilter::match_all(), true);
        reporter.add_metric("a1".into(), gauge_wrapper("a_metric"));
        reporter.add_metric("b1".into(), gauge_wrapper("b_metric"));
        assert_eq!(names(&reporter.allowed_metrics()), ["a_metric", "b_metric"]);

        reporter.update_allowlist(AllowlistFilter::compile("b.*").unwrap());
        assert_eq!(names(&reporter.allowed_metrics()), ["b_metric"]);
        assert_eq!(names(&reporter.held_metrics()), ["a_metric"]);

        reporter.update_allowlist(AllowlistFilter::compile("a.*").unwrap());
        assert_eq!(names(&reporter.allowed_metrics()), ["a_metric"]);
        assert_eq!(names(&reporter.held_metrics()), ["b_metric"]);
    }

    #[test]
    fn reclassify_is_idempotent() {
        let reporter = Reporter::new(AllowlistFilter::match_all(), true);
        reporter.add_metric("a1".into(), gauge_wrapper("a_metric"));
        reporter.add_metric("b1".into(), gauge_wrapper("b_metric"));

        reporter.swap_filter(AllowlistFilter::compile("b.*").unwrap());
        reporter.reclassify();
        let allowed = reporter.allowed_metrics();
        let first_allowed = names(&allowed);
        let held = reporter.held_metrics();
        let first_held = names(&held);

        reporter.reclassify();
        assert_eq!(names(&reporter.allowed_metrics()), first_allowed);
        assert_eq!(names(&reporter.held_metrics()), first_held);
    }

    #[test]
    fn partition_exclusivity_after_readd() {
        let reporter = Reporter::new(AllowlistFilter::match_all(), true);
        reporter.add_metric("m".into(), gauge_wrapper("metric"));

        // demote without reclassify, then re-add: the stale held entry
        // must not survive next to the admitted one
        reporter.swap_filter(AllowlistFilter::compile("other.*").unwrap());
        reporter.add_metric("m".into(), gauge_wrapper("metric"));
        assert!(reporter.allowed_metrics().is_empty());
        assert_eq!(reporter.held_metrics().len(), 1);

        reporter.swap_filter(AllowlistFilter::match_all());
        reporter.add_metric("m".into(), gauge_wrapper("metric"));
        assert_eq!(reporter.allowed_metrics().len(), 1);
        assert!(reporter.held_metrics().is_empty());
    }

    #[test]
    fn concurrent_adds_and_reclassify() {
        use std::thread;

        let reporter = Arc::new(Reporter::new(AllowlistFilter::match_all(), true));
        let mut handles = Vec::new();
        for t in 0..4 {
            let reporter = reporter.clone();
            handles.push(thread::spawn(move || {
                for i in 0..250 {
                    let id = format!("t{t}_m{i}");
                    reporter.add_metric(id.as_str().into(), gauge_wrapper(&format!("metric_{t}_{i}")));
                    if i % 3 == 0 {
                        reporter.remove_metric(&id.as_str().into());
                    }
                }
            }));
        }
        let flipper = {
            let reporter = reporter.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    let filter = if i % 2 == 0 {
                        AllowlistFilter::compile("metric_[01].*").unwrap()
                    } else {
                        AllowlistFilter::match_all()
                    };
                    reporter.update_allowlist(filter);
                }
            })
        };
        for handle in handles {
            handle.join().unwrap();
        }
        flipper.join().unwrap();

        // converge on a final filter and check the partition invariant
        reporter.update_allowlist(AllowlistFilter::compile("metric_[01].*").unwrap());
        reporter.reclassify();
        for wrapper in reporter.allowed_metrics() {
            assert!(wrapper.name().starts_with("metric_0") || wrapper.name().starts_with("metric_1"));
        }
        for wrapper in reporter.held_metrics() {
            assert!(wrapper.name().starts_with("metric_2") || wrapper.name().starts_with("metric_3"));
        }
    }
}

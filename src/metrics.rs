//! Metrics collection for mapping resolution performance.

use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

use crate::id::Id;
use crate::observer::EngineObserver;

/// Per-mapping timing statistics.
#[derive(Debug, Clone)]
pub struct TimingStats {
    pub count: u64,
    pub min_duration: Duration,
    pub max_duration: Duration,
    pub total_duration: Duration,
}

impl TimingStats {
    fn new() -> Self {
        Self { count: 0, min_duration: Duration::MAX, max_duration: Duration::ZERO, total_duration: Duration::ZERO }
    }

    fn record(&mut self, duration: Duration) {
        self.count += 1;
        self.min_duration = self.min_duration.min(duration);
        self.max_duration = self.max_duration.max(duration);
        self.total_duration += duration;
    }

    pub fn average_duration(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.count as u32
        }
    }
}

/// Collects recomputation timing and failure counts across every mapping,
/// as an [`EngineObserver`] that can be registered alongside (or instead of)
/// a [`crate::observer::LoggingObserver`].
#[derive(Debug, Default)]
pub struct EngineMetrics {
    timings: RwLock<HashMap<Id, TimingStats>>,
    recompute_count: Mutex<u64>,
    failure_count: Mutex<u64>,
}

impl EngineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn timing_stats(&self, id: &Id) -> Option<TimingStats> {
        self.timings.read().expect("metrics timings poisoned").get(id).cloned()
    }

    pub fn recompute_count(&self) -> u64 {
        *self.recompute_count.lock().expect("metrics counter poisoned")
    }

    pub fn failure_count(&self) -> u64 {
        *self.failure_count.lock().expect("metrics counter poisoned")
    }

    pub fn slowest_mappings(&self, limit: usize) -> Vec<(Id, Duration)> {
        let timings = self.timings.read().expect("metrics timings poisoned");
        let mut entries: Vec<_> = timings.iter().map(|(id, stats)| (id.clone(), stats.average_duration())).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1));
        entries.truncate(limit);
        entries
    }

    /// Renders accumulated metrics in Prometheus text exposition format.
    pub fn export_prometheus(&self) -> String {
        let mut out = String::new();
        out.push_str("# HELP confmap_engine_recomputations_total Total mapping recomputations\n");
        out.push_str("# TYPE confmap_engine_recomputations_total counter\n");
        out.push_str(&format!("confmap_engine_recomputations_total {}\n\n", self.recompute_count()));

        out.push_str("# HELP confmap_engine_recompute_failures_total Recomputations that left a mapping unresolved\n");
        out.push_str("# TYPE confmap_engine_recompute_failures_total counter\n");
        out.push_str(&format!("confmap_engine_recompute_failures_total {}\n\n", self.failure_count()));

        out.push_str("# HELP confmap_engine_recompute_duration_seconds Time spent recomputing a mapping\n");
        out.push_str("# TYPE confmap_engine_recompute_duration_seconds histogram\n");
        for (id, stats) in self.timings.read().expect("metrics timings poisoned").iter() {
            out.push_str(&format!(
                "confmap_engine_recompute_duration_seconds_sum{{mapping=\"{id}\"}} {}\n\
                 confmap_engine_recompute_duration_seconds_count{{mapping=\"{id}\"}} {}\n",
                stats.total_duration.as_secs_f64(),
                stats.count,
            ));
        }
        out
    }
}

impl EngineObserver for EngineMetrics {
    fn recomputing(&self, _id: &Id) {}

    fn recomputed(&self, id: &Id, duration: Duration) {
        *self.recompute_count.lock().expect("metrics counter poisoned") += 1;
        self.timings
            .write()
            .expect("metrics timings poisoned")
            .entry(id.clone())
            .or_insert_with(TimingStats::new)
            .record(duration);
    }

    fn recompute_failed(&self, _id: &Id, _message: &str) {
        *self.failure_count.lock().expect("metrics counter poisoned") += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_timings_are_queryable_per_mapping() {
        let metrics = EngineMetrics::new();
        metrics.recomputed(&Id::new("ldap"), Duration::from_millis(10));
        metrics.recomputed(&Id::new("ldap"), Duration::from_millis(30));

        let stats = metrics.timing_stats(&Id::new("ldap")).unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.average_duration(), Duration::from_millis(20));
        assert_eq!(metrics.recompute_count(), 2);
    }

    #[test]
    fn failures_are_counted_independently_of_timings() {
        let metrics = EngineMetrics::new();
        metrics.recompute_failed(&Id::new("ldap"), "unavailable");
        assert_eq!(metrics.failure_count(), 1);
        assert_eq!(metrics.recompute_count(), 0);
    }

    #[test]
    fn prometheus_export_includes_counters() {
        let metrics = EngineMetrics::new();
        metrics.recomputed(&Id::new("ldap"), Duration::from_millis(5));
        let text = metrics.export_prometheus();
        assert!(text.contains("confmap_engine_recomputations_total 1"));
        assert!(text.contains("mapping=\"ldap\""));
    }
}

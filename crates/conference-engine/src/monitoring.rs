//! Metrics
//!
//! Components receive a [`MetricsSink`] at construction instead of touching
//! process-wide counters. [`CounterMetrics`] is the default sink: labelled monotonic
//! counters with a snapshot for the `/v1/metrics` endpoint.

use dashmap::DashMap;
use serde::Serialize;

pub const CONFERENCE_CREATE_TOTAL: &str = "conference_create_total";
pub const CONFERENCE_CLOSE_TOTAL: &str = "conference_close_total";
pub const CONFERENCE_JOIN_TOTAL: &str = "conference_join_total";
pub const CONFERENCE_LEAVE_TOTAL: &str = "conference_leave_total";
pub const ARI_EVENT_TOTAL: &str = "ari_event_total";

pub trait MetricsSink: Send + Sync {
    /// Increment counter `name` for `label` by one
    fn increment(&self, name: &'static str, label: &str);
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CounterSample {
    pub name: String,
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Default)]
pub struct CounterMetrics {
    counters: DashMap<(&'static str, String), u64>,
}

impl CounterMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &'static str, label: &str) -> u64 {
        self.counters
            .get(&(name, label.to_string()))
            .map(|v| *v)
            .unwrap_or(0)
    }

    /// Sum of a counter over all labels
    pub fn total(&self, name: &str) -> u64 {
        self.counters
            .iter()
            .filter(|entry| entry.key().0 == name)
            .map(|entry| *entry.value())
            .sum()
    }

    /// All counters, sorted by name then label
    pub fn snapshot(&self) -> Vec<CounterSample> {
        let mut samples: Vec<CounterSample> = self
            .counters
            .iter()
            .map(|entry| CounterSample {
                name: entry.key().0.to_string(),
                label: entry.key().1.clone(),
                value: *entry.value(),
            })
            .collect();
        samples.sort_by(|a, b| (&a.name, &a.label).cmp(&(&b.name, &b.label)));
        samples
    }
}

impl MetricsSink for CounterMetrics {
    fn increment(&self, name: &'static str, label: &str) {
        *self.counters.entry((name, label.to_string())).or_insert(0) += 1;
    }
}

//! Bounded in-memory request timing buffer.

use std::collections::{BTreeMap, VecDeque};

use parking_lot::Mutex;

use crate::model::{EndpointSummary, PerformanceSample};

/// Default number of samples retained.
pub const DEFAULT_METRICS_CAPACITY: usize = 1000;

/// Rolling window of [`PerformanceSample`]s with FIFO eviction.
///
/// Shared behind an `Arc`; all methods take `&self`.
#[derive(Debug)]
pub struct MetricsAggregator {
    samples: Mutex<VecDeque<PerformanceSample>>,
    capacity: usize,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new(DEFAULT_METRICS_CAPACITY)
    }
}

impl MetricsAggregator {
    /// A zero capacity is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self { samples: Mutex::new(VecDeque::with_capacity(capacity)), capacity }
    }

    pub fn record(&self, sample: PerformanceSample) {
        tracing::info!(
            method = %sample.method,
            path = %sample.path,
            duration_ms = sample.duration_ms,
            status = sample.status_code,
            "request completed"
        );

        let mut samples = self.samples.lock();
        while samples.len() >= self.capacity {
            samples.pop_front();
        }
        samples.push_back(sample);
    }

    /// Per-endpoint aggregates over the retained window, keyed by `METHOD path`.
    pub fn summarize(&self) -> BTreeMap<String, EndpointSummary> {
        let samples = self.samples.lock();
        let mut grouped: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for sample in samples.iter() {
            grouped.entry(sample.endpoint_key()).or_default().push(sample.duration_ms);
        }
        drop(samples);

        grouped
            .into_iter()
            .map(|(key, durations)| {
                let count = durations.len();
                let total: f64 = durations.iter().sum();
                let min = durations.iter().copied().fold(f64::INFINITY, f64::min);
                let max = durations.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let summary = EndpointSummary {
                    count,
                    avg_duration: total / count as f64,
                    min_duration: min,
                    max_duration: max,
                };
                (key, summary)
            })
            .collect()
    }

    /// Retained samples, oldest first.
    pub fn samples(&self) -> Vec<PerformanceSample> {
        self.samples.lock().iter().cloned().collect()
    }

    /// Retained samples for the optional path and method, oldest first.
    pub fn samples_matching(&self, path: Option<&str>, method: Option<&str>) -> Vec<PerformanceSample> {
        self.samples.lock().iter().filter(|s| sample_matches(s, path, method)).cloned().collect()
    }

    /// Mean duration of samples matching the optional path and method; 0 when none match.
    pub fn average_duration(&self, path: Option<&str>, method: Option<&str>) -> f64 {
        let samples = self.samples.lock();
        let (total, count) = samples
            .iter()
            .filter(|s| sample_matches(s, path, method))
            .fold((0.0, 0usize), |(total, count), s| (total + s.duration_ms, count + 1));

        if count == 0 { 0.0 } else { total / count as f64 }
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

fn sample_matches(sample: &PerformanceSample, path: Option<&str>, method: Option<&str>) -> bool {
    path.is_none_or(|p| sample.path == p) && method.is_none_or(|m| sample.method == m)
}

//! Per-request timing.
//!
//! Every inbound request records exactly one [`PerformanceSample`]: either
//! through [`RequestTimer::finish`] or, if the timer is dropped unfinished
//! (error unwinding, cancelled future), as a 500.

use std::sync::Arc;
use std::time::Instant;

use docent_core::{MetricsAggregator, PerformanceSample};

pub const STATUS_OK: u16 = 200;
pub const STATUS_ERROR: u16 = 500;

/// Guard that records one sample when finished or dropped.
pub struct RequestTimer {
    metrics: Arc<MetricsAggregator>,
    method: String,
    path: String,
    started: Instant,
    recorded: bool,
}

impl RequestTimer {
    pub fn start(metrics: Arc<MetricsAggregator>, method: impl Into<String>, path: impl Into<String>) -> Self {
        Self { metrics, method: method.into(), path: path.into(), started: Instant::now(), recorded: false }
    }

    pub fn finish(mut self, status_code: u16) {
        self.record(status_code);
    }

    fn record(&mut self, status_code: u16) {
        if self.recorded {
            return;
        }
        self.recorded = true;

        let duration_ms = self.started.elapsed().as_secs_f64() * 1000.0;
        let sample =
            PerformanceSample::new(std::mem::take(&mut self.method), std::mem::take(&mut self.path), duration_ms, status_code);
        self.metrics.record(sample);
    }
}

impl Drop for RequestTimer {
    fn drop(&mut self) {
        self.record(STATUS_ERROR);
    }
}

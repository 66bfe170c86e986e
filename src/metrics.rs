//! Request and conversion counters for operational visibility.

use std::fmt::Write;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use crate::core::Origin;

/// Upper bounds (seconds) of the latency histogram buckets.
pub const LATENCY_BUCKETS: [f64; 10] = [0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0];

/// Gateway metrics. Owned by the application state and shared by reference.
pub struct Metrics {
    /// Total requests handled, `/metrics` excluded.
    pub requests_total: AtomicU64,
    /// Per-bucket (non-cumulative) latency counts; the last slot is `+Inf`.
    latency_buckets: [AtomicU64; LATENCY_BUCKETS.len() + 1],
    latency_sum_micros: AtomicU64,
    pub conversions_live: AtomicU64,
    pub conversions_fallback: AtomicU64,
    pub conversions_unavailable: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            requests_total: AtomicU64::new(0),
            latency_buckets: std::array::from_fn(|_| AtomicU64::new(0)),
            latency_sum_micros: AtomicU64::new(0),
            conversions_live: AtomicU64::new(0),
            conversions_fallback: AtomicU64::new(0),
            conversions_unavailable: AtomicU64::new(0),
        }
    }

    /// Record one handled request and its latency.
    pub fn observe_request(&self, elapsed: Duration) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let seconds = elapsed.as_secs_f64();
        let slot = LATENCY_BUCKETS
            .iter()
            .position(|bound| seconds <= *bound)
            .unwrap_or(LATENCY_BUCKETS.len());
        self.latency_buckets[slot].fetch_add(1, Ordering::Relaxed);
        self.latency_sum_micros
            .fetch_add(elapsed.as_micros() as u64, Ordering::Relaxed);
    }

    pub fn conversion(&self, origin: Origin) {
        let counter = match origin {
            Origin::Live => &self.conversions_live,
            Origin::Fallback => &self.conversions_fallback,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn conversion_unavailable(&self) {
        self.conversions_unavailable.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_total: self.requests_total.load(Ordering::Relaxed),
            latency_buckets: std::array::from_fn(|i| {
                self.latency_buckets[i].load(Ordering::Relaxed)
            }),
            latency_sum_seconds: self.latency_sum_micros.load(Ordering::Relaxed) as f64
                / 1_000_000.0,
            conversions_live: self.conversions_live.load(Ordering::Relaxed),
            conversions_fallback: self.conversions_fallback.load(Ordering::Relaxed),
            conversions_unavailable: self.conversions_unavailable.load(Ordering::Relaxed),
        }
    }

    /// Export metrics in Prometheus text format.
    pub fn to_prometheus(&self) -> String {
        let snapshot = self.snapshot();
        let mut out = String::new();

        let _ = writeln!(out, "# HELP app_requests_total Total HTTP requests");
        let _ = writeln!(out, "# TYPE app_requests_total counter");
        let _ = writeln!(out, "app_requests_total {}", snapshot.requests_total);
        out.push('\n');

        let _ = writeln!(
            out,
            "# HELP app_request_latency_seconds Request latency seconds"
        );
        let _ = writeln!(out, "# TYPE app_request_latency_seconds histogram");
        let mut cumulative = 0;
        for (bound, count) in LATENCY_BUCKETS.iter().zip(snapshot.latency_buckets.iter()) {
            cumulative += count;
            let _ = writeln!(
                out,
                "app_request_latency_seconds_bucket{{le=\"{bound}\"}} {cumulative}"
            );
        }
        let _ = writeln!(
            out,
            "app_request_latency_seconds_bucket{{le=\"+Inf\"}} {}",
            snapshot.requests_observed()
        );
        let _ = writeln!(
            out,
            "app_request_latency_seconds_sum {}",
            snapshot.latency_sum_seconds
        );
        let _ = writeln!(
            out,
            "app_request_latency_seconds_count {}",
            snapshot.requests_observed()
        );
        out.push('\n');

        let _ = writeln!(
            out,
            "# HELP app_conversions_total Successful conversions by rate source"
        );
        let _ = writeln!(out, "# TYPE app_conversions_total counter");
        let _ = writeln!(
            out,
            "app_conversions_total{{source=\"live\"}} {}",
            snapshot.conversions_live
        );
        let _ = writeln!(
            out,
            "app_conversions_total{{source=\"fallback\"}} {}",
            snapshot.conversions_fallback
        );
        out.push('\n');

        let _ = writeln!(
            out,
            "# HELP app_conversions_unavailable_total Conversions with no rate available"
        );
        let _ = writeln!(out, "# TYPE app_conversions_unavailable_total counter");
        let _ = writeln!(
            out,
            "app_conversions_unavailable_total {}",
            snapshot.conversions_unavailable
        );
        out
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub latency_buckets: [u64; LATENCY_BUCKETS.len() + 1],
    pub latency_sum_seconds: f64,
    pub conversions_live: u64,
    pub conversions_fallback: u64,
    pub conversions_unavailable: u64,
}

impl MetricsSnapshot {
    pub fn requests_observed(&self) -> u64 {
        self.latency_buckets.iter().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_observation() {
        let metrics = Metrics::new();
        metrics.observe_request(Duration::from_millis(1));
        metrics.observe_request(Duration::from_millis(30));
        metrics.observe_request(Duration::from_secs(10));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.requests_total, 3);
        assert_eq!(snapshot.requests_observed(), 3);
        assert_eq!(snapshot.latency_buckets[0], 1);
        assert_eq!(snapshot.latency_buckets[3], 1);
        assert_eq!(snapshot.latency_buckets[LATENCY_BUCKETS.len()], 1);
        assert!((snapshot.latency_sum_seconds - 10.031).abs() < 1e-9);
    }

    #[test]
    fn test_conversion_counters() {
        let metrics = Metrics::new();
        metrics.conversion(Origin::Live);
        metrics.conversion(Origin::Fallback);
        metrics.conversion(Origin::Fallback);
        metrics.conversion_unavailable();

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.conversions_live, 1);
        assert_eq!(snapshot.conversions_fallback, 2);
        assert_eq!(snapshot.conversions_unavailable, 1);
    }

    #[test]
    fn test_prometheus_export() {
        let metrics = Metrics::new();
        metrics.observe_request(Duration::from_millis(20));
        metrics.conversion(Origin::Fallback);

        let text = metrics.to_prometheus();
        assert!(text.contains("# TYPE app_requests_total counter"));
        assert!(text.contains("app_requests_total 1"));
        assert!(text.contains("app_request_latency_seconds_bucket{le=\"0.01\"} 0"));
        assert!(text.contains("app_request_latency_seconds_bucket{le=\"0.025\"} 1"));
        assert!(text.contains("app_request_latency_seconds_bucket{le=\"+Inf\"} 1"));
        assert!(text.contains("app_request_latency_seconds_count 1"));
        assert!(text.contains("app_conversions_total{source=\"fallback\"} 1"));
        assert!(text.contains("app_conversions_total{source=\"live\"} 0"));
        assert!(text.contains("app_conversions_unavailable_total 0"));
    }
}

use chrono::Utc;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Serialize)]
pub struct EstimationSnapshot {
    pub timestamp: String,
    pub uptime_secs: u64,
    pub quotes: QuoteMetrics,
    pub failures: FailureMetrics,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuoteMetrics {
    pub total: u64,
    pub estimated: u64,
    pub fallback: u64,
    pub fallback_rate: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct FailureMetrics {
    pub price_suggestion: u64,
    pub limit_estimation: u64,
}

/// Counters for fee estimation outcomes.
///
/// A limit-estimation failure that fell back is counted both as a failure and
/// as a fallback quote.
#[derive(Debug)]
pub struct EstimationStats {
    estimated: AtomicU64,
    fallback: AtomicU64,
    price_failures: AtomicU64,
    limit_failures: AtomicU64,
    start_time: Instant,
}

impl Default for EstimationStats {
    fn default() -> Self {
        Self {
            estimated: AtomicU64::new(0),
            fallback: AtomicU64::new(0),
            price_failures: AtomicU64::new(0),
            limit_failures: AtomicU64::new(0),
            start_time: Instant::now(),
        }
    }
}

impl EstimationStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_estimated(&self) {
        self.estimated.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_fallback(&self) {
        self.fallback.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_price_failure(&self) {
        self.price_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_limit_failure(&self) {
        self.limit_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn estimated(&self) -> u64 {
        self.estimated.load(Ordering::Relaxed)
    }

    pub fn fallback(&self) -> u64 {
        self.fallback.load(Ordering::Relaxed)
    }

    pub fn price_failures(&self) -> u64 {
        self.price_failures.load(Ordering::Relaxed)
    }

    pub fn limit_failures(&self) -> u64 {
        self.limit_failures.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn snapshot(&self) -> EstimationSnapshot {
        let estimated = self.estimated();
        let fallback = self.fallback();
        let total = estimated + fallback;

        EstimationSnapshot {
            timestamp: Utc::now().to_rfc3339(),
            uptime_secs: self.uptime().as_secs(),
            quotes: QuoteMetrics {
                total,
                estimated,
                fallback,
                fallback_rate: if total > 0 {
                    fallback as f64 / total as f64 * 100.0
                } else {
                    0.0
                },
            },
            failures: FailureMetrics {
                price_suggestion: self.price_failures(),
                limit_estimation: self.limit_failures(),
            },
        }
    }

    pub fn to_json(&self) -> String {
        let snapshot = self.snapshot();
        serde_json::to_string_pretty(&snapshot).unwrap_or_else(|_| "{}".to_string())
    }
}

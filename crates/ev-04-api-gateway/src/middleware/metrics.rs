//! Request and election counters, served as JSON on `/metrics`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Gateway metrics
#[derive(Default)]
pub struct GatewayMetrics {
    // Request counters
    pub requests_total: AtomicU64,
    pub requests_success: AtomicU64,
    pub requests_client_error: AtomicU64,
    pub requests_server_error: AtomicU64,

    // Rate limit counters
    pub rate_limit_rejected: AtomicU64,

    // OTP flow
    pub otp_issued: AtomicU64,
    pub otp_verified: AtomicU64,
    pub otp_rejected: AtomicU64,

    // Voting
    pub votes_cast: AtomicU64,
    pub votes_rejected: AtomicU64,
    pub integrity_events: AtomicU64,

    // Latency tracking
    pub total_latency_ms: AtomicU64,
}

impl GatewayMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a finished request by status code
    pub fn record_request(&self, status: u16, latency_ms: u64) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        let counter = match status {
            500.. => &self.requests_server_error,
            400.. => &self.requests_client_error,
            _ => &self.requests_success,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn record_rate_limit_rejection(&self) {
        self.rate_limit_rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_otp_issued(&self) {
        self.otp_issued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_otp_verification(&self, success: bool) {
        let counter = if success {
            &self.otp_verified
        } else {
            &self.otp_rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_vote(&self, success: bool) {
        let counter = if success {
            &self.votes_cast
        } else {
            &self.votes_rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_integrity_event(&self) {
        self.integrity_events.fetch_add(1, Ordering::Relaxed);
    }

    /// Get average latency in ms
    pub fn average_latency_ms(&self) -> f64 {
        let total = self.total_latency_ms.load(Ordering::Relaxed);
        let count = self.requests_total.load(Ordering::Relaxed);
        if count == 0 {
            0.0
        } else {
            total as f64 / count as f64
        }
    }

    /// Export metrics as JSON
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "requests": {
                "total": self.requests_total.load(Ordering::Relaxed),
                "success": self.requests_success.load(Ordering::Relaxed),
                "client_error": self.requests_client_error.load(Ordering::Relaxed),
                "server_error": self.requests_server_error.load(Ordering::Relaxed),
            },
            "rate_limiting": {
                "rejected": self.rate_limit_rejected.load(Ordering::Relaxed),
            },
            "otp": {
                "issued": self.otp_issued.load(Ordering::Relaxed),
                "verified": self.otp_verified.load(Ordering::Relaxed),
                "rejected": self.otp_rejected.load(Ordering::Relaxed),
            },
            "votes": {
                "cast": self.votes_cast.load(Ordering::Relaxed),
                "rejected": self.votes_rejected.load(Ordering::Relaxed),
                "integrity_events": self.integrity_events.load(Ordering::Relaxed),
            },
            "latency": {
                "average_ms": self.average_latency_ms(),
            }
        })
    }
}

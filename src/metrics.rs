// Copyright 2025 Memophor Labs
// SPDX-License-Identifier: Apache-2.0

//! Prometheus metrics collection for the Rentloop client.
//!
//! Tracks API round-trips and landing-page cache effectiveness.

use anyhow::{anyhow, Result};
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts, Registry};
use std::sync::Arc;

/// Metrics collector shared by the client and the loader
#[derive(Clone)]
pub struct ClientMetrics {
    pub registry: Arc<Registry>,

    // Request metrics
    pub requests_total: IntCounter,
    pub request_failures: IntCounterVec,
    pub request_duration: Histogram,
    pub uploads_total: IntCounter,

    // Cache metrics
    pub cache_hits: IntCounter,
    pub cache_misses: IntCounter,
    pub deduplicated_fetches: IntCounter,
}

impl ClientMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();

        let requests_total = IntCounter::with_opts(Opts::new(
            "rentloop_api_requests_total",
            "Total number of API requests issued",
        ))
        .map_err(|e| anyhow!("Failed to create metric: {}", e))?;

        let request_failures = IntCounterVec::new(
            Opts::new(
                "rentloop_api_request_failures_total",
                "Total number of API requests that failed, by error kind",
            ),
            &["kind"],
        )
        .map_err(|e| anyhow!("Failed to create metric: {}", e))?;

        let request_duration = Histogram::with_opts(
            HistogramOpts::new(
                "rentloop_api_request_duration_seconds",
                "API round-trip duration in seconds",
            )
            .buckets(vec![
                0.010, 0.025, 0.050, 0.100, 0.250, 0.500, 1.0, 2.5, 5.0, 15.0, 60.0, 120.0,
            ]),
        )
        .map_err(|e| anyhow!("Failed to create metric: {}", e))?;

        let uploads_total = IntCounter::with_opts(Opts::new(
            "rentloop_api_uploads_total",
            "Total number of multipart uploads issued",
        ))
        .map_err(|e| anyhow!("Failed to create metric: {}", e))?;

        let cache_hits = IntCounter::with_opts(Opts::new(
            "rentloop_cache_hits_total",
            "Total number of fresh cache hits",
        ))
        .map_err(|e| anyhow!("Failed to create metric: {}", e))?;

        let cache_misses = IntCounter::with_opts(Opts::new(
            "rentloop_cache_misses_total",
            "Total number of cache misses that went to the network",
        ))
        .map_err(|e| anyhow!("Failed to create metric: {}", e))?;

        let deduplicated_fetches = IntCounter::with_opts(Opts::new(
            "rentloop_cache_deduplicated_total",
            "Total number of fetches that joined an in-flight request",
        ))
        .map_err(|e| anyhow!("Failed to create metric: {}", e))?;

        registry
            .register(Box::new(requests_total.clone()))
            .map_err(|e| anyhow!("Failed to register metric: {}", e))?;
        registry
            .register(Box::new(request_failures.clone()))
            .map_err(|e| anyhow!("Failed to register metric: {}", e))?;
        registry
            .register(Box::new(request_duration.clone()))
            .map_err(|e| anyhow!("Failed to register metric: {}", e))?;
        registry
            .register(Box::new(uploads_total.clone()))
            .map_err(|e| anyhow!("Failed to register metric: {}", e))?;
        registry
            .register(Box::new(cache_hits.clone()))
            .map_err(|e| anyhow!("Failed to register metric: {}", e))?;
        registry
            .register(Box::new(cache_misses.clone()))
            .map_err(|e| anyhow!("Failed to register metric: {}", e))?;
        registry
            .register(Box::new(deduplicated_fetches.clone()))
            .map_err(|e| anyhow!("Failed to register metric: {}", e))?;

        Ok(Self {
            registry: Arc::new(registry),
            requests_total,
            request_failures,
            request_duration,
            uploads_total,
            cache_hits,
            cache_misses,
            deduplicated_fetches,
        })
    }

    /// Record an outgoing request
    pub fn record_request(&self) {
        self.requests_total.inc();
    }

    /// Record an outgoing multipart upload
    pub fn record_upload(&self) {
        self.uploads_total.inc();
    }

    /// Record a failed request by error kind
    pub fn record_failure(&self, kind: &str) {
        self.request_failures.with_label_values(&[kind]).inc();
    }

    /// Observe round-trip latency in seconds
    pub fn record_latency(&self, seconds: f64) {
        self.request_duration.observe(seconds);
    }

    pub fn record_cache_hit(&self) {
        self.cache_hits.inc();
    }

    pub fn record_cache_miss(&self) {
        self.cache_misses.inc();
    }

    pub fn record_deduplicated(&self) {
        self.deduplicated_fetches.inc();
    }

    /// Export metrics in Prometheus format
    pub fn export(&self) -> Result<String> {
        use prometheus::Encoder;

        let encoder = prometheus::TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();

        encoder
            .encode(&metric_families, &mut buffer)
            .map_err(|e| anyhow!("Failed to encode metrics: {}", e))?;

        String::from_utf8(buffer).map_err(|e| anyhow!("Failed to convert metrics to string: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_includes_recorded_values() {
        let metrics = ClientMetrics::new().unwrap();
        metrics.record_request();
        metrics.record_failure("timeout");
        metrics.record_cache_hit();

        let text = metrics.export().unwrap();
        assert!(text.contains("rentloop_api_requests_total 1"));
        assert!(text.contains("rentloop_api_request_failures_total{kind=\"timeout\"} 1"));
        assert!(text.contains("rentloop_cache_hits_total 1"));
    }
}

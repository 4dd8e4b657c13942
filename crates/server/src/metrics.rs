//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the conversion server:
//! - HTTP request metrics (latency, counts, errors)
//! - Upload sizes
//! - Backend lane status (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};
use tracing::error;

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hwpdf_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hwpdf_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hwpdf_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Uploaded document sizes by format.
pub static UPLOAD_SIZE_BYTES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new("hwpdf_upload_size_bytes", "Size of uploaded documents").buckets(
            vec![
                16_384.0,
                65_536.0,
                262_144.0,
                1_048_576.0,
                4_194_304.0,
                16_777_216.0,
                52_428_800.0,
            ],
        ),
        &["format"],
    )
    .unwrap()
});

// =============================================================================
// Lane Metrics (collected dynamically)
// =============================================================================

/// Backend lane running state (1 = accepting jobs, 0 = closed).
pub static LANE_RUNNING: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hwpdf_lane_running",
        "Whether the backend lane accepts jobs (1) or is closed (0)",
    )
    .unwrap()
});

/// Backend lane active jobs.
pub static LANE_ACTIVE: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new("hwpdf_lane_active", "Number of jobs running on the backend lane").unwrap()
});

/// Backend lane queued jobs.
pub static LANE_QUEUED: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "hwpdf_lane_queued",
        "Number of jobs waiting for the backend lane",
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(UPLOAD_SIZE_BYTES.clone()))
        .unwrap();

    // Lane
    registry.register(Box::new(LANE_RUNNING.clone())).unwrap();
    registry.register(Box::new(LANE_ACTIVE.clone())).unwrap();
    registry.register(Box::new(LANE_QUEUED.clone())).unwrap();

    // Core metrics (orchestrator, backend, bridge, artifacts)
    for metric in hwpdf_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Collect dynamic metrics from current application state.
///
/// This is called before encoding metrics to update gauges with current values
/// from the backend lane.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    if let Some(status) = state.lane_status() {
        LANE_RUNNING.set(if status.running { 1 } else { 0 });
        LANE_ACTIVE.set(status.active_jobs as i64);
        LANE_QUEUED.set(status.queued_jobs as i64);
    }
}

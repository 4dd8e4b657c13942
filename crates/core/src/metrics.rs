//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Conversion orchestration (outcomes by strategy, duration)
//! - The rendering backend (invocations)
//! - The format bridge (invocations)
//! - Artifact cleanup

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Orchestrator Metrics
// =============================================================================

/// Conversions total by result and the strategy that produced the outcome.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("hwpdf_conversions_total", "Total document conversions"),
        &["result", "strategy"], // result: "success", "failed"; strategy: "direct", "sibling", "bridged", "none"
    )
    .unwrap()
});

/// Conversion duration in seconds, including retries and bridging.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "hwpdf_conversion_duration_seconds",
            "Duration of document conversions",
        )
        .buckets(vec![0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0]),
        &["result"],
    )
    .unwrap()
});

/// Backend attempts per conversion.
pub static CONVERSION_ATTEMPTS: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "hwpdf_conversion_attempts",
            "Number of backend attempts per conversion",
        )
        .buckets(vec![1.0, 2.0, 3.0]),
    )
    .unwrap()
});

// =============================================================================
// Backend Metrics
// =============================================================================

/// Backend invocations total by result.
pub static BACKEND_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hwpdf_backend_invocations_total",
            "Total rendering backend invocations",
        ),
        &["result"], // "success", "failure"
    )
    .unwrap()
});

// =============================================================================
// Bridge Metrics
// =============================================================================

/// Bridge invocations total by result.
pub static BRIDGE_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "hwpdf_bridge_invocations_total",
            "Total HWP to HWPX bridge invocations",
        ),
        &["result"], // "success", "failure", "misconfigured"
    )
    .unwrap()
});

// =============================================================================
// Artifact Metrics
// =============================================================================

/// Temporary files that could not be deleted.
pub static CLEANUP_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "hwpdf_cleanup_failures_total",
        "Total temporary artifacts that could not be deleted",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Orchestrator
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSION_ATTEMPTS.clone()),
        // Backend
        Box::new(BACKEND_INVOCATIONS.clone()),
        // Bridge
        Box::new(BRIDGE_INVOCATIONS.clone()),
        // Artifacts
        Box::new(CLEANUP_FAILURES.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::core::Collector;

    #[test]
    fn test_conversion_attempts_has_no_labels() {
        let before = CONVERSION_ATTEMPTS.get_sample_count();
        CONVERSION_ATTEMPTS.observe(2.0);
        assert!(CONVERSION_ATTEMPTS.get_sample_count() > before);

        let families = CONVERSION_ATTEMPTS.collect();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].get_name(), "hwpdf_conversion_attempts");
        assert!(families[0].get_metric()[0].get_label().is_empty());
    }
}

//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Filter invocations (results, durations)
//! - Track outcomes and tracks in flight

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Filter Metrics
// =============================================================================

/// Filter invocations total by result.
pub static FILTER_INVOCATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "trackfilter_filter_invocations_total",
            "Total filter invocations",
        ),
        &["result"], // "kept", "dropped", or an error kind
    )
    .unwrap()
});

/// Filter invocation duration in seconds.
pub static FILTER_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "trackfilter_filter_duration_seconds",
            "Duration of a single filter invocation",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["result"],
    )
    .unwrap()
});

// =============================================================================
// Track Metrics
// =============================================================================

/// Track outcomes total.
pub static TRACK_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("trackfilter_track_outcomes_total", "Total track outcomes"),
        &["outcome"], // "kept", "dropped", "failed"
    )
    .unwrap()
});

/// Tracks currently running through a chain.
pub static TRACKS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "trackfilter_tracks_in_flight",
        "Number of tracks currently running through a filter chain",
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(FILTER_INVOCATIONS.clone()),
        Box::new(FILTER_DURATION.clone()),
        Box::new(TRACK_OUTCOMES.clone()),
        Box::new(TRACKS_IN_FLIGHT.clone()),
    ]
}

//! Metrics definitions for the room coordinator.
//!
//! All metrics follow Prometheus naming conventions:
//! - `room_` prefix
//! - `_total` suffix for counters

use metrics::{counter, gauge};

/// Record a finished join attempt.
///
/// Metric: `room_joins_total`
/// Labels: `outcome` (success, `token_fetch_failed`, `connect_failed`,
/// superseded, `shutting_down`, internal)
pub fn record_join(outcome: &'static str) {
    counter!("room_joins_total", "outcome" => outcome).increment(1);
}

/// Record a remote video track that could not be shown because every remote
/// surface was occupied.
///
/// Metric: `room_remote_tracks_dropped_total`
pub fn record_remote_track_dropped() {
    counter!("room_remote_tracks_dropped_total").increment(1);
}

/// Record local track discovery running out of attempts.
///
/// Metric: `room_local_video_unavailable_total`
pub fn record_local_video_unavailable() {
    counter!("room_local_video_unavailable_total").increment(1);
}

/// Record a renderer refusing to attach a track.
///
/// Metric: `room_renderer_attach_failures_total`
pub fn record_renderer_attach_failure() {
    counter!("room_renderer_attach_failures_total").increment(1);
}

/// Set the number of surfaces currently bound.
///
/// Metric: `room_bound_surfaces`
pub fn set_bound_surfaces(count: usize) {
    // usize to f64 conversion is safe for realistic surface counts
    #[allow(clippy::cast_precision_loss)]
    gauge!("room_bound_surfaces").set(count as f64);
}

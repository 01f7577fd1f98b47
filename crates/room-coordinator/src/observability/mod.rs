//! Observability for the room coordinator.
//!
//! # Privacy by Default
//!
//! Actor entry points use `#[instrument(skip_all)]` with explicit field
//! allow-listing so tokens never reach a span. Metric labels are bounded:
//! - `outcome`: bounded by `JoinError::outcome_label` plus `success`
//!
//! # Metrics
//!
//! | Metric | Type | Labels | Purpose |
//! |--------|------|--------|---------|
//! | `room_joins_total` | Counter | `outcome` | Join attempts by result |
//! | `room_remote_tracks_dropped_total` | Counter | none | Remote video not shown, pool full |
//! | `room_local_video_unavailable_total` | Counter | none | Discovery gave up on the local track |
//! | `room_renderer_attach_failures_total` | Counter | none | Renderer refused a track |
//! | `room_bound_surfaces` | Gauge | none | Surfaces currently showing video |
//!
//! No exporter is installed here; a host application installs its own
//! recorder.

pub mod metrics;
pub mod notices;

pub use metrics::{
    record_join, record_local_video_unavailable, record_remote_track_dropped,
    record_renderer_attach_failure, set_bound_surfaces,
};
pub use notices::Notice;

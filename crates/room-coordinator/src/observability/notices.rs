//! Notices published to the presentation layer.
//!
//! Notices report non-fatal conditions. None of them changes the coordinator
//! state; they exist so the UI can show a toast or a placeholder.

use crate::media::DisconnectReason;
use crate::surfaces::SurfaceSlot;
use serde::Serialize;

/// A non-fatal event the presentation layer may want to show.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    /// No published local video track was found after discovery gave up.
    /// The call continues audio-only.
    LocalVideoUnavailable { camera_enabled: bool },

    /// A remote video track was not shown because every remote surface is
    /// occupied.
    OverCapacity { participant: String },

    /// The renderer refused a track; the surface was left free.
    RendererAttachFailed { surface: SurfaceSlot, reason: String },

    /// The media session rejected a camera command issued on connect.
    CameraToggleFailed { reason: String },

    /// The media session ended.
    Disconnected { reason: DisconnectReason },

    /// A join in flight was replaced by a newer join or a leave.
    JoinSuperseded { room: String },
}

impl Notice {
    /// Short name for logs.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Notice::LocalVideoUnavailable { .. } => "local_video_unavailable",
            Notice::OverCapacity { .. } => "over_capacity",
            Notice::RendererAttachFailed { .. } => "renderer_attach_failed",
            Notice::CameraToggleFailed { .. } => "camera_toggle_failed",
            Notice::Disconnected { .. } => "disconnected",
            Notice::JoinSuperseded { .. } => "join_superseded",
        }
    }
}

//! Media session seam.
//!
//! The real-time transport (signaling, SFU, codecs) lives behind
//! [`MediaSession`]. The coordinator issues commands through the trait and
//! learns about their outcome from the ordered event stream returned by
//! [`MediaSession::connect`].

use crate::errors::MediaError;
use async_trait::async_trait;
use common::secret::SecretString;
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;

/// Kind of a media track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackKind {
    Audio,
    Video,
}

impl TrackKind {
    /// Label for logs.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Audio => "audio",
            TrackKind::Video => "video",
        }
    }
}

/// Handle to a track owned by the media session.
///
/// The coordinator only ever holds clones; the session decides when the
/// underlying media is torn down.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Track {
    /// Server-assigned track id.
    pub sid: String,
    /// Audio or video.
    pub kind: TrackKind,
    /// Identity of the publishing participant.
    pub owner: String,
}

impl Track {
    /// Build a track handle.
    pub fn new(sid: impl Into<String>, kind: TrackKind, owner: impl Into<String>) -> Self {
        Self {
            sid: sid.into(),
            kind,
            owner: owner.into(),
        }
    }

    /// Whether this is a video track.
    #[must_use]
    pub fn is_video(&self) -> bool {
        self.kind == TrackKind::Video
    }
}

/// Why a media session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisconnectReason {
    /// Local `leave()` or disconnect command.
    ClientInitiated,
    /// Media server is going away.
    ServerShutdown,
    /// Removed from the room by a moderator.
    ParticipantRemoved,
    /// Room was closed.
    RoomDeleted,
    /// Same identity joined from elsewhere.
    DuplicateIdentity,
    /// Transport failure.
    ConnectionLost,
    /// Event stream ended without a reason.
    StreamClosed,
    /// Reason not known to this client.
    Other(String),
}

impl fmt::Display for DisconnectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisconnectReason::ClientInitiated => write!(f, "client_initiated"),
            DisconnectReason::ServerShutdown => write!(f, "server_shutdown"),
            DisconnectReason::ParticipantRemoved => write!(f, "participant_removed"),
            DisconnectReason::RoomDeleted => write!(f, "room_deleted"),
            DisconnectReason::DuplicateIdentity => write!(f, "duplicate_identity"),
            DisconnectReason::ConnectionLost => write!(f, "connection_lost"),
            DisconnectReason::StreamClosed => write!(f, "stream_closed"),
            DisconnectReason::Other(reason) => write!(f, "other({reason})"),
        }
    }
}

/// Events emitted by a connected media session, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaEvent {
    /// Session established.
    Connected,
    /// Session ended.
    Disconnected { reason: DisconnectReason },
    /// A participant (possibly the local one) published a track.
    TrackPublished { participant: String, track: Track },
    /// A remote track became available to render.
    TrackSubscribed { participant: String, track: Track },
    /// A remote track is no longer available.
    TrackUnsubscribed { participant: String, track: Track },
    /// A remote participant left.
    ParticipantDisconnected { participant: String },
    /// Event kind this client does not handle.
    Unrecognized { kind: String },
}

impl MediaEvent {
    /// Short name for logs.
    #[must_use]
    pub fn kind(&self) -> &str {
        match self {
            MediaEvent::Connected => "connected",
            MediaEvent::Disconnected { .. } => "disconnected",
            MediaEvent::TrackPublished { .. } => "track_published",
            MediaEvent::TrackSubscribed { .. } => "track_subscribed",
            MediaEvent::TrackUnsubscribed { .. } => "track_unsubscribed",
            MediaEvent::ParticipantDisconnected { .. } => "participant_disconnected",
            MediaEvent::Unrecognized { kind } => kind,
        }
    }
}

/// A live connection returned by [`MediaSession::connect`].
#[derive(Debug)]
pub struct MediaConnection {
    /// Identity the server assigned to the local participant.
    pub local_identity: String,
    /// Ordered session events. Closing the sender ends the session.
    pub events: mpsc::Receiver<MediaEvent>,
}

/// Real-time media transport.
///
/// Commands return once issued; their effect is confirmed by later events
/// (e.g. `TrackPublished` after `set_camera_enabled(true)`).
#[async_trait]
pub trait MediaSession: Send + Sync {
    /// Connect to the media server with a room token.
    async fn connect(&self, url: &str, token: &SecretString)
        -> Result<MediaConnection, MediaError>;

    /// Disconnect the current session. No-op when not connected.
    async fn disconnect(&self);

    /// Enable or disable local camera capture and publication.
    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), MediaError>;

    /// Enable or disable local microphone capture and publication.
    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), MediaError>;

    /// Published local video track, if the camera publication is confirmed.
    fn local_video_track(&self) -> Option<Track>;

    /// Whether the local camera is enabled.
    fn is_camera_enabled(&self) -> bool;
}

//! Message types for the coordinator actor.
//!
//! Callers talk to the actor over `tokio::sync::mpsc` with `tokio::sync::oneshot`
//! replies. Spawned join tasks report back on a separate internal channel,
//! tagged with the join generation that started them.

use crate::bindings::BindingView;
use crate::errors::{CoordinatorError, JoinError, MediaError, SessionError};
use crate::media::MediaConnection;
use common::secret::SecretString;
use serde::Serialize;
use std::fmt;
use tokio::sync::oneshot;

/// Room membership state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// No room.
    Idle,
    /// Fetching a room token or connecting.
    Joining,
    /// Connected to a room.
    Active,
    /// Tearing down the current room.
    Leaving,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Joining => "joining",
            SessionState::Active => "active",
            SessionState::Leaving => "leaving",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of the coordinator, published after every change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoordinatorSnapshot {
    /// Current state.
    pub state: SessionState,
    /// Room being joined or joined.
    pub room: Option<String>,
    /// Current join generation. Bumped by every `join` and by `leave` of a
    /// non-idle session.
    pub generation: u64,
    /// Bound surfaces, ordered by slot.
    pub bindings: Vec<BindingView>,
    /// Whether the local camera is enabled.
    pub camera_enabled: bool,
    /// Whether the local microphone is enabled.
    pub microphone_enabled: bool,
}

impl CoordinatorSnapshot {
    /// Snapshot of a freshly started coordinator.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            state: SessionState::Idle,
            room: None,
            generation: 0,
            bindings: Vec::new(),
            camera_enabled: false,
            microphone_enabled: false,
        }
    }
}

/// Messages sent to `RoomCoordinatorActor`.
#[derive(Debug)]
pub enum CoordinatorMessage {
    /// Join a room, leaving or superseding whatever came before.
    Join {
        room: String,
        access_token: SecretString,
        /// Answered once the room is active or the join fails.
        respond_to: oneshot::Sender<Result<(), JoinError>>,
    },

    /// Leave the current room.
    Leave {
        respond_to: oneshot::Sender<Result<(), CoordinatorError>>,
    },

    /// Flip the local camera.
    ToggleCamera {
        /// Response channel for the new enabled state.
        respond_to: oneshot::Sender<Result<bool, CoordinatorError>>,
    },

    /// Flip the local microphone.
    ToggleMicrophone {
        /// Response channel for the new enabled state.
        respond_to: oneshot::Sender<Result<bool, CoordinatorError>>,
    },

    /// Get the current snapshot after all queued media events are applied.
    GetSnapshot {
        respond_to: oneshot::Sender<CoordinatorSnapshot>,
    },
}

/// Results from the tasks a join spawns.
#[derive(Debug)]
pub(crate) enum JoinProgress {
    /// Room token request finished.
    TokenFetched {
        generation: u64,
        result: Result<SecretString, SessionError>,
    },

    /// Media connect finished.
    ConnectFinished {
        generation: u64,
        result: Result<MediaConnection, MediaError>,
    },
}

impl JoinProgress {
    pub(crate) const fn generation(&self) -> u64 {
        match self {
            JoinProgress::TokenFetched { generation, .. }
            | JoinProgress::ConnectFinished { generation, .. } => *generation,
        }
    }
}

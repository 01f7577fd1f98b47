//! Room coordinator error types.
//!
//! Every error carries detail for the logs (`Display`) and a separate
//! `user_message()` that is safe to show in the presentation layer. User
//! messages never include URLs, tokens, status bodies or participant ids.

use crate::surfaces::SurfaceSlot;
use thiserror::Error;

/// Errors from the session client (login, room listing, room tokens).
#[derive(Debug, Error, Clone)]
pub enum SessionError {
    /// Credentials or access token rejected by the backend.
    #[error("Authentication rejected: {0}")]
    AuthRejected(String),

    /// Transport failure or unexpected status from the backend.
    #[error("HTTP error: {0}")]
    Http(String),

    /// Response body could not be parsed.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Client could not be built from its configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl SessionError {
    /// Returns a message safe to display to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            SessionError::AuthRejected(_) => "Invalid username or password".to_string(),
            SessionError::Http(_) | SessionError::InvalidResponse(_) => {
                "Could not reach the server, please try again".to_string()
            }
            SessionError::Configuration(_) => "The app is misconfigured".to_string(),
        }
    }

    /// Whether the user can fix this by re-entering credentials.
    #[must_use]
    pub fn is_user_correctable(&self) -> bool {
        matches!(self, SessionError::AuthRejected(_))
    }
}

/// Errors returned by the media session seam.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// The session could not be established.
    #[error("Connect failed: {0}")]
    Connect(String),

    /// A command (camera, microphone) was rejected.
    #[error("Command failed: {0}")]
    Command(String),

    /// The session is not connected.
    #[error("Session not connected")]
    NotConnected,
}

/// Errors returned by the surface renderer seam.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RenderError {
    /// The renderer refused to attach the track.
    #[error("Renderer attach failed: {0}")]
    AttachFailed(String),

    /// The surface is no longer available (e.g. its view was destroyed).
    #[error("Surface {0} unavailable")]
    SurfaceUnavailable(SurfaceSlot),
}

/// Binding table invariant violations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BindingError {
    /// The surface is already bound to a different identity.
    #[error("Surface {surface} already bound to another participant")]
    SurfaceInUse { surface: SurfaceSlot },

    /// The identity already holds a different surface.
    #[error("Participant already bound to surface {surface}")]
    IdentityAlreadyBound { surface: SurfaceSlot },
}

/// Errors returned by `join`.
///
/// `TokenFetch` and `ConnectFailed` abort the join and return the coordinator
/// to `Idle`.
#[derive(Debug, Error, Clone)]
pub enum JoinError {
    /// Room token could not be obtained.
    #[error("Room token fetch failed: {0}")]
    TokenFetch(SessionError),

    /// Media session failed to connect.
    #[error("Media connect failed: {0}")]
    ConnectFailed(MediaError),

    /// A newer `join` or `leave` replaced this request.
    #[error("Join superseded by a newer request")]
    Superseded,

    /// Coordinator is shutting down.
    #[error("Coordinator is shutting down")]
    ShuttingDown,

    /// Coordinator task is gone.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl JoinError {
    /// Returns a message safe to display to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            JoinError::TokenFetch(e) => e.user_message(),
            JoinError::ConnectFailed(_) => "Could not connect to the room".to_string(),
            JoinError::Superseded => "Join cancelled".to_string(),
            JoinError::ShuttingDown | JoinError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }

    /// Bounded label used for the `outcome` metric label.
    #[must_use]
    pub const fn outcome_label(&self) -> &'static str {
        match self {
            JoinError::TokenFetch(_) => "token_fetch_failed",
            JoinError::ConnectFailed(_) => "connect_failed",
            JoinError::Superseded => "superseded",
            JoinError::ShuttingDown => "shutting_down",
            JoinError::Internal(_) => "internal",
        }
    }
}

/// Errors returned by the other coordinator operations.
#[derive(Debug, Error, Clone)]
pub enum CoordinatorError {
    /// Operation requires an active room.
    #[error("No active room")]
    NotActive,

    /// Media session rejected the command; coordinator state is unchanged.
    #[error("Media session error: {0}")]
    Media(MediaError),

    /// Coordinator is shutting down.
    #[error("Coordinator is shutting down")]
    ShuttingDown,

    /// Coordinator task is gone.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoordinatorError {
    /// Returns a message safe to display to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CoordinatorError::NotActive => "You are not in a room".to_string(),
            CoordinatorError::Media(_) => "The device could not be toggled".to_string(),
            CoordinatorError::ShuttingDown | CoordinatorError::Internal(_) => {
                "An internal error occurred".to_string()
            }
        }
    }
}

impl From<MediaError> for CoordinatorError {
    fn from(err: MediaError) -> Self {
        CoordinatorError::Media(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_messages_hide_internal_details() {
        let err = SessionError::Http("connection refused at 10.0.0.7:8443".to_string());
        assert!(!err.user_message().contains("10.0.0.7"));

        let err = JoinError::TokenFetch(SessionError::InvalidResponse(
            "expected `token` at line 1".to_string(),
        ));
        assert!(!err.user_message().contains("token"));

        let err = JoinError::ConnectFailed(MediaError::Connect(
            "wss://media.internal:7880 handshake".to_string(),
        ));
        assert!(!err.user_message().contains("wss://"));
    }

    #[test]
    fn test_auth_rejection_is_user_correctable() {
        assert!(SessionError::AuthRejected("Status 401".to_string()).is_user_correctable());
        assert!(!SessionError::Http("Status 502".to_string()).is_user_correctable());
        assert_eq!(
            SessionError::AuthRejected("Status 401".to_string()).user_message(),
            "Invalid username or password"
        );
    }

    #[test]
    fn test_join_outcome_labels_are_bounded() {
        let labels = [
            JoinError::TokenFetch(SessionError::Http(String::new())).outcome_label(),
            JoinError::ConnectFailed(MediaError::NotConnected).outcome_label(),
            JoinError::Superseded.outcome_label(),
            JoinError::ShuttingDown.outcome_label(),
            JoinError::Internal(String::new()).outcome_label(),
        ];
        assert_eq!(
            labels,
            [
                "token_fetch_failed",
                "connect_failed",
                "superseded",
                "shutting_down",
                "internal"
            ]
        );
    }

    #[test]
    fn test_display_formatting() {
        assert_eq!(
            format!(
                "{}",
                JoinError::TokenFetch(SessionError::AuthRejected("Status 401".to_string()))
            ),
            "Room token fetch failed: Authentication rejected: Status 401"
        );
        assert_eq!(
            format!(
                "{}",
                BindingError::SurfaceInUse {
                    surface: SurfaceSlot::Remote(2)
                }
            ),
            "Surface remote-2 already bound to another participant"
        );
        assert_eq!(
            format!("{}", RenderError::SurfaceUnavailable(SurfaceSlot::Local)),
            "Surface local unavailable"
        );
    }

    #[test]
    fn test_media_error_conversion() {
        let err: CoordinatorError = MediaError::Command("camera busy".to_string()).into();
        assert!(matches!(err, CoordinatorError::Media(MediaError::Command(_))));
    }
}

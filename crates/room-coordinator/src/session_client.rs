//! Backend session client.
//!
//! Thin HTTP wrapper for the three backend calls a client makes before it can
//! join a room:
//!
//! - `POST /login` exchanges username/password for an access token
//! - `GET /rooms` lists joinable rooms
//! - `GET /token?room=<name>` exchanges the access token for a room token
//!
//! # Security
//!
//! - Passwords and tokens are `SecretString` and never logged
//! - Error response bodies are logged at trace level only
//! - HTTP timeouts prevent hanging requests

use crate::errors::SessionError;
use async_trait::async_trait;
use common::secret::{bearer, ExposeSecret, SecretString};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

/// Default HTTP request timeout.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection timeout for the HTTP client.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A joinable room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSummary {
    /// Room name, used as the `room` parameter of `/token`.
    pub name: String,
    /// Participants currently in the room.
    #[serde(default)]
    pub participant_count: u32,
    /// Whether the room requires an invitation.
    #[serde(default)]
    pub is_private: bool,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    #[serde(default)]
    success: bool,
    access_token: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct RoomsResponse {
    rooms: Vec<RoomSummary>,
}

#[derive(Debug, Deserialize)]
struct RoomTokenResponse {
    token: SecretString,
}

/// Source of room-scoped media tokens.
///
/// The coordinator depends on this trait rather than on [`SessionClient`] so
/// that joins can be exercised without a backend.
#[async_trait]
pub trait RoomTokenProvider: Send + Sync {
    /// Exchange an access token for a token scoped to `room`.
    async fn room_token(
        &self,
        access_token: &SecretString,
        room: &str,
    ) -> Result<SecretString, SessionError>;
}

/// HTTP client for the session backend.
#[derive(Debug, Clone)]
pub struct SessionClient {
    base_url: String,
    http: reqwest::Client,
}

impl SessionClient {
    /// Create a client for `base_url` with the given request timeout.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SessionError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| SessionError::Configuration(format!("Failed to build HTTP client: {e}")))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { base_url, http })
    }

    /// Base URL requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Log in with username and password.
    ///
    /// # Errors
    ///
    /// - `AuthRejected` if the backend refuses the credentials, either with a
    ///   401/403 or with `success: false`
    /// - `Http` on transport failure or an unexpected status
    /// - `InvalidResponse` if the body cannot be parsed
    #[instrument(skip_all, fields(username = %username))]
    pub async fn login(
        &self,
        username: &str,
        password: &SecretString,
    ) -> Result<SecretString, SessionError> {
        let url = format!("{}/login", self.base_url);
        debug!(target: "room.session_client", url = %url, "Logging in");

        let body = serde_json::json!({
            "username": username,
            "password": password.expose_secret(),
        });

        let response = self
            .http
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        let login: LoginResponse = response.json().await.map_err(invalid_response)?;
        match login.access_token {
            Some(token) if login.success => {
                debug!(target: "room.session_client", "Login succeeded");
                Ok(token)
            }
            _ => {
                warn!(target: "room.session_client", "Login rejected by backend");
                Err(SessionError::AuthRejected(
                    "Login unsuccessful".to_string(),
                ))
            }
        }
    }

    /// List joinable rooms.
    ///
    /// # Errors
    ///
    /// Same mapping as [`SessionClient::login`] for status and body failures.
    #[instrument(skip_all)]
    pub async fn list_rooms(
        &self,
        access_token: &SecretString,
    ) -> Result<Vec<RoomSummary>, SessionError> {
        let url = format!("{}/rooms", self.base_url);
        debug!(target: "room.session_client", url = %url, "Listing rooms");

        let response = self
            .http
            .get(&url)
            .header(reqwest::header::AUTHORIZATION, bearer(access_token))
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        let rooms: RoomsResponse = response.json().await.map_err(invalid_response)?;
        debug!(
            target: "room.session_client",
            count = rooms.rooms.len(),
            "Rooms listed"
        );
        Ok(rooms.rooms)
    }

    /// Fetch a token for `room`.
    ///
    /// # Errors
    ///
    /// Same mapping as [`SessionClient::login`] for status and body failures.
    #[instrument(skip_all, fields(room = %room))]
    pub async fn fetch_room_token(
        &self,
        access_token: &SecretString,
        room: &str,
    ) -> Result<SecretString, SessionError> {
        let url = format!("{}/token", self.base_url);
        debug!(target: "room.session_client", room = %room, "Requesting room token");

        let response = self
            .http
            .get(&url)
            .query(&[("room", room)])
            .header(reqwest::header::AUTHORIZATION, bearer(access_token))
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;

        let token: RoomTokenResponse = response.json().await.map_err(invalid_response)?;
        debug!(target: "room.session_client", room = %room, "Room token acquired");
        Ok(token.token)
    }
}

#[async_trait]
impl RoomTokenProvider for SessionClient {
    async fn room_token(
        &self,
        access_token: &SecretString,
        room: &str,
    ) -> Result<SecretString, SessionError> {
        self.fetch_room_token(access_token, room).await
    }
}

fn transport_error(e: reqwest::Error) -> SessionError {
    debug!(target: "room.session_client", error = %e, "HTTP request failed");
    SessionError::Http(e.to_string())
}

fn invalid_response(e: reqwest::Error) -> SessionError {
    warn!(target: "room.session_client", error = %e, "Failed to parse response");
    SessionError::InvalidResponse(e.to_string())
}

/// Map non-success statuses to errors, passing successful responses through.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, SessionError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_else(|e| {
        trace!(target: "room.session_client", error = %e, "Failed to read error response body");
        "<failed to read body>".to_string()
    });
    trace!(target: "room.session_client", body = %body, "Error response body");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        warn!(target: "room.session_client", status = %status, "Request rejected by backend");
        Err(SessionError::AuthRejected(format!("Status {status}")))
    } else if status.is_server_error() {
        warn!(target: "room.session_client", status = %status, "Backend returned server error");
        Err(SessionError::Http(format!("Server error: {status}")))
    } else {
        warn!(target: "room.session_client", status = %status, "Unexpected response from backend");
        Err(SessionError::Http(format!("Unexpected status: {status}")))
    }
}

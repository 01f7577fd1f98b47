//! Room coordinator configuration.
//!
//! Configuration is loaded from environment variables. All sensitive
//! fields are redacted in Debug output.

use crate::session_client::DEFAULT_HTTP_TIMEOUT;
use crate::surfaces::DEFAULT_REMOTE_SURFACES;
use common::retry::{RetryPolicy, DEFAULT_INTERVAL, DEFAULT_MAX_ATTEMPTS};
use common::secret::SecretString;
use std::collections::HashMap;
use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Local preview is mirrored by default, like a front camera.
pub const DEFAULT_MIRROR_LOCAL: bool = true;

/// Remote video is shown unmirrored by default.
pub const DEFAULT_MIRROR_REMOTE: bool = false;

/// Settings the coordinator actor needs at spawn time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorConfig {
    /// Media server URL passed to `MediaSession::connect`.
    pub media_url: String,

    /// Number of remote surfaces (default: 4).
    pub remote_surfaces: usize,

    /// Local track discovery policy (default: 5 attempts, 500 ms apart).
    pub discovery: RetryPolicy,

    /// Mirror the local preview (default: true).
    pub mirror_local: bool,

    /// Mirror remote video (default: false).
    pub mirror_remote: bool,
}

impl CoordinatorConfig {
    /// Configuration with defaults for everything but the media URL.
    pub fn new(media_url: impl Into<String>) -> Self {
        Self {
            media_url: media_url.into(),
            remote_surfaces: DEFAULT_REMOTE_SURFACES,
            discovery: RetryPolicy::default(),
            mirror_local: DEFAULT_MIRROR_LOCAL,
            mirror_remote: DEFAULT_MIRROR_REMOTE,
        }
    }
}

/// Room client configuration.
///
/// Loaded from environment variables with sensible defaults.
/// Sensitive fields are redacted in Debug output.
#[derive(Clone)]
pub struct Config {
    /// Base URL of the session backend (`/login`, `/rooms`, `/token`).
    pub api_url: String,

    /// Request timeout for the session backend (default: 10s).
    pub http_timeout: Duration,

    /// Coordinator settings.
    pub coordinator: CoordinatorConfig,

    /// Login username (CLI only).
    pub username: Option<String>,

    /// Login password (CLI only).
    /// Protected by `SecretString` to prevent accidental logging.
    pub password: Option<SecretString>,

    /// Room to fetch a token for after listing (CLI only).
    pub join_room: Option<String>,
}

/// Custom Debug implementation that redacts sensitive fields.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_url", &self.api_url)
            .field("http_timeout", &self.http_timeout)
            .field("coordinator", &self.coordinator)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("join_room", &self.join_room)
            .finish()
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Load configuration from a `HashMap` (for testing).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a required variable is missing or a value is invalid.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let api_url = required(vars, "ROOM_API_URL")?;
        if !(api_url.starts_with("http://") || api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue(format!(
                "ROOM_API_URL must be an http(s) URL, got '{api_url}'"
            )));
        }

        let media_url = required(vars, "ROOM_MEDIA_URL")?;
        if !(media_url.starts_with("ws://") || media_url.starts_with("wss://")) {
            return Err(ConfigError::InvalidValue(format!(
                "ROOM_MEDIA_URL must be a ws(s) URL, got '{media_url}'"
            )));
        }

        let remote_surfaces: usize =
            parse_or(vars, "ROOM_REMOTE_SURFACES", DEFAULT_REMOTE_SURFACES)?;
        if remote_surfaces == 0 {
            return Err(ConfigError::InvalidValue(
                "ROOM_REMOTE_SURFACES must be at least 1".to_string(),
            ));
        }

        let discovery_attempts: u32 =
            parse_or(vars, "ROOM_DISCOVERY_ATTEMPTS", DEFAULT_MAX_ATTEMPTS)?;
        let discovery_interval_ms: u64 = parse_or(
            vars,
            "ROOM_DISCOVERY_INTERVAL_MS",
            u64::try_from(DEFAULT_INTERVAL.as_millis()).unwrap_or(500),
        )?;
        let discovery = RetryPolicy::new(
            discovery_attempts,
            Duration::from_millis(discovery_interval_ms),
        )
        .map_err(|e| ConfigError::InvalidValue(format!("ROOM_DISCOVERY_ATTEMPTS: {e}")))?;

        let http_timeout_seconds: u64 = parse_or(
            vars,
            "ROOM_HTTP_TIMEOUT_SECONDS",
            DEFAULT_HTTP_TIMEOUT.as_secs(),
        )?;

        let mirror_local = parse_bool_or(vars, "ROOM_MIRROR_LOCAL", DEFAULT_MIRROR_LOCAL)?;
        let mirror_remote = parse_bool_or(vars, "ROOM_MIRROR_REMOTE", DEFAULT_MIRROR_REMOTE)?;

        Ok(Config {
            api_url,
            http_timeout: Duration::from_secs(http_timeout_seconds),
            coordinator: CoordinatorConfig {
                media_url,
                remote_surfaces,
                discovery,
                mirror_local,
                mirror_remote,
            },
            username: vars.get("ROOM_USERNAME").cloned(),
            password: vars
                .get("ROOM_PASSWORD")
                .map(|p| SecretString::from(p.clone())),
            join_room: vars.get("ROOM_JOIN").cloned(),
        })
    }
}

fn required(vars: &HashMap<String, String>, name: &str) -> Result<String, ConfigError> {
    vars.get(name)
        .cloned()
        .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
}

fn parse_or<T: FromStr>(
    vars: &HashMap<String, String>,
    name: &str,
    default: T,
) -> Result<T, ConfigError> {
    match vars.get(name) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::InvalidValue(format!("{name} is not a valid number: '{raw}'"))),
        None => Ok(default),
    }
}

fn parse_bool_or(
    vars: &HashMap<String, String>,
    name: &str,
    default: bool,
) -> Result<bool, ConfigError> {
    match vars.get(name).map(|raw| raw.to_ascii_lowercase()) {
        Some(raw) => match raw.as_str() {
            "true" | "1" | "yes" => Ok(true),
            "false" | "0" | "no" => Ok(false),
            _ => Err(ConfigError::InvalidValue(format!(
                "{name} must be a boolean, got '{raw}'"
            ))),
        },
        None => Ok(default),
    }
}

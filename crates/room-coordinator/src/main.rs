//! Room Coordinator CLI
//!
//! Runs the pre-join sequence against a session backend:
//!
//! 1. Load configuration from environment
//! 2. Log in with `ROOM_USERNAME` / `ROOM_PASSWORD`
//! 3. List rooms and print them as JSON on stdout
//! 4. If `ROOM_JOIN` is set, fetch a room token for it
//!
//! The media session and renderer are supplied by a host application; this
//! binary stops at the point where a join would hand the room token to
//! `RoomCoordinatorHandle::join`.

#![warn(clippy::pedantic)]

use anyhow::{bail, Context};
use room_coordinator::config::Config;
use room_coordinator::session_client::{RoomTokenProvider, SessionClient};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "room_coordinator=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Starting Room Coordinator");

    // Load configuration
    let config = Config::from_env().map_err(|e| {
        error!("Failed to load configuration: {}", e);
        e
    })?;

    info!(
        api_url = %config.api_url,
        media_url = %config.coordinator.media_url,
        remote_surfaces = config.coordinator.remote_surfaces,
        discovery_attempts = config.coordinator.discovery.max_attempts(),
        "Configuration loaded successfully"
    );

    let (Some(username), Some(password)) = (config.username.as_deref(), config.password.as_ref())
    else {
        bail!("ROOM_USERNAME and ROOM_PASSWORD must be set");
    };

    let client = SessionClient::new(config.api_url.clone(), config.http_timeout)?;

    let access_token = client.login(username, password).await.map_err(|e| {
        error!(error = %e, "Login failed");
        anyhow::anyhow!(e.user_message())
    })?;
    info!(username = %username, "Logged in");

    let rooms = client
        .list_rooms(&access_token)
        .await
        .context("Failed to list rooms")?;
    info!(count = rooms.len(), "Rooms listed");
    println!("{}", serde_json::to_string_pretty(&rooms)?);

    if let Some(room) = config.join_room.as_deref() {
        if !rooms.iter().any(|r| r.name == room) {
            bail!("Room '{room}' is not in the room list");
        }

        client
            .room_token(&access_token, room)
            .await
            .with_context(|| format!("Failed to fetch token for room '{room}'"))?;
        info!(room = %room, "Room token acquired, ready to join");
    }

    Ok(())
}

//! Mock media session.
//!
//! Records every command, hands out an event channel on connect, and lets the
//! test push events into the coordinator.
//!
//! # Example
//!
//! ```rust,ignore
//! use room_test_utils::MockMediaSession;
//!
//! let media = MockMediaSession::builder()
//!     .local_identity("me")
//!     .build();
//!
//! // ... join through the coordinator, then:
//! media.emit(MediaEvent::Connected).await;
//! ```

use async_trait::async_trait;
use common::secret::{ExposeSecret, SecretString};
use room_coordinator::errors::MediaError;
use room_coordinator::media::{MediaConnection, MediaEvent, MediaSession, Track};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, Notify};

/// Buffer for the event channel handed to the coordinator.
const EVENT_CHANNEL_BUFFER: usize = 64;

/// A command the coordinator issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaCommand {
    Connect { url: String, token: String },
    Disconnect,
    SetCamera(bool),
    SetMicrophone(bool),
}

/// Mock `MediaSession`.
#[derive(Debug)]
pub struct MockMediaSession {
    local_identity: String,
    connect_error: Option<String>,
    camera_error: Option<String>,
    camera_stays_off: bool,
    connect_gate: Mutex<Option<Arc<Notify>>>,
    local_video: Mutex<Option<Track>>,
    camera_enabled: AtomicBool,
    commands: Mutex<Vec<MediaCommand>>,
    events: Mutex<Option<mpsc::Sender<MediaEvent>>>,
    local_video_polls: AtomicUsize,
}

impl MockMediaSession {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> MockMediaSessionBuilder {
        MockMediaSessionBuilder::default()
    }

    /// Identity handed out on connect.
    #[must_use]
    pub fn local_identity(&self) -> &str {
        &self.local_identity
    }

    /// Push an event to the connected coordinator.
    ///
    /// # Panics
    ///
    /// Panics if no session is connected or the coordinator dropped the stream.
    pub async fn emit(&self, event: MediaEvent) {
        let sender = self
            .events
            .lock()
            .unwrap()
            .clone()
            .expect("emit called without a connected session");
        sender
            .send(event)
            .await
            .expect("coordinator dropped the event stream");
    }

    /// Hold the next `connect` until the returned `Notify` is signalled.
    ///
    /// The `Connect` command is recorded before the call parks.
    pub fn gate_connect(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.connect_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Number of `connect()` calls.
    #[must_use]
    pub fn connect_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| matches!(c, MediaCommand::Connect { .. }))
            .count()
    }

    /// Close the event stream without a `Disconnected` event.
    pub fn close_events(&self) {
        self.events.lock().unwrap().take();
    }

    /// Whether an event stream is currently held open.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.events
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|sender| !sender.is_closed())
    }

    /// Change what `local_video_track()` returns from now on.
    pub fn set_local_video_track(&self, track: Option<Track>) {
        *self.local_video.lock().unwrap() = track;
    }

    /// Commands issued so far, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<MediaCommand> {
        self.commands.lock().unwrap().clone()
    }

    /// Number of `disconnect()` calls.
    #[must_use]
    pub fn disconnect_count(&self) -> usize {
        self.commands()
            .iter()
            .filter(|c| **c == MediaCommand::Disconnect)
            .count()
    }

    /// Number of `local_video_track()` queries.
    #[must_use]
    pub fn local_video_polls(&self) -> usize {
        self.local_video_polls.load(Ordering::SeqCst)
    }

    fn record(&self, command: MediaCommand) {
        self.commands.lock().unwrap().push(command);
    }
}

#[async_trait]
impl MediaSession for MockMediaSession {
    async fn connect(
        &self,
        url: &str,
        token: &SecretString,
    ) -> Result<MediaConnection, MediaError> {
        self.record(MediaCommand::Connect {
            url: url.to_string(),
            token: token.expose_secret().to_string(),
        });

        let gate = self.connect_gate.lock().unwrap().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(reason) = &self.connect_error {
            return Err(MediaError::Connect(reason.clone()));
        }

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_BUFFER);
        *self.events.lock().unwrap() = Some(tx);
        Ok(MediaConnection {
            local_identity: self.local_identity.clone(),
            events: rx,
        })
    }

    async fn disconnect(&self) {
        self.record(MediaCommand::Disconnect);
        self.events.lock().unwrap().take();
        self.camera_enabled.store(false, Ordering::SeqCst);
    }

    async fn set_camera_enabled(&self, enabled: bool) -> Result<(), MediaError> {
        self.record(MediaCommand::SetCamera(enabled));
        if let Some(reason) = &self.camera_error {
            return Err(MediaError::Command(reason.clone()));
        }
        if !self.camera_stays_off {
            self.camera_enabled.store(enabled, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn set_microphone_enabled(&self, enabled: bool) -> Result<(), MediaError> {
        self.record(MediaCommand::SetMicrophone(enabled));
        Ok(())
    }

    fn local_video_track(&self) -> Option<Track> {
        self.local_video_polls.fetch_add(1, Ordering::SeqCst);
        self.local_video.lock().unwrap().clone()
    }

    fn is_camera_enabled(&self) -> bool {
        self.camera_enabled.load(Ordering::SeqCst)
    }
}

/// Builder for `MockMediaSession`.
#[derive(Debug, Default)]
pub struct MockMediaSessionBuilder {
    local_identity: Option<String>,
    connect_error: Option<String>,
    camera_error: Option<String>,
    camera_stays_off: bool,
    local_video: Option<Track>,
}

impl MockMediaSessionBuilder {
    /// Identity handed out on connect (default: "me").
    #[must_use]
    pub fn local_identity(mut self, identity: impl Into<String>) -> Self {
        self.local_identity = Some(identity.into());
        self
    }

    /// Make `connect` fail.
    #[must_use]
    pub fn fail_connect(mut self, reason: impl Into<String>) -> Self {
        self.connect_error = Some(reason.into());
        self
    }

    /// Make `set_camera_enabled` fail.
    #[must_use]
    pub fn fail_camera(mut self, reason: impl Into<String>) -> Self {
        self.camera_error = Some(reason.into());
        self
    }

    /// Accept camera commands but keep reporting the camera as off.
    #[must_use]
    pub fn camera_stays_off(mut self) -> Self {
        self.camera_stays_off = true;
        self
    }

    /// Published local video track returned by `local_video_track()`.
    #[must_use]
    pub fn local_video_track(mut self, track: Track) -> Self {
        self.local_video = Some(track);
        self
    }

    /// Build the mock.
    #[must_use]
    pub fn build(self) -> Arc<MockMediaSession> {
        Arc::new(MockMediaSession {
            local_identity: self.local_identity.unwrap_or_else(|| "me".to_string()),
            connect_error: self.connect_error,
            camera_error: self.camera_error,
            camera_stays_off: self.camera_stays_off,
            connect_gate: Mutex::new(None),
            local_video: Mutex::new(self.local_video),
            camera_enabled: AtomicBool::new(false),
            commands: Mutex::new(Vec::new()),
            events: Mutex::new(None),
            local_video_polls: AtomicUsize::new(0),
        })
    }
}

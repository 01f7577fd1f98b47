//! `RoomCoordinatorActor` - owns the room membership of one client.
//!
//! The actor is the only owner of the session state, the surface pool and the
//! binding table. It consumes, in this priority order:
//!
//! 1. cancellation of its root token (shutdown)
//! 2. results of spawned join tasks (token fetch, media connect)
//! 3. media session events, strictly in arrival order
//! 4. local track discovery polls
//! 5. caller commands from the mailbox
//!
//! so every media event already queued is applied before the next command.
//!
//! # Join generations
//!
//! Every `join` bumps the generation and spawns its network work under a
//! child cancellation token. A later `join` or `leave` cancels that token and
//! answers the earlier caller with `JoinError::Superseded`. Results tagged
//! with an older generation are discarded.

use crate::bindings::BindingTable;
use crate::config::CoordinatorConfig;
use crate::errors::{CoordinatorError, JoinError};
use crate::media::{DisconnectReason, MediaEvent, MediaSession, Track, TrackKind};
use crate::observability::metrics::{
    record_join, record_local_video_unavailable, record_remote_track_dropped,
    record_renderer_attach_failure, set_bound_surfaces,
};
use crate::observability::Notice;
use crate::render::SurfaceRenderer;
use crate::session_client::RoomTokenProvider;
use crate::surfaces::{SurfacePool, SurfaceSlot};

use super::messages::{CoordinatorMessage, CoordinatorSnapshot, JoinProgress, SessionState};

use common::secret::SecretString;
use std::future::pending;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

/// Channel buffer size for the coordinator mailbox.
const COORDINATOR_CHANNEL_BUFFER: usize = 64;

/// Channel buffer size for join task results.
const PROGRESS_CHANNEL_BUFFER: usize = 8;

/// Buffered notices per subscriber before the oldest are dropped.
const NOTICE_CHANNEL_CAPACITY: usize = 64;

/// Handle to a `RoomCoordinatorActor`.
#[derive(Clone)]
pub struct RoomCoordinatorHandle {
    sender: mpsc::Sender<CoordinatorMessage>,
    cancel_token: CancellationToken,
    snapshot: watch::Receiver<CoordinatorSnapshot>,
    notices: broadcast::Sender<Notice>,
}

impl RoomCoordinatorHandle {
    /// Join `room`, leaving the current room first.
    ///
    /// Resolves once the media session is connected and the coordinator is
    /// `Active`, or when the join fails or is superseded.
    pub async fn join(
        &self,
        room: impl Into<String>,
        access_token: SecretString,
    ) -> Result<(), JoinError> {
        if self.cancel_token.is_cancelled() {
            return Err(JoinError::ShuttingDown);
        }

        let (tx, rx) = oneshot::channel();
        self.sender
            .send(CoordinatorMessage::Join {
                room: room.into(),
                access_token,
                respond_to: tx,
            })
            .await
            .map_err(|e| JoinError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| JoinError::Internal(format!("response receive failed: {e}")))?
    }

    /// Leave the current room. Idempotent.
    pub async fn leave(&self) -> Result<(), CoordinatorError> {
        self.request(|respond_to| CoordinatorMessage::Leave { respond_to })
            .await?
    }

    /// Flip the local camera. Returns the new enabled state.
    pub async fn toggle_camera(&self) -> Result<bool, CoordinatorError> {
        self.request(|respond_to| CoordinatorMessage::ToggleCamera { respond_to })
            .await?
    }

    /// Flip the local microphone. Returns the new enabled state.
    pub async fn toggle_microphone(&self) -> Result<bool, CoordinatorError> {
        self.request(|respond_to| CoordinatorMessage::ToggleMicrophone { respond_to })
            .await?
    }

    /// Get the current snapshot through the mailbox, after every media event
    /// queued so far has been applied.
    pub async fn get_snapshot(&self) -> Result<CoordinatorSnapshot, CoordinatorError> {
        self.request(|respond_to| CoordinatorMessage::GetSnapshot { respond_to })
            .await
    }

    /// Latest published snapshot, without waiting on the actor.
    #[must_use]
    pub fn snapshot(&self) -> CoordinatorSnapshot {
        self.snapshot.borrow().clone()
    }

    /// Subscribe to snapshot changes.
    #[must_use]
    pub fn watch_state(&self) -> watch::Receiver<CoordinatorSnapshot> {
        self.snapshot.clone()
    }

    /// Subscribe to notices emitted from now on.
    #[must_use]
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Cancel the actor. It leaves the room and releases every surface.
    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    /// Check if the actor is cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }

    async fn request<T>(
        &self,
        message: impl FnOnce(oneshot::Sender<T>) -> CoordinatorMessage,
    ) -> Result<T, CoordinatorError> {
        if self.cancel_token.is_cancelled() {
            return Err(CoordinatorError::ShuttingDown);
        }

        let (tx, rx) = oneshot::channel();
        self.sender
            .send(message(tx))
            .await
            .map_err(|e| CoordinatorError::Internal(format!("channel send failed: {e}")))?;

        rx.await
            .map_err(|e| CoordinatorError::Internal(format!("response receive failed: {e}")))
    }
}

/// A join waiting on its spawned tasks.
struct PendingJoin {
    generation: u64,
    room: String,
    respond_to: oneshot::Sender<Result<(), JoinError>>,
    cancel_token: CancellationToken,
}

/// Local track discovery in progress.
#[derive(Debug, Clone, Copy)]
struct Discovery {
    attempts: u32,
    next_poll: Instant,
}

/// The room coordinator actor.
pub struct RoomCoordinatorActor {
    config: CoordinatorConfig,
    receiver: mpsc::Receiver<CoordinatorMessage>,
    cancel_token: CancellationToken,
    tokens: Arc<dyn RoomTokenProvider>,
    media: Arc<dyn MediaSession>,
    renderer: Arc<dyn SurfaceRenderer>,
    progress_tx: mpsc::Sender<JoinProgress>,
    progress_rx: mpsc::Receiver<JoinProgress>,
    snapshot_tx: watch::Sender<CoordinatorSnapshot>,
    notices: broadcast::Sender<Notice>,
    state: SessionState,
    generation: u64,
    room: Option<String>,
    pending: Option<PendingJoin>,
    events: Option<mpsc::Receiver<MediaEvent>>,
    /// A connect was handed to the media session and not yet torn down.
    connect_issued: bool,
    local_identity: Option<String>,
    surfaces: SurfacePool,
    bindings: BindingTable,
    last_local_track: Option<Track>,
    camera_enabled: bool,
    microphone_enabled: bool,
    discovery: Option<Discovery>,
}

impl RoomCoordinatorActor {
    /// Spawn a new coordinator actor.
    ///
    /// Returns a handle and the task join handle.
    ///
    /// # Arguments
    ///
    /// * `config` - Media URL, surface count, discovery policy, mirroring
    /// * `cancel_token` - Root token; cancelling it shuts the actor down
    /// * `tokens` - Room token source, usually a `SessionClient`
    /// * `media` - Media session the coordinator drives
    /// * `renderer` - Presentation layer surface renderer
    pub fn spawn(
        config: CoordinatorConfig,
        cancel_token: CancellationToken,
        tokens: Arc<dyn RoomTokenProvider>,
        media: Arc<dyn MediaSession>,
        renderer: Arc<dyn SurfaceRenderer>,
    ) -> (RoomCoordinatorHandle, JoinHandle<()>) {
        let (actor, handle) = Self::new(config, cancel_token, tokens, media, renderer);
        let task_handle = tokio::spawn(actor.run());
        (handle, task_handle)
    }

    fn new(
        config: CoordinatorConfig,
        cancel_token: CancellationToken,
        tokens: Arc<dyn RoomTokenProvider>,
        media: Arc<dyn MediaSession>,
        renderer: Arc<dyn SurfaceRenderer>,
    ) -> (Self, RoomCoordinatorHandle) {
        let (sender, receiver) = mpsc::channel(COORDINATOR_CHANNEL_BUFFER);
        let (progress_tx, progress_rx) = mpsc::channel(PROGRESS_CHANNEL_BUFFER);
        let (snapshot_tx, snapshot_rx) = watch::channel(CoordinatorSnapshot::idle());
        let (notices, _) = broadcast::channel(NOTICE_CHANNEL_CAPACITY);

        let actor = Self {
            surfaces: SurfacePool::new(config.remote_surfaces),
            config,
            receiver,
            cancel_token: cancel_token.clone(),
            tokens,
            media,
            renderer,
            progress_tx,
            progress_rx,
            snapshot_tx,
            notices: notices.clone(),
            state: SessionState::Idle,
            generation: 0,
            room: None,
            pending: None,
            events: None,
            connect_issued: false,
            local_identity: None,
            bindings: BindingTable::new(),
            last_local_track: None,
            camera_enabled: false,
            microphone_enabled: false,
            discovery: None,
        };

        let handle = RoomCoordinatorHandle {
            sender,
            cancel_token,
            snapshot: snapshot_rx,
            notices,
        };

        (actor, handle)
    }

    /// Run the actor message loop.
    #[instrument(skip_all, name = "room.actor.coordinator")]
    async fn run(mut self) {
        info!(
            target: "room.coordinator",
            remote_surfaces = self.surfaces.remote_capacity(),
            "RoomCoordinatorActor started"
        );

        loop {
            let discovery_due = self.discovery.map(|d| d.next_poll);

            tokio::select! {
                biased;

                () = self.cancel_token.cancelled() => {
                    info!(
                        target: "room.coordinator",
                        "RoomCoordinatorActor received cancellation signal"
                    );
                    self.graceful_shutdown().await;
                    break;
                }

                Some(progress) = self.progress_rx.recv() => {
                    self.handle_progress(progress).await;
                }

                event = next_event(&mut self.events) => {
                    match event {
                        Some(event) => self.on_event(event).await,
                        None => {
                            self.on_event(MediaEvent::Disconnected {
                                reason: DisconnectReason::StreamClosed,
                            })
                            .await;
                        }
                    }
                }

                () = sleep_until_due(discovery_due) => {
                    self.poll_local_track();
                }

                msg = self.receiver.recv() => {
                    match msg {
                        Some(message) => self.handle_message(message).await,
                        None => {
                            info!(
                                target: "room.coordinator",
                                "RoomCoordinatorActor channel closed, exiting"
                            );
                            self.graceful_shutdown().await;
                            break;
                        }
                    }
                }
            }

            self.publish_snapshot();
        }

        info!(
            target: "room.coordinator",
            generation = self.generation,
            "RoomCoordinatorActor stopped"
        );
    }

    /// Handle a single caller command.
    async fn handle_message(&mut self, message: CoordinatorMessage) {
        match message {
            CoordinatorMessage::Join {
                room,
                access_token,
                respond_to,
            } => {
                self.handle_join(room, access_token, respond_to).await;
            }

            CoordinatorMessage::Leave { respond_to } => {
                self.handle_leave().await;
                let _ = respond_to.send(Ok(()));
            }

            CoordinatorMessage::ToggleCamera { respond_to } => {
                let result = self.handle_toggle_camera().await;
                let _ = respond_to.send(result);
            }

            CoordinatorMessage::ToggleMicrophone { respond_to } => {
                let result = self.handle_toggle_microphone().await;
                let _ = respond_to.send(result);
            }

            CoordinatorMessage::GetSnapshot { respond_to } => {
                let _ = respond_to.send(self.build_snapshot());
            }
        }
    }

    // ------------------------------------------------------------------
    // Join / leave
    // ------------------------------------------------------------------

    #[instrument(skip_all, fields(room = %room))]
    async fn handle_join(
        &mut self,
        room: String,
        access_token: SecretString,
        respond_to: oneshot::Sender<Result<(), JoinError>>,
    ) {
        self.supersede_pending();

        if self.state == SessionState::Active || self.connect_issued {
            info!(
                target: "room.coordinator",
                previous_room = ?self.room,
                "Leaving current room before joining"
            );
            self.state = SessionState::Leaving;
            self.publish_snapshot();
            self.teardown().await;
        }

        self.generation += 1;
        let generation = self.generation;
        self.state = SessionState::Joining;
        self.room = Some(room.clone());

        info!(
            target: "room.coordinator",
            generation,
            "Joining room"
        );

        let cancel_token = self.cancel_token.child_token();
        self.pending = Some(PendingJoin {
            generation,
            room: room.clone(),
            respond_to,
            cancel_token: cancel_token.clone(),
        });

        let tokens = Arc::clone(&self.tokens);
        let progress_tx = self.progress_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel_token.cancelled() => {}
                result = tokens.room_token(&access_token, &room) => {
                    let _ = progress_tx
                        .send(JoinProgress::TokenFetched { generation, result })
                        .await;
                }
            }
        });
    }

    async fn handle_progress(&mut self, progress: JoinProgress) {
        let is_current = self
            .pending
            .as_ref()
            .is_some_and(|pending| pending.generation == progress.generation());
        if !is_current {
            debug!(
                target: "room.coordinator",
                stale_generation = progress.generation(),
                generation = self.generation,
                "Discarding result of superseded join"
            );
            let stale_connection = matches!(
                progress,
                JoinProgress::ConnectFinished { result: Ok(_), .. }
            );
            if stale_connection && !self.connect_issued && self.events.is_none() {
                info!(
                    target: "room.coordinator",
                    "Disconnecting session of superseded join"
                );
                self.media.disconnect().await;
            }
            return;
        }

        match progress {
            JoinProgress::TokenFetched {
                generation,
                result: Ok(token),
            } => {
                debug!(target: "room.coordinator", generation, "Room token acquired, connecting");
                self.spawn_connect(generation, token);
            }

            JoinProgress::TokenFetched {
                result: Err(e), ..
            } => {
                warn!(target: "room.coordinator", error = %e, "Room token fetch failed");
                self.fail_join(JoinError::TokenFetch(e));
            }

            JoinProgress::ConnectFinished {
                result: Ok(connection),
                ..
            } => {
                let Some(pending) = self.pending.take() else {
                    return;
                };

                self.local_identity = Some(connection.local_identity);
                self.events = Some(connection.events);
                self.state = SessionState::Active;

                info!(
                    target: "room.coordinator",
                    room = %pending.room,
                    generation = pending.generation,
                    "Room active"
                );
                record_join("success");
                let _ = pending.respond_to.send(Ok(()));
            }

            JoinProgress::ConnectFinished {
                result: Err(e), ..
            } => {
                warn!(target: "room.coordinator", error = %e, "Media connect failed");
                self.fail_join(JoinError::ConnectFailed(e));
            }
        }
    }

    fn spawn_connect(&mut self, generation: u64, token: SecretString) {
        let Some(cancel_token) = self.pending.as_ref().map(|p| p.cancel_token.clone()) else {
            return;
        };
        self.connect_issued = true;

        let media = Arc::clone(&self.media);
        let url = self.config.media_url.clone();
        let progress_tx = self.progress_tx.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = cancel_token.cancelled() => {}
                result = media.connect(&url, &token) => {
                    let _ = progress_tx
                        .send(JoinProgress::ConnectFinished { generation, result })
                        .await;
                }
            }
        });
    }

    /// Abort the pending join with `error` and go back to `Idle`.
    fn fail_join(&mut self, error: JoinError) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        pending.cancel_token.cancel();
        self.connect_issued = false;
        self.state = SessionState::Idle;
        self.room = None;
        record_join(error.outcome_label());
        let _ = pending.respond_to.send(Err(error));
    }

    /// Answer an in-flight join with `Superseded` and stop its tasks.
    fn supersede_pending(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };

        info!(
            target: "room.coordinator",
            room = %pending.room,
            generation = pending.generation,
            "Join superseded"
        );
        pending.cancel_token.cancel();
        record_join(JoinError::Superseded.outcome_label());
        let _ = pending.respond_to.send(Err(JoinError::Superseded));
        self.notify(Notice::JoinSuperseded { room: pending.room });
    }

    async fn handle_leave(&mut self) {
        if self.state == SessionState::Idle && self.pending.is_none() {
            debug!(target: "room.coordinator", "Leave while idle, nothing to do");
            return;
        }

        info!(
            target: "room.coordinator",
            room = ?self.room,
            "Leaving room"
        );

        self.supersede_pending();
        self.generation += 1;
        self.state = SessionState::Leaving;
        self.publish_snapshot();
        self.teardown().await;
        self.state = SessionState::Idle;
    }

    /// Disconnect, detach every renderer and free every surface.
    ///
    /// The media session is told to disconnect whenever a connect was issued,
    /// including one still in flight.
    async fn teardown(&mut self) {
        let had_connection = self.events.take().is_some();
        let connect_issued = std::mem::take(&mut self.connect_issued);
        if had_connection || connect_issued {
            self.media.disconnect().await;
        }

        self.clear_session();

        if had_connection {
            self.notify(Notice::Disconnected {
                reason: DisconnectReason::ClientInitiated,
            });
        }
    }

    /// Forget everything tied to the current room.
    fn clear_session(&mut self) {
        self.discovery = None;
        self.release_all_bindings();
        self.local_identity = None;
        self.last_local_track = None;
        self.room = None;
        self.camera_enabled = false;
        self.microphone_enabled = false;
    }

    fn release_all_bindings(&mut self) {
        for (identity, binding) in self.bindings.clear() {
            debug!(
                target: "room.coordinator",
                participant = %identity,
                surface = %binding.surface,
                "Detaching renderer"
            );
            self.renderer.detach(binding.surface, &binding.track);
        }
        self.surfaces.release_all();
    }

    /// Perform graceful shutdown.
    async fn graceful_shutdown(&mut self) {
        info!(
            target: "room.coordinator",
            state = %self.state,
            bindings = self.bindings.len(),
            "Performing graceful shutdown"
        );

        if let Some(pending) = self.pending.take() {
            pending.cancel_token.cancel();
            record_join(JoinError::ShuttingDown.outcome_label());
            let _ = pending.respond_to.send(Err(JoinError::ShuttingDown));
        }

        if self.state != SessionState::Idle {
            self.generation += 1;
        }
        self.teardown().await;
        self.surfaces.shutdown();
        self.state = SessionState::Idle;
        self.publish_snapshot();

        info!(target: "room.coordinator", "Graceful shutdown complete");
    }

    // ------------------------------------------------------------------
    // Media events
    // ------------------------------------------------------------------

    /// Apply one media session event.
    async fn on_event(&mut self, event: MediaEvent) {
        debug!(
            target: "room.coordinator",
            event = event.kind(),
            "Media event"
        );

        match event {
            MediaEvent::Connected => self.on_connected().await,

            MediaEvent::Disconnected { reason } => {
                info!(
                    target: "room.coordinator",
                    reason = %reason,
                    "Media session disconnected"
                );
                self.events = None;
                self.connect_issued = false;
                self.clear_session();
                self.state = SessionState::Idle;
                self.notify(Notice::Disconnected { reason });
            }

            MediaEvent::TrackPublished { participant, track } => {
                if !self.is_local(&participant) {
                    debug!(
                        target: "room.coordinator",
                        participant = %participant,
                        "Ignoring remote publication"
                    );
                    return;
                }
                match track.kind {
                    TrackKind::Video => self.bind_local(track),
                    TrackKind::Audio => self.recover_local_video(),
                }
            }

            MediaEvent::TrackSubscribed { participant, track } => {
                self.on_track_subscribed(participant, track);
            }

            MediaEvent::TrackUnsubscribed { participant, track } => {
                let is_bound_track = self
                    .bindings
                    .lookup(&participant)
                    .is_some_and(|binding| binding.track.sid == track.sid);
                if is_bound_track {
                    self.release_participant(&participant);
                } else {
                    debug!(
                        target: "room.coordinator",
                        participant = %participant,
                        track_sid = %track.sid,
                        "Unsubscribed track was not bound"
                    );
                }
            }

            MediaEvent::ParticipantDisconnected { participant } => {
                if self.is_local(&participant) {
                    return;
                }
                self.release_participant(&participant);
            }

            MediaEvent::Unrecognized { kind } => {
                debug!(
                    target: "room.coordinator",
                    kind = %kind,
                    "Ignoring unrecognized media event"
                );
            }
        }
    }

    async fn on_connected(&mut self) {
        match self.media.set_camera_enabled(true).await {
            Ok(()) => self.camera_enabled = true,
            Err(e) => {
                warn!(target: "room.coordinator", error = %e, "Failed to enable camera");
                self.camera_enabled = false;
                self.notify(Notice::CameraToggleFailed {
                    reason: e.to_string(),
                });
            }
        }

        match self.media.set_microphone_enabled(true).await {
            Ok(()) => self.microphone_enabled = true,
            Err(e) => {
                warn!(target: "room.coordinator", error = %e, "Failed to enable microphone");
                self.microphone_enabled = false;
            }
        }

        self.start_discovery();
    }

    fn on_track_subscribed(&mut self, participant: String, track: Track) {
        if !track.is_video() {
            debug!(
                target: "room.coordinator",
                participant = %participant,
                "Audio subscription needs no surface"
            );
            return;
        }
        if self.is_local(&participant) {
            debug!(
                target: "room.coordinator",
                "Ignoring subscription to own track"
            );
            return;
        }

        let slot = match self.bindings.lookup(&participant) {
            Some(binding) => binding.surface,
            None => {
                if let Some(slot) = self.surfaces.acquire_free(&participant) {
                    slot
                } else {
                    warn!(
                        target: "room.coordinator",
                        participant = %participant,
                        capacity = self.surfaces.remote_capacity(),
                        "All remote surfaces occupied, track not shown"
                    );
                    record_remote_track_dropped();
                    self.notify(Notice::OverCapacity { participant });
                    return;
                }
            }
        };

        if self.attach_and_bind(&participant, track, slot, self.config.mirror_remote) {
            debug!(
                target: "room.coordinator",
                participant = %participant,
                surface = %slot,
                "Remote track bound"
            );
        }
    }

    /// Drop the binding held by `participant` and free its surface.
    fn release_participant(&mut self, participant: &str) {
        if let Some(binding) = self.bindings.unbind_by_identity(participant) {
            self.renderer.detach(binding.surface, &binding.track);
            self.surfaces.release(binding.surface);
            debug!(
                target: "room.coordinator",
                participant = %participant,
                surface = %binding.surface,
                "Surface released"
            );
        }
    }

    /// Show `track` for `identity` on `slot`, replacing the identity's
    /// previous track. Returns whether the binding is in place.
    fn attach_and_bind(
        &mut self,
        identity: &str,
        track: Track,
        slot: SurfaceSlot,
        mirror: bool,
    ) -> bool {
        let previous = self.bindings.lookup(identity).cloned();
        if previous.as_ref().is_some_and(|p| p.track.sid == track.sid) {
            return true;
        }

        if let Err(e) = self.renderer.attach(slot, &track, mirror) {
            warn!(
                target: "room.coordinator",
                participant = %identity,
                surface = %slot,
                error = %e,
                "Renderer attach failed"
            );
            record_renderer_attach_failure();
            if previous.is_none() {
                self.surfaces.release(slot);
            }
            self.notify(Notice::RendererAttachFailed {
                surface: slot,
                reason: e.to_string(),
            });
            return false;
        }

        if let Some(previous) = &previous {
            self.renderer.detach(slot, &previous.track);
        }

        match self.bindings.bind(identity, track.clone(), slot) {
            Ok(_) => true,
            Err(e) => {
                error!(
                    target: "room.coordinator",
                    participant = %identity,
                    error = %e,
                    "Binding rejected"
                );
                self.renderer.detach(slot, &track);
                if previous.is_none() {
                    self.surfaces.release(slot);
                }
                false
            }
        }
    }

    // ------------------------------------------------------------------
    // Local video
    // ------------------------------------------------------------------

    fn is_local(&self, participant: &str) -> bool {
        self.local_identity.as_deref() == Some(participant)
    }

    fn local_bound(&self) -> bool {
        self.local_identity
            .as_deref()
            .is_some_and(|identity| self.bindings.lookup(identity).is_some())
    }

    /// Bind the local video track to the local surface.
    fn bind_local(&mut self, track: Track) {
        let Some(identity) = self.local_identity.clone() else {
            return;
        };

        self.last_local_track = Some(track.clone());
        self.discovery = None;

        if !self.camera_enabled {
            debug!(
                target: "room.coordinator",
                track_sid = %track.sid,
                "Camera disabled, remembering local track without binding"
            );
            return;
        }

        let slot = self.surfaces.reserve_local(&identity);
        if self.attach_and_bind(&identity, track, slot, self.config.mirror_local) {
            info!(target: "room.coordinator", "Local video bound");
        }
    }

    /// Audio published before video was confirmed: check whether the video
    /// publication already exists and bind it.
    fn recover_local_video(&mut self) {
        if self.local_bound() || !self.camera_enabled || !self.media.is_camera_enabled() {
            return;
        }
        if let Some(track) = self.media.local_video_track() {
            debug!(
                target: "room.coordinator",
                track_sid = %track.sid,
                "Local video recovered from audio publication"
            );
            self.bind_local(track);
        }
    }

    fn start_discovery(&mut self) {
        debug!(
            target: "room.coordinator",
            max_attempts = self.config.discovery.max_attempts(),
            window_ms = u64::try_from(self.config.discovery.total_span().as_millis())
                .unwrap_or(u64::MAX),
            "Starting local track discovery"
        );
        self.discovery = Some(Discovery {
            attempts: 0,
            next_poll: Instant::now(),
        });
    }

    /// One discovery attempt.
    fn poll_local_track(&mut self) {
        let Some(mut discovery) = self.discovery.take() else {
            return;
        };
        if self.local_bound() {
            return;
        }

        discovery.attempts += 1;
        if let Some(track) = self.media.local_video_track() {
            debug!(
                target: "room.coordinator",
                attempt = discovery.attempts,
                "Local video track discovered"
            );
            self.bind_local(track);
            return;
        }

        let policy = self.config.discovery;
        if policy.is_exhausted(discovery.attempts) {
            let camera_enabled = self.media.is_camera_enabled();
            if self.camera_enabled && !camera_enabled {
                warn!(
                    target: "room.coordinator",
                    "Camera enable was accepted but the media session reports it off"
                );
                self.camera_enabled = false;
            }
            warn!(
                target: "room.coordinator",
                attempts = discovery.attempts,
                camera_enabled,
                "No local video track published, continuing audio-only"
            );
            record_local_video_unavailable();
            self.notify(Notice::LocalVideoUnavailable { camera_enabled });
            return;
        }

        discovery.next_poll += policy.delay_before(discovery.attempts.saturating_add(1));
        self.discovery = Some(discovery);
    }

    // ------------------------------------------------------------------
    // Device toggles
    // ------------------------------------------------------------------

    async fn handle_toggle_camera(&mut self) -> Result<bool, CoordinatorError> {
        if self.state != SessionState::Active {
            return Err(CoordinatorError::NotActive);
        }

        let enabled = !self.camera_enabled;
        if let Err(e) = self.media.set_camera_enabled(enabled).await {
            warn!(
                target: "room.coordinator",
                error = %e,
                enabled,
                "Camera toggle failed"
            );
            return Err(e.into());
        }
        self.camera_enabled = enabled;

        if enabled {
            match self.last_local_track.clone() {
                Some(track) => self.bind_local(track),
                None => self.start_discovery(),
            }
        } else {
            self.discovery = None;
            if let Some(identity) = self.local_identity.clone() {
                if let Some(binding) = self.bindings.unbind_by_identity(&identity) {
                    self.renderer.detach(binding.surface, &binding.track);
                    self.surfaces.release(binding.surface);
                    self.last_local_track = Some(binding.track);
                }
            }
        }

        info!(target: "room.coordinator", enabled, "Camera toggled");
        Ok(enabled)
    }

    async fn handle_toggle_microphone(&mut self) -> Result<bool, CoordinatorError> {
        if self.state != SessionState::Active {
            return Err(CoordinatorError::NotActive);
        }

        let enabled = !self.microphone_enabled;
        if let Err(e) = self.media.set_microphone_enabled(enabled).await {
            warn!(
                target: "room.coordinator",
                error = %e,
                enabled,
                "Microphone toggle failed"
            );
            return Err(e.into());
        }
        self.microphone_enabled = enabled;

        info!(target: "room.coordinator", enabled, "Microphone toggled");
        Ok(enabled)
    }

    // ------------------------------------------------------------------
    // Publication
    // ------------------------------------------------------------------

    fn notify(&self, notice: Notice) {
        debug!(target: "room.coordinator", notice = notice.kind(), "Notice emitted");
        // No subscribers is fine.
        let _ = self.notices.send(notice);
    }

    fn build_snapshot(&self) -> CoordinatorSnapshot {
        CoordinatorSnapshot {
            state: self.state,
            room: self.room.clone(),
            generation: self.generation,
            bindings: self.bindings.snapshot(),
            camera_enabled: self.camera_enabled,
            microphone_enabled: self.microphone_enabled,
        }
    }

    fn publish_snapshot(&self) {
        let snapshot = self.build_snapshot();
        set_bound_surfaces(self.surfaces.bound_count());
        self.snapshot_tx.send_if_modified(|current| {
            if *current == snapshot {
                false
            } else {
                *current = snapshot;
                true
            }
        });
    }
}

/// Next event from the media session, or never when not connected.
async fn next_event(events: &mut Option<mpsc::Receiver<MediaEvent>>) -> Option<MediaEvent> {
    match events {
        Some(events) => events.recv().await,
        None => pending().await,
    }
}

/// Sleep until the next discovery poll, or forever when none is scheduled.
async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => tokio::time::sleep_until(due).await,
        None => pending().await,
    }
}

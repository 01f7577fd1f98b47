//! Coordinator wired to mocks.
//!
//! # Example
//!
//! ```rust,ignore
//! let room = TestCoordinator::builder().remote_surfaces(2).spawn();
//! room.join_active("standup").await;
//! room.media.emit(MediaEvent::Connected).await;
//! let snapshot = room.snapshot().await;
//! ```

use crate::fixtures::{access_token, test_config};
use crate::mock_media::MockMediaSession;
use crate::mock_tokens::MockTokenProvider;
use crate::renderer::RecordingRenderer;
use room_coordinator::actors::{CoordinatorSnapshot, RoomCoordinatorActor, RoomCoordinatorHandle};
use room_coordinator::config::CoordinatorConfig;
use room_coordinator::errors::JoinError;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// A running coordinator and the mocks behind it.
pub struct TestCoordinator {
    pub handle: RoomCoordinatorHandle,
    pub media: Arc<MockMediaSession>,
    pub tokens: Arc<MockTokenProvider>,
    pub renderer: Arc<RecordingRenderer>,
    pub task: JoinHandle<()>,
}

impl TestCoordinator {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> TestCoordinatorBuilder {
        TestCoordinatorBuilder::default()
    }

    /// Join `room` with the test access token.
    pub async fn join(&self, room: &str) -> Result<(), JoinError> {
        self.handle.join(room, access_token()).await
    }

    /// Join `room` and assert it succeeded.
    ///
    /// # Panics
    ///
    /// Panics if the join fails.
    pub async fn join_active(&self, room: &str) {
        self.join(room).await.expect("join should succeed");
    }

    /// Snapshot after every queued media event has been applied.
    ///
    /// # Panics
    ///
    /// Panics if the coordinator has stopped.
    pub async fn snapshot(&self) -> CoordinatorSnapshot {
        self.handle
            .get_snapshot()
            .await
            .expect("coordinator should be running")
    }
}

/// Builder for `TestCoordinator`.
#[derive(Default)]
pub struct TestCoordinatorBuilder {
    config: Option<CoordinatorConfig>,
    media: Option<Arc<MockMediaSession>>,
    tokens: Option<Arc<MockTokenProvider>>,
    renderer: Option<Arc<RecordingRenderer>>,
}

impl TestCoordinatorBuilder {
    /// Number of remote surfaces (default: 4).
    #[must_use]
    pub fn remote_surfaces(mut self, count: usize) -> Self {
        self.config = Some(test_config(count));
        self
    }

    /// Full coordinator configuration.
    #[must_use]
    pub fn config(mut self, config: CoordinatorConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a preconfigured media session mock.
    #[must_use]
    pub fn media(mut self, media: Arc<MockMediaSession>) -> Self {
        self.media = Some(media);
        self
    }

    /// Use a preconfigured token provider mock.
    #[must_use]
    pub fn tokens(mut self, tokens: Arc<MockTokenProvider>) -> Self {
        self.tokens = Some(tokens);
        self
    }

    /// Use a preconfigured renderer.
    #[must_use]
    pub fn renderer(mut self, renderer: Arc<RecordingRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Spawn the coordinator. Must be called inside a tokio runtime.
    #[must_use]
    pub fn spawn(self) -> TestCoordinator {
        let media = self
            .media
            .unwrap_or_else(|| MockMediaSession::builder().build());
        let tokens = self.tokens.unwrap_or_else(MockTokenProvider::accepting);
        let renderer = self.renderer.unwrap_or_else(RecordingRenderer::new);
        let config = self.config.unwrap_or_else(|| test_config(4));

        let (handle, task) = RoomCoordinatorActor::spawn(
            config,
            CancellationToken::new(),
            tokens.clone(),
            media.clone(),
            renderer.clone(),
        );

        TestCoordinator {
            handle,
            media,
            tokens,
            renderer,
            task,
        }
    }
}

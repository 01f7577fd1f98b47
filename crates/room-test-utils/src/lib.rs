//! # Room Test Utilities
//!
//! Mocks and fixtures for testing the room coordinator without a backend, a
//! media server or a display.
//!
//! ## Modules
//!
//! - `mock_media` - Scriptable `MediaSession` that records commands
//! - `mock_tokens` - `RoomTokenProvider` with per-room failures and gates
//! - `renderer` - `SurfaceRenderer` that records attach/detach calls
//! - `harness` - Coordinator spawned against the mocks
//! - `fixtures` - Tracks, rooms, tokens and configurations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use room_test_utils::*;
//!
//! #[tokio::test]
//! async fn test_example() {
//!     let room = TestCoordinator::builder().remote_surfaces(4).spawn();
//!     room.join_active("standup").await;
//!
//!     room.media
//!         .emit(MediaEvent::TrackSubscribed {
//!             participant: "alice".to_string(),
//!             track: video_track("alice"),
//!         })
//!         .await;
//!
//!     assert_eq!(room.snapshot().await.bindings.len(), 1);
//! }
//! ```

pub mod fixtures;
pub mod harness;
pub mod mock_media;
pub mod mock_tokens;
pub mod renderer;

// Re-export commonly used items
pub use fixtures::*;
pub use harness::{TestCoordinator, TestCoordinatorBuilder};
pub use mock_media::{MediaCommand, MockMediaSession, MockMediaSessionBuilder};
pub use mock_tokens::MockTokenProvider;
pub use renderer::{RecordingRenderer, RenderCall};

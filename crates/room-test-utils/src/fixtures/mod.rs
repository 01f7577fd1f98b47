//! Pre-configured test data.

use common::secret::SecretString;
use room_coordinator::config::CoordinatorConfig;
use room_coordinator::media::{Track, TrackKind};
use uuid::Uuid;

/// Media URL used by test configurations.
pub const TEST_MEDIA_URL: &str = "wss://media.rooms.test";

/// Video track published by `owner`.
#[must_use]
pub fn video_track(owner: &str) -> Track {
    Track::new(format!("TR_V_{owner}"), TrackKind::Video, owner)
}

/// Second video track for `owner`, e.g. after a camera switch.
#[must_use]
pub fn replacement_video_track(owner: &str) -> Track {
    Track::new(format!("TR_V2_{owner}"), TrackKind::Video, owner)
}

/// Audio track published by `owner`.
#[must_use]
pub fn audio_track(owner: &str) -> Track {
    Track::new(format!("TR_A_{owner}"), TrackKind::Audio, owner)
}

/// Room name unique to one test.
#[must_use]
pub fn random_room() -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("room-{}", id.get(..8).unwrap_or("00000000"))
}

/// Access token as returned by `/login`.
#[must_use]
pub fn access_token() -> SecretString {
    SecretString::from("test-access-token")
}

/// Coordinator configuration with `remote_surfaces` remote slots and default
/// discovery.
#[must_use]
pub fn test_config(remote_surfaces: usize) -> CoordinatorConfig {
    CoordinatorConfig {
        remote_surfaces,
        ..CoordinatorConfig::new(TEST_MEDIA_URL)
    }
}

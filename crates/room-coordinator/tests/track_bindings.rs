//! Remote track to surface binding.
//!
//! Drives the coordinator with remote subscription events and checks the
//! binding table, the surface pool and the renderer stay consistent.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, clippy::indexing_slicing)]

use std::collections::HashSet;

use room_coordinator::actors::CoordinatorSnapshot;
use room_coordinator::config::CoordinatorConfig;
use room_coordinator::media::{MediaEvent, Track};
use room_coordinator::observability::Notice;
use room_coordinator::surfaces::SurfaceSlot;
use room_test_utils::*;

async fn subscribe_track(room: &TestCoordinator, participant: &str, track: Track) {
    room.media
        .emit(MediaEvent::TrackSubscribed {
            participant: participant.to_string(),
            track,
        })
        .await;
}

async fn subscribe(room: &TestCoordinator, participant: &str) {
    subscribe_track(room, participant, video_track(participant)).await;
}

fn surface_of(snapshot: &CoordinatorSnapshot, identity: &str) -> Option<SurfaceSlot> {
    snapshot
        .bindings
        .iter()
        .find(|b| b.identity == identity)
        .map(|b| b.surface)
}

/// Every bound surface is distinct, remote, and showing the bound track.
fn assert_consistent(room: &TestCoordinator, snapshot: &CoordinatorSnapshot, capacity: usize) {
    let mut surfaces = HashSet::new();
    for binding in &snapshot.bindings {
        assert!(
            surfaces.insert(binding.surface),
            "surface {} bound twice",
            binding.surface
        );
        match binding.surface {
            SurfaceSlot::Remote(i) => assert!(i < capacity, "slot {i} out of range"),
            SurfaceSlot::Local => panic!("remote identity {} on local surface", binding.identity),
        }
        assert_eq!(
            room.renderer.attached(binding.surface).as_deref(),
            Some(binding.track_sid.as_str())
        );
    }
    assert!(snapshot.bindings.len() <= capacity);
    assert_eq!(room.renderer.attached_count(), snapshot.bindings.len());
}

// ============================================================================
// Capacity
// ============================================================================

#[tokio::test]
async fn test_fifth_participant_is_over_capacity() {
    let room = TestCoordinator::builder().remote_surfaces(4).spawn();
    let mut notices = room.handle.subscribe_notices();
    room.join_active("standup").await;

    for participant in ["alice", "bob", "carol", "dave", "erin"] {
        subscribe(&room, participant).await;
    }

    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.bindings.len(), 4);
    assert!(surface_of(&snapshot, "erin").is_none());
    assert_consistent(&room, &snapshot, 4);
    assert_eq!(
        notices.recv().await.unwrap(),
        Notice::OverCapacity {
            participant: "erin".to_string()
        }
    );
}

#[tokio::test]
async fn test_departure_frees_slot_for_next_participant() {
    let room = TestCoordinator::builder().remote_surfaces(2).spawn();
    room.join_active("standup").await;
    subscribe(&room, "alice").await;
    subscribe(&room, "bob").await;
    subscribe(&room, "carol").await;

    let snapshot = room.snapshot().await;
    let alice_slot = surface_of(&snapshot, "alice").unwrap();
    assert!(surface_of(&snapshot, "carol").is_none());

    room.media
        .emit(MediaEvent::ParticipantDisconnected {
            participant: "alice".to_string(),
        })
        .await;
    subscribe(&room, "carol").await;

    let snapshot = room.snapshot().await;
    assert!(surface_of(&snapshot, "alice").is_none());
    assert_eq!(surface_of(&snapshot, "carol"), Some(alice_slot));
    assert_consistent(&room, &snapshot, 2);
}

#[tokio::test]
async fn test_slots_fill_in_order() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;
    subscribe(&room, "alice").await;
    subscribe(&room, "bob").await;

    let snapshot = room.snapshot().await;
    assert_eq!(surface_of(&snapshot, "alice"), Some(SurfaceSlot::Remote(0)));
    assert_eq!(surface_of(&snapshot, "bob"), Some(SurfaceSlot::Remote(1)));
}

// ============================================================================
// Track changes
// ============================================================================

#[tokio::test]
async fn test_replacement_track_keeps_surface() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;
    subscribe(&room, "alice").await;
    subscribe(&room, "bob").await;

    subscribe_track(&room, "alice", replacement_video_track("alice")).await;

    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.bindings.len(), 2);
    assert_eq!(surface_of(&snapshot, "alice"), Some(SurfaceSlot::Remote(0)));
    assert_eq!(
        room.renderer.attached(SurfaceSlot::Remote(0)),
        Some(replacement_video_track("alice").sid)
    );
    assert!(room.renderer.calls().contains(&RenderCall::Detach {
        slot: SurfaceSlot::Remote(0),
        track_sid: video_track("alice").sid,
    }));
    assert_consistent(&room, &snapshot, 4);
}

#[tokio::test]
async fn test_duplicate_subscription_is_noop() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;
    subscribe(&room, "alice").await;
    subscribe(&room, "alice").await;

    let snapshot = room.snapshot().await;
    assert_eq!(snapshot.bindings.len(), 1);
    let attaches = room
        .renderer
        .calls()
        .into_iter()
        .filter(|c| matches!(c, RenderCall::Attach { .. }))
        .count();
    assert_eq!(attaches, 1);
}

#[tokio::test]
async fn test_unsubscribe_of_bound_track_frees_surface() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;
    subscribe(&room, "alice").await;

    room.media
        .emit(MediaEvent::TrackUnsubscribed {
            participant: "alice".to_string(),
            track: video_track("alice"),
        })
        .await;

    let snapshot = room.snapshot().await;
    assert!(snapshot.bindings.is_empty());
    assert_eq!(room.renderer.attached_count(), 0);
}

#[tokio::test]
async fn test_unsubscribe_of_other_track_is_ignored() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;
    subscribe(&room, "alice").await;

    room.media
        .emit(MediaEvent::TrackUnsubscribed {
            participant: "alice".to_string(),
            track: replacement_video_track("alice"),
        })
        .await;
    room.media
        .emit(MediaEvent::TrackUnsubscribed {
            participant: "bob".to_string(),
            track: video_track("bob"),
        })
        .await;

    let snapshot = room.snapshot().await;
    assert_eq!(surface_of(&snapshot, "alice"), Some(SurfaceSlot::Remote(0)));
}

#[tokio::test]
async fn test_audio_subscription_needs_no_surface() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;

    subscribe_track(&room, "alice", audio_track("alice")).await;

    let snapshot = room.snapshot().await;
    assert!(snapshot.bindings.is_empty());
    assert!(room.renderer.calls().is_empty());
}

#[tokio::test]
async fn test_own_subscription_is_ignored() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;

    let me = room.media.local_identity().to_string();
    subscribe(&room, &me).await;

    assert!(room.snapshot().await.bindings.is_empty());
}

#[tokio::test]
async fn test_remote_publication_is_ignored() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;

    room.media
        .emit(MediaEvent::TrackPublished {
            participant: "alice".to_string(),
            track: video_track("alice"),
        })
        .await;

    assert!(room.snapshot().await.bindings.is_empty());
}

// ============================================================================
// Renderer
// ============================================================================

#[tokio::test]
async fn test_attach_failure_leaves_surface_free() {
    let renderer = RecordingRenderer::new();
    renderer.fail_on(SurfaceSlot::Remote(0));
    let room = TestCoordinator::builder().renderer(renderer).spawn();
    let mut notices = room.handle.subscribe_notices();
    room.join_active("standup").await;

    subscribe(&room, "alice").await;

    let snapshot = room.snapshot().await;
    assert!(snapshot.bindings.is_empty());
    assert!(matches!(
        notices.recv().await.unwrap(),
        Notice::RendererAttachFailed {
            surface: SurfaceSlot::Remote(0),
            ..
        }
    ));
}

#[tokio::test]
async fn test_remote_mirroring_follows_config() {
    let config = CoordinatorConfig {
        mirror_remote: true,
        ..test_config(4)
    };
    let room = TestCoordinator::builder().config(config).spawn();
    room.join_active("standup").await;

    subscribe(&room, "alice").await;
    room.snapshot().await;

    assert_eq!(
        room.renderer.calls(),
        vec![RenderCall::Attach {
            slot: SurfaceSlot::Remote(0),
            track_sid: video_track("alice").sid,
            mirror: true,
        }]
    );
}

#[tokio::test]
async fn test_remote_tracks_not_mirrored_by_default() {
    let room = TestCoordinator::builder().spawn();
    room.join_active("standup").await;

    subscribe(&room, "alice").await;
    room.snapshot().await;

    assert!(matches!(
        room.renderer.calls().first(),
        Some(RenderCall::Attach { mirror: false, .. })
    ));
}

// ============================================================================
// Event sequences
// ============================================================================

/// Deterministic xorshift so failures reproduce.
struct XorShift(u64);

impl XorShift {
    fn next(&mut self) -> u64 {
        self.0 ^= self.0 << 13;
        self.0 ^= self.0 >> 7;
        self.0 ^= self.0 << 17;
        self.0
    }

    fn below(&mut self, n: usize) -> usize {
        (self.next() % n as u64) as usize
    }
}

#[tokio::test]
async fn test_random_event_sequences_keep_bindings_consistent() {
    const CAPACITY: usize = 3;
    let participants = ["alice", "bob", "carol", "dave", "erin", "frank", "me"];

    for seed in [0x9E37_79B9_7F4A_7C15_u64, 0xD1B5_4A32_D192_ED03, 42] {
        let room = TestCoordinator::builder()
            .remote_surfaces(CAPACITY)
            .spawn();
        room.join_active("standup").await;
        let mut rng = XorShift(seed);

        for _ in 0..200 {
            let participant = participants[rng.below(participants.len())];
            let event = match rng.below(5) {
                0 | 1 => MediaEvent::TrackSubscribed {
                    participant: participant.to_string(),
                    track: video_track(participant),
                },
                2 => MediaEvent::TrackSubscribed {
                    participant: participant.to_string(),
                    track: replacement_video_track(participant),
                },
                3 => MediaEvent::TrackUnsubscribed {
                    participant: participant.to_string(),
                    track: video_track(participant),
                },
                _ => MediaEvent::ParticipantDisconnected {
                    participant: participant.to_string(),
                },
            };
            room.media.emit(event).await;

            let snapshot = room.snapshot().await;
            assert!(surface_of(&snapshot, "me").is_none());
            assert_consistent(&room, &snapshot, CAPACITY);
        }

        room.handle.leave().await.unwrap();
        assert!(room.snapshot().await.bindings.is_empty());
        assert_eq!(room.renderer.attached_count(), 0);
    }
}

//! Login, room listing and join against a mocked session backend.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;
use std::time::Duration;

use common::secret::{ExposeSecret, SecretString};
use room_coordinator::actors::{RoomCoordinatorActor, RoomCoordinatorHandle, SessionState};
use room_coordinator::errors::{JoinError, SessionError};
use room_coordinator::session_client::SessionClient;
use room_test_utils::*;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn backend() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": true, "access_token": "access-abc"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rooms"))
        .and(header("authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "rooms": [
                {"name": "standup", "participant_count": 3},
                {"name": "retro", "participant_count": 0, "is_private": true}
            ]
        })))
        .mount(&server)
        .await;
    server
}

fn spawn_coordinator(
    client: SessionClient,
    media: Arc<MockMediaSession>,
) -> RoomCoordinatorHandle {
    let (handle, _task) = RoomCoordinatorActor::spawn(
        test_config(4),
        CancellationToken::new(),
        Arc::new(client),
        media,
        RecordingRenderer::new(),
    );
    handle
}

#[tokio::test]
async fn test_login_list_and_join() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("room", "standup"))
        .and(header("authorization", "Bearer access-abc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "room-tok"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = SessionClient::new(server.uri(), Duration::from_secs(2)).unwrap();
    let access = client
        .login("alice", &SecretString::from("pw"))
        .await
        .unwrap();
    assert_eq!(access.expose_secret(), "access-abc");

    let rooms = client.list_rooms(&access).await.unwrap();
    let names: Vec<_> = rooms.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["standup", "retro"]);
    assert!(rooms.iter().any(|r| r.is_private));

    let media = MockMediaSession::builder().build();
    let coordinator = spawn_coordinator(client, Arc::clone(&media));
    coordinator.join("standup", access).await.unwrap();

    assert_eq!(
        coordinator.get_snapshot().await.unwrap().state,
        SessionState::Active
    );
    assert_eq!(
        media.commands(),
        vec![MediaCommand::Connect {
            url: TEST_MEDIA_URL.to_string(),
            token: "room-tok".to_string(),
        }]
    );
}

#[tokio::test]
async fn test_token_endpoint_failure_fails_join() {
    let server = backend().await;
    Mock::given(method("GET"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = SessionClient::new(server.uri(), Duration::from_secs(2)).unwrap();
    let access = client
        .login("alice", &SecretString::from("pw"))
        .await
        .unwrap();

    let media = MockMediaSession::builder().build();
    let coordinator = spawn_coordinator(client, Arc::clone(&media));
    let result = coordinator.join("standup", access).await;

    assert!(matches!(
        result,
        Err(JoinError::TokenFetch(SessionError::Http(_)))
    ));
    assert_eq!(
        coordinator.get_snapshot().await.unwrap().state,
        SessionState::Idle
    );
    assert!(media.commands().is_empty());
}

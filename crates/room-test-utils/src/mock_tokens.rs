//! Mock room token provider.
//!
//! Answers `room_token` with `token-<room>` unless configured to fail, and can
//! hold a room's response until the test releases it.

use async_trait::async_trait;
use common::secret::SecretString;
use room_coordinator::errors::SessionError;
use room_coordinator::session_client::RoomTokenProvider;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

/// Mock `RoomTokenProvider`.
#[derive(Debug, Default)]
pub struct MockTokenProvider {
    failures: Mutex<HashMap<String, SessionError>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    calls: Mutex<Vec<String>>,
}

impl MockTokenProvider {
    /// Provider that returns a token for every room.
    #[must_use]
    pub fn accepting() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Token the provider returns for `room`.
    #[must_use]
    pub fn token_for(room: &str) -> String {
        format!("token-{room}")
    }

    /// Make requests for `room` fail with `error`.
    pub fn fail_room(&self, room: impl Into<String>, error: SessionError) {
        self.failures.lock().unwrap().insert(room.into(), error);
    }

    /// Hold requests for `room` until the returned `Notify` is signalled.
    pub fn gate_room(&self, room: impl Into<String>) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert(room.into(), Arc::clone(&gate));
        gate
    }

    /// Rooms requested so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    /// Number of requests so far.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl RoomTokenProvider for MockTokenProvider {
    async fn room_token(
        &self,
        _access_token: &SecretString,
        room: &str,
    ) -> Result<SecretString, SessionError> {
        self.calls.lock().unwrap().push(room.to_string());

        let gate = self.gates.lock().unwrap().get(room).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if let Some(error) = self.failures.lock().unwrap().get(room).cloned() {
            return Err(error);
        }
        Ok(SecretString::from(Self::token_for(room)))
    }
}

//! Recording surface renderer.

use room_coordinator::errors::RenderError;
use room_coordinator::media::Track;
use room_coordinator::render::SurfaceRenderer;
use room_coordinator::surfaces::SurfaceSlot;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// A renderer call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderCall {
    Attach {
        slot: SurfaceSlot,
        track_sid: String,
        mirror: bool,
    },
    Detach {
        slot: SurfaceSlot,
        track_sid: String,
    },
}

/// `SurfaceRenderer` that records calls and tracks what each slot shows.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    calls: Mutex<Vec<RenderCall>>,
    attached: Mutex<HashMap<SurfaceSlot, String>>,
    failing: Mutex<HashSet<SurfaceSlot>>,
}

impl RecordingRenderer {
    /// Create a renderer that accepts every attach.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make attaches to `slot` fail.
    pub fn fail_on(&self, slot: SurfaceSlot) {
        self.failing.lock().unwrap().insert(slot);
    }

    /// Track sid currently shown on `slot`.
    #[must_use]
    pub fn attached(&self, slot: SurfaceSlot) -> Option<String> {
        self.attached.lock().unwrap().get(&slot).cloned()
    }

    /// Number of slots currently showing a track.
    #[must_use]
    pub fn attached_count(&self) -> usize {
        self.attached.lock().unwrap().len()
    }

    /// Calls so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RenderCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl SurfaceRenderer for RecordingRenderer {
    fn attach(&self, slot: SurfaceSlot, track: &Track, mirror: bool) -> Result<(), RenderError> {
        self.calls.lock().unwrap().push(RenderCall::Attach {
            slot,
            track_sid: track.sid.clone(),
            mirror,
        });

        if self.failing.lock().unwrap().contains(&slot) {
            return Err(RenderError::SurfaceUnavailable(slot));
        }
        self.attached.lock().unwrap().insert(slot, track.sid.clone());
        Ok(())
    }

    fn detach(&self, slot: SurfaceSlot, track: &Track) {
        self.calls.lock().unwrap().push(RenderCall::Detach {
            slot,
            track_sid: track.sid.clone(),
        });

        let mut attached = self.attached.lock().unwrap();
        if attached.get(&slot) == Some(&track.sid) {
            attached.remove(&slot);
        }
    }
}

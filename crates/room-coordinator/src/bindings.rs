//! Track binding table.
//!
//! Maps a participant identity to the video track and surface currently
//! showing it. The table keeps a reverse index so that bound identities and
//! bound surfaces stay in one-to-one correspondence.

use crate::errors::BindingError;
use crate::media::Track;
use crate::surfaces::SurfaceSlot;
use serde::Serialize;
use std::collections::HashMap;

/// A track shown on a surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// The bound video track.
    pub track: Track,
    /// The surface rendering it.
    pub surface: SurfaceSlot,
}

/// Presentation view of one binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BindingView {
    /// Participant identity.
    pub identity: String,
    /// Surface showing the participant.
    pub surface: SurfaceSlot,
    /// Track sid.
    pub track_sid: String,
}

/// Identity -> (track, surface), bijective with bound surfaces.
#[derive(Debug, Default)]
pub struct BindingTable {
    by_identity: HashMap<String, Binding>,
    by_surface: HashMap<SurfaceSlot, String>,
}

impl BindingTable {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `identity` to `track` on `surface`.
    ///
    /// Rebinding an identity on the surface it already holds replaces the
    /// track and returns the previous binding.
    ///
    /// # Errors
    ///
    /// - `SurfaceInUse` if another identity holds `surface`
    /// - `IdentityAlreadyBound` if `identity` holds a different surface
    pub fn bind(
        &mut self,
        identity: &str,
        track: Track,
        surface: SurfaceSlot,
    ) -> Result<Option<Binding>, BindingError> {
        if let Some(owner) = self.by_surface.get(&surface) {
            if owner != identity {
                return Err(BindingError::SurfaceInUse { surface });
            }
        }
        if let Some(existing) = self.by_identity.get(identity) {
            if existing.surface != surface {
                return Err(BindingError::IdentityAlreadyBound {
                    surface: existing.surface,
                });
            }
        }

        self.by_surface.insert(surface, identity.to_string());
        Ok(self
            .by_identity
            .insert(identity.to_string(), Binding { track, surface }))
    }

    /// Remove the binding held by `identity`.
    pub fn unbind_by_identity(&mut self, identity: &str) -> Option<Binding> {
        let binding = self.by_identity.remove(identity)?;
        self.by_surface.remove(&binding.surface);
        Some(binding)
    }

    /// Binding held by `identity`.
    #[must_use]
    pub fn lookup(&self, identity: &str) -> Option<&Binding> {
        self.by_identity.get(identity)
    }

    /// Identity bound to `surface`.
    #[must_use]
    pub fn identity_for(&self, surface: SurfaceSlot) -> Option<&str> {
        self.by_surface.get(&surface).map(String::as_str)
    }

    /// Remove every binding, returning them.
    pub fn clear(&mut self) -> Vec<(String, Binding)> {
        self.by_surface.clear();
        self.by_identity.drain().collect()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_identity.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_identity.is_empty()
    }

    /// Bindings ordered by surface.
    #[must_use]
    pub fn snapshot(&self) -> Vec<BindingView> {
        let mut views: Vec<BindingView> = self
            .by_identity
            .iter()
            .map(|(identity, binding)| BindingView {
                identity: identity.clone(),
                surface: binding.surface,
                track_sid: binding.track.sid.clone(),
            })
            .collect();
        views.sort_by_key(|view| view.surface);
        views
    }
}

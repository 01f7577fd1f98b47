//! Render surface pool.
//!
//! Fixed set of display slots: one reserved for the local preview and N for
//! remote participants. Remote slots are handed out first-free in index order
//! and stay with their identity until explicitly released.

use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Default number of remote surfaces.
pub const DEFAULT_REMOTE_SURFACES: usize = 4;

/// A display slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfaceSlot {
    /// The reserved local preview surface.
    Local,
    /// A remote participant surface, by index.
    Remote(usize),
}

impl fmt::Display for SurfaceSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SurfaceSlot::Local => write!(f, "local"),
            SurfaceSlot::Remote(index) => write!(f, "remote-{index}"),
        }
    }
}

/// State of a single surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceState {
    /// Available for binding.
    Free,
    /// Showing the given identity's video.
    Bound(String),
    /// Torn down with its owner; never handed out again.
    Released,
}

/// Pool of 1 local + N remote surfaces.
#[derive(Debug)]
pub struct SurfacePool {
    local: SurfaceState,
    remote: Vec<SurfaceState>,
}

impl SurfacePool {
    /// Create a pool with `remote_count` remote surfaces, all free.
    #[must_use]
    pub fn new(remote_count: usize) -> Self {
        Self {
            local: SurfaceState::Free,
            remote: vec![SurfaceState::Free; remote_count],
        }
    }

    /// Number of remote surfaces.
    #[must_use]
    pub fn remote_capacity(&self) -> usize {
        self.remote.len()
    }

    /// Claim the reserved local surface for `identity`.
    ///
    /// The local slot is always the one returned; claiming it again for a new
    /// identity (e.g. after rejoining) simply re-labels it. A released pool
    /// keeps the slot released.
    pub fn reserve_local(&mut self, identity: &str) -> SurfaceSlot {
        if self.local != SurfaceState::Released {
            self.local = SurfaceState::Bound(identity.to_string());
        }
        SurfaceSlot::Local
    }

    /// Claim the first free remote surface for `identity`.
    ///
    /// Returns `None` when every remote surface is occupied or released.
    pub fn acquire_free(&mut self, identity: &str) -> Option<SurfaceSlot> {
        let (index, state) = self
            .remote
            .iter_mut()
            .enumerate()
            .find(|(_, state)| **state == SurfaceState::Free)?;

        *state = SurfaceState::Bound(identity.to_string());
        debug!(
            target: "room.surfaces",
            surface = index,
            "Remote surface acquired"
        );
        Some(SurfaceSlot::Remote(index))
    }

    /// Return a surface to `Free`. No-op for free, released or unknown slots.
    pub fn release(&mut self, slot: SurfaceSlot) {
        if let Some(state) = self.state_mut(slot) {
            if matches!(state, SurfaceState::Bound(_)) {
                *state = SurfaceState::Free;
            }
        }
    }

    /// Return every bound surface to `Free`.
    pub fn release_all(&mut self) {
        self.release(SurfaceSlot::Local);
        for index in 0..self.remote.len() {
            self.release(SurfaceSlot::Remote(index));
        }
    }

    /// Mark every surface `Released`. Terminal.
    pub fn shutdown(&mut self) {
        self.local = SurfaceState::Released;
        for state in &mut self.remote {
            *state = SurfaceState::Released;
        }
    }

    /// Current state of a slot, `None` for an index outside the pool.
    #[must_use]
    pub fn state(&self, slot: SurfaceSlot) -> Option<&SurfaceState> {
        match slot {
            SurfaceSlot::Local => Some(&self.local),
            SurfaceSlot::Remote(index) => self.remote.get(index),
        }
    }

    /// Number of free remote surfaces.
    #[must_use]
    pub fn free_remote(&self) -> usize {
        self.remote
            .iter()
            .filter(|state| **state == SurfaceState::Free)
            .count()
    }

    /// Number of bound surfaces, local included.
    #[must_use]
    pub fn bound_count(&self) -> usize {
        std::iter::once(&self.local)
            .chain(self.remote.iter())
            .filter(|state| matches!(state, SurfaceState::Bound(_)))
            .count()
    }

    fn state_mut(&mut self, slot: SurfaceSlot) -> Option<&mut SurfaceState> {
        match slot {
            SurfaceSlot::Local => Some(&mut self.local),
            SurfaceSlot::Remote(index) => self.remote.get_mut(index),
        }
    }
}

impl Default for SurfacePool {
    fn default() -> Self {
        Self::new(DEFAULT_REMOTE_SURFACES)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_has_one_local_and_four_remote() {
        let pool = SurfacePool::default();
        assert_eq!(pool.remote_capacity(), 4);
        assert_eq!(pool.free_remote(), 4);
        assert_eq!(pool.state(SurfaceSlot::Local), Some(&SurfaceState::Free));
        assert_eq!(pool.state(SurfaceSlot::Remote(4)), None);
    }

    #[test]
    fn test_acquire_is_first_free_in_order() {
        let mut pool = SurfacePool::new(3);
        assert_eq!(pool.acquire_free("alice"), Some(SurfaceSlot::Remote(0)));
        assert_eq!(pool.acquire_free("bob"), Some(SurfaceSlot::Remote(1)));

        pool.release(SurfaceSlot::Remote(0));
        assert_eq!(pool.acquire_free("carol"), Some(SurfaceSlot::Remote(0)));
        assert_eq!(pool.acquire_free("dave"), Some(SurfaceSlot::Remote(2)));
        assert_eq!(pool.acquire_free("erin"), None);
    }

    #[test]
    fn test_acquire_never_returns_local() {
        let mut pool = SurfacePool::new(1);
        assert_eq!(pool.acquire_free("alice"), Some(SurfaceSlot::Remote(0)));
        assert_eq!(pool.acquire_free("bob"), None);
        assert_eq!(pool.state(SurfaceSlot::Local), Some(&SurfaceState::Free));
    }

    #[test]
    fn test_release_is_idempotent() {
        let mut pool = SurfacePool::new(2);
        let slot = pool.acquire_free("alice").unwrap();

        pool.release(slot);
        pool.release(slot);
        pool.release(SurfaceSlot::Remote(99));

        assert_eq!(pool.free_remote(), 2);
        assert_eq!(pool.acquire_free("bob"), Some(slot));
    }

    #[test]
    fn test_reserve_local_binds_local_slot() {
        let mut pool = SurfacePool::new(2);
        assert_eq!(pool.reserve_local("me"), SurfaceSlot::Local);
        assert_eq!(
            pool.state(SurfaceSlot::Local),
            Some(&SurfaceState::Bound("me".to_string()))
        );
        assert_eq!(pool.bound_count(), 1);
        assert_eq!(pool.free_remote(), 2);
    }

    #[test]
    fn test_release_all_frees_everything() {
        let mut pool = SurfacePool::new(2);
        pool.reserve_local("me");
        pool.acquire_free("alice");
        pool.acquire_free("bob");
        assert_eq!(pool.bound_count(), 3);

        pool.release_all();
        assert_eq!(pool.bound_count(), 0);
        assert_eq!(pool.free_remote(), 2);
    }

    #[test]
    fn test_shutdown_is_terminal() {
        let mut pool = SurfacePool::new(2);
        pool.acquire_free("alice");
        pool.shutdown();

        assert_eq!(pool.acquire_free("bob"), None);
        pool.release(SurfaceSlot::Remote(0));
        assert_eq!(
            pool.state(SurfaceSlot::Remote(0)),
            Some(&SurfaceState::Released)
        );

        pool.reserve_local("me");
        assert_eq!(pool.state(SurfaceSlot::Local), Some(&SurfaceState::Released));
    }

    #[test]
    fn test_slot_display() {
        assert_eq!(SurfaceSlot::Local.to_string(), "local");
        assert_eq!(SurfaceSlot::Remote(3).to_string(), "remote-3");
    }
}

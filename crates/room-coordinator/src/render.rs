//! Surface renderer seam.
//!
//! The presentation layer implements [`SurfaceRenderer`] to show a video
//! track on one of the pool's slots. The coordinator decides which track goes
//! where; the renderer only draws.

use crate::errors::RenderError;
use crate::media::Track;
use crate::surfaces::SurfaceSlot;

/// Draws video tracks onto surface slots.
pub trait SurfaceRenderer: Send + Sync {
    /// Start rendering `track` on `slot`, mirrored horizontally if `mirror`.
    ///
    /// # Errors
    ///
    /// Returns `RenderError` if the surface cannot show the track. The
    /// coordinator then leaves the slot free and emits a notice.
    fn attach(&self, slot: SurfaceSlot, track: &Track, mirror: bool) -> Result<(), RenderError>;

    /// Stop rendering `track` on `slot`. Must tolerate tracks that are no
    /// longer attached.
    fn detach(&self, slot: SurfaceSlot, track: &Track);
}


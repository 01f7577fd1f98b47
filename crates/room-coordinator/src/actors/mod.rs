//! Actor implementation for the room coordinator.
//!
//! ```text
//! RoomCoordinatorHandle (cloneable, any task)
//!   │ mpsc + oneshot
//!   ▼
//! RoomCoordinatorActor (one per client)
//!   ├── owns SessionState, SurfacePool, BindingTable
//!   ├── consumes MediaSession events
//!   └── spawns token fetch / connect tasks per join generation
//! ```
//!
//! # Modules
//!
//! - [`coordinator`] - `RoomCoordinatorActor` and its handle
//! - [`messages`] - Message and snapshot types

pub mod coordinator;
pub mod messages;

pub use coordinator::{RoomCoordinatorActor, RoomCoordinatorHandle};
pub use messages::{CoordinatorMessage, CoordinatorSnapshot, SessionState};

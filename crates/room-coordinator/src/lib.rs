//! Room Coordinator Library
//!
//! Client-side coordination for joining hosted video rooms:
//!
//! - Backend login, room listing and room tokens ([`session_client`])
//! - Room membership state machine with join generations ([`actors`])
//! - Fixed pool of 1 local + N remote render surfaces ([`surfaces`])
//! - Identity to track/surface bindings ([`bindings`])
//! - Recovery from "camera enabled" racing "track published"
//!
//! # Architecture
//!
//! ```text
//! UI ──► SessionClient (login, rooms, token)
//!  │
//!  └──► RoomCoordinatorHandle ──► RoomCoordinatorActor
//!                                   ├── MediaSession (connect, events, camera/mic)
//!                                   └── SurfaceRenderer (attach/detach)
//! ```
//!
//! Media transport and rendering are external; the coordinator reaches them
//! through the [`media::MediaSession`] and [`render::SurfaceRenderer`] traits.
//!
//! # Modules
//!
//! - [`actors`] - Coordinator actor and handle
//! - [`config`] - Configuration from environment
//! - [`errors`] - Error types with user-safe messages
//! - [`observability`] - Metrics and notices

pub mod actors;
pub mod bindings;
pub mod config;
pub mod errors;
pub mod media;
pub mod observability;
pub mod render;
pub mod session_client;
pub mod surfaces;

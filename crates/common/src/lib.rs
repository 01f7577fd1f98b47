//! Common utilities and types shared across Viken Stream client components.

#![warn(clippy::pedantic)]

/// Module for secret types that prevent accidental logging
pub mod secret;

/// Module for bounded, fixed-interval retry policies
pub mod retry;

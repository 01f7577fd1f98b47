//! Secret types for credentials and tokens.
//!
//! Re-exports the [`secrecy`] types used across the client for passwords,
//! access tokens and room tokens. `SecretString` implements `Debug` with
//! redaction, so any struct that derives `Debug` and holds one is safe to log
//! through `{:?}` or `tracing`. The inner value is zeroized on drop.
//!
//! # Example
//!
//! ```rust
//! use common::secret::{ExposeSecret, SecretString};
//!
//! #[derive(Debug)]
//! struct LoginForm {
//!     username: String,
//!     password: SecretString,
//! }
//!
//! let form = LoginForm {
//!     username: "alice".to_string(),
//!     password: SecretString::from("hunter2"),
//! };
//!
//! assert!(!format!("{form:?}").contains("hunter2"));
//! assert_eq!(form.password.expose_secret(), "hunter2");
//! ```
//!
//! # Usage Guidelines
//!
//! Use `SecretString` for:
//! - User passwords
//! - Access tokens returned by `/login`
//! - Room-scoped media tokens returned by `/token`
//!
//! Tokens live only in process memory; nothing in the client persists them.

pub use secrecy::{ExposeSecret, SecretString};

/// Format a bearer `Authorization` header value for a token.
///
/// The returned string contains the raw token; hand it straight to the HTTP
/// client and never log it.
#[must_use]
pub fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

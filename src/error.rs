//! Error taxonomy for the admin console core.
//!
//! Three classes of failure, kept distinct so the presentation layer can
//! scope the message correctly:
//! - `Validation` — caught before any remote call; no remote side effect.
//! - `Remote` — the backend rejected a call (network, auth, or HTTP error).
//! - `Response` — the backend answered but the body did not match the
//!   endpoint's schema; treated as a degraded result, never a crash.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConsoleError {
    /// Pre-flight validation failed; no remote call was made.
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the call.
    #[error("{0}")]
    Remote(String),

    /// The backend's response did not match the expected schema.
    #[error("Unexpected response from backend: {0}")]
    Response(String),
}

impl ConsoleError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ConsoleError::Validation(msg.into())
    }

    pub fn remote(msg: impl Into<String>) -> Self {
        ConsoleError::Remote(msg.into())
    }

    pub fn response(msg: impl Into<String>) -> Self {
        ConsoleError::Response(msg.into())
    }

    /// True when no remote call was dispatched for this failure.
    pub fn is_validation(&self) -> bool {
        matches!(self, ConsoleError::Validation(_))
    }
}

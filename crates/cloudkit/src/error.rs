//! Error types for remote stack operations.
//!
//! Every remote failure carries the attempted operation and target stack in
//! its context string, so callers can propagate without re-wrapping. The
//! crate never retries a failed call itself; recoverability is the caller's
//! decision.

use thiserror::Error;

/// Errors that can occur while talking to the remote APIs.
#[derive(Debug, Error)]
pub enum Error {
    /// The request never completed (connection, TLS, timeout, DNS)
    #[error("{context}: {message}")]
    Transport {
        /// Operation and stack being attempted
        context: String,
        /// Underlying transport error text
        message: String,
    },

    /// Transport succeeded but the API rejected the request
    #[error("{context}: {message} (status {status})")]
    Api {
        /// Operation and stack being attempted
        context: String,
        /// HTTP status code returned
        status: u16,
        /// Error message from the API response body
        message: String,
    },

    /// The response arrived but could not be decoded
    #[error("{context}: unexpected response payload: {message}")]
    Payload {
        /// Operation and stack being attempted
        context: String,
        /// Decode failure detail
        message: String,
    },
}

impl Error {
    /// Build a transport error from any displayable source.
    pub fn transport(context: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Transport {
            context: context.into(),
            message: source.to_string(),
        }
    }

    /// Build an API-rejection error.
    pub fn api(context: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            context: context.into(),
            status,
            message: message.into(),
        }
    }

    /// Build a payload-decoding error.
    pub fn payload(context: impl Into<String>, source: impl std::fmt::Display) -> Self {
        Self::Payload {
            context: context.into(),
            message: source.to_string(),
        }
    }

    /// Whether the remote side reported the target as missing.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// Result type for remote stack operations.
pub type Result<T> = std::result::Result<T, Error>;

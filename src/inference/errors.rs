//! Inference error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured
//! logging is the caller's responsibility; these types carry the context
//! needed to build meaningful log entries.

use thiserror::Error;

/// Errors that can occur while talking to the inference backend.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// TCP/HTTP connection to the backend failed.
    #[error("connection failed to {endpoint}: {reason}")]
    ConnectionFailed { endpoint: String, reason: String },

    /// The backend did not respond within the configured timeout.
    #[error("inference timeout after {duration_secs}s")]
    Timeout { duration_secs: u64 },

    /// Non-2xx HTTP response from the backend.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The backend responded but the body could not be parsed.
    #[error("invalid response from {endpoint}: {reason}")]
    InvalidResponse { endpoint: String, reason: String },

    /// The HTTP client itself could not be constructed.
    #[error("failed to build HTTP client: {reason}")]
    ClientBuild { reason: String },
}

impl InferenceError {
    /// Whether this error indicates the backend is unreachable (as opposed
    /// to reachable-but-unhappy). Unreachable errors flip the session
    /// controller's connected flag so the next turn re-probes.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            InferenceError::ConnectionFailed { .. } | InferenceError::Timeout { .. }
        )
    }
}

//! Error types module
//!
//! All failures surfaced by the filevault client are unified under
//! [`ClientError`]. Validation problems are resolved before files enter the
//! upload queue; authentication failures escalate to session invalidation
//! and are never retried.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Client-side rejection before any network traffic (oversize file,
    /// disallowed type, malformed input).
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Transport-level failure: connection refused, timeout, DNS, TLS.
    #[error("Network error: {0}")]
    Network(String),

    /// HTTP 401. The session token has been invalidated; the caller must
    /// re-authenticate. Never retried.
    #[error("Authentication required: {0}")]
    Auth(String),

    /// Non-2xx response with the server's message body.
    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    /// The response did not match the wire contract (bad JSON, or an upload
    /// outcome count that differs from the number of submitted parts).
    #[error("Invalid response: {0}")]
    Decode(String),

    /// Illegal operation on queue state, e.g. removing an in-flight item.
    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl ClientError {
    /// Whether the failure could succeed on a retry. Auth and validation
    /// failures are terminal; transport and 5xx failures are not.
    pub fn is_recoverable(&self) -> bool {
        match self {
            ClientError::Network(_) => true,
            ClientError::Server { status, .. } => *status >= 500,
            ClientError::Validation(_)
            | ClientError::Auth(_)
            | ClientError::Decode(_)
            | ClientError::InvalidState(_) => false,
        }
    }
}

//! Errors raised while talking to the prompt-execution backend.

use thiserror::Error;

/// Result type alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Failure taxonomy of the completion pipeline.
///
/// Every variant except [`BackendError::Parse`] aborts the request. Parse
/// failures are recovered where they happen by skipping the offending frame.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Anonymous signup returned no token or no user id.
    #[error("Failed to get access token: {0}")]
    Auth(String),

    /// Prompt creation returned something other than a string id.
    #[error("Failed to register prompt: {0}")]
    Registration(String),

    /// Run initiation returned no run id or no jobs.
    #[error("Invalid response from initiate-prompt-run: {0}")]
    Initiation(String),

    /// HTTP or WebSocket call failed, including non-2xx responses.
    #[error("Upstream transport error: {0}")]
    Transport(String),

    /// A single upstream frame could not be decoded.
    #[error("Malformed upstream frame: {0}")]
    Parse(String),

    /// Client configuration is unusable (bad URL and similar).
    #[error("Invalid backend configuration: {0}")]
    Configuration(String),
}

impl BackendError {
    /// Build a transport error for a non-success HTTP status.
    pub fn http_status(status: u16, body: &str) -> Self {
        Self::Transport(format!("HTTP error! status: {status}, body: {body}"))
    }
}

//! Domain types for a single chat completion against the prompt runner.
//!
//! Every value here is owned by one request-handling flow. Nothing is cached
//! or shared between requests.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// Session
// =============================================================================

/// Short-lived credentials obtained from the anonymous signup endpoint.
///
/// A session is single-use: each inbound request acquires its own and drops
/// it when the request completes.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    /// Bearer token for the REST calls and the socket namespace connect.
    pub access_token: String,
    /// Opaque id of the anonymous user, stamped on runs as their creator.
    pub user_id: String,
}

impl Session {
    pub fn new(access_token: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            user_id: user_id.into(),
        }
    }
}

// Keep tokens out of logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("access_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .finish()
    }
}

// =============================================================================
// Messages
// =============================================================================

/// A chat message as received from the OpenAI-style request.
///
/// `content` is kept as raw JSON so both plain strings and content-part
/// arrays are forwarded to the backend untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user", "assistant", ...
    pub role: String,
    /// Message content (string or content-part array).
    #[serde(default)]
    pub content: serde_json::Value,
}

impl ChatMessage {
    /// Create a message with plain text content.
    pub fn text(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: serde_json::Value::String(content.into()),
        }
    }
}

// =============================================================================
// Runs
// =============================================================================

/// One unit of generation work within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
}

/// An execution attempt of a registered prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,
    #[serde(default)]
    pub jobs: Vec<Job>,
}

impl Run {
    /// The job whose chunks are streamed back to the caller.
    ///
    /// Runs may carry several jobs; only the first one is consumed.
    pub fn primary_job(&self) -> Option<&Job> {
        self.jobs.first()
    }
}

/// Identifies the chunk stream a bridge should follow and how to label its
/// output frames.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamTarget {
    /// Execution id to filter `execution:chunk` events on.
    pub job_id: String,
    /// Used as the `id` of every emitted chunk.
    pub run_id: String,
    /// Echoed back as the `model` of every emitted chunk.
    pub model: String,
}

// =============================================================================
// Execution chunks
// =============================================================================

/// Lifecycle state reported with every execution chunk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionStatus {
    InProgress,
    Completed,
    /// Unrecognised or missing status; the chunk still carries content.
    #[default]
    #[serde(other)]
    Unknown,
}

/// Payload of an `execution:chunk` socket event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionChunk {
    #[serde(rename = "executionId")]
    pub execution_id: String,
    #[serde(default)]
    pub status: ExecutionStatus,
    #[serde(default)]
    pub finish_reason: Option<String>,
    /// Text generated so far. See [`ContentMode`] for how it is interpreted.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

impl ExecutionChunk {
    pub fn is_completed(&self) -> bool {
        self.status == ExecutionStatus::Completed
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// How the runner's `content` field relates to earlier chunks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentMode {
    /// Every chunk carries the full text so far; deltas are the new suffix.
    #[default]
    Cumulative,
    /// Every chunk carries only newly generated text.
    Incremental,
}

impl ContentMode {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cumulative => "cumulative",
            Self::Incremental => "incremental",
        }
    }
}

impl fmt::Display for ContentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cumulative" => Ok(Self::Cumulative),
            "incremental" => Ok(Self::Incremental),
            other => Err(format!(
                "unknown content mode '{other}' (expected 'cumulative' or 'incremental')"
            )),
        }
    }
}

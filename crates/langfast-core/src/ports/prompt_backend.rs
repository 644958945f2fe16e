//! Prompt backend port: the four remote steps of one chat completion.

use std::pin::Pin;

use async_trait::async_trait;
use bytes::Bytes;
use futures_util::Stream;

use crate::domain::{ChatMessage, Run, Session, StreamTarget};
use crate::error::BackendResult;

/// Lazily produced `text/event-stream` bytes for one job.
///
/// The stream ends after the `[DONE]` frame, on upstream close, or on a
/// transport error. Dropping it closes the upstream channel.
pub type ChunkByteStream = Pin<Box<dyn Stream<Item = Result<Bytes, std::io::Error>> + Send>>;

/// Remote prompt-execution backend.
///
/// Each method performs exactly one remote call attempt; implementations must
/// not retry.
#[async_trait]
pub trait PromptBackendPort: Send + Sync {
    /// Create a fresh anonymous session. Never reused across requests.
    async fn acquire_session(&self) -> BackendResult<Session>;

    /// Register a prompt for `model` and `messages`, returning its id.
    async fn register_prompt(
        &self,
        session: &Session,
        model: &str,
        messages: &[ChatMessage],
    ) -> BackendResult<String>;

    /// Start a run of the registered prompt. The returned run has at least one job.
    async fn initiate_run(
        &self,
        session: &Session,
        prompt_id: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> BackendResult<Run>;

    /// Open the chunk channel for `target.job_id` and translate it into
    /// OpenAI event-stream frames.
    async fn open_chunk_stream(
        &self,
        session: &Session,
        target: &StreamTarget,
    ) -> BackendResult<ChunkByteStream>;
}

//! Core domain types and ports for the langfast bridge.
//!
//! This crate knows nothing about HTTP servers, sockets or reqwest. It defines
//! the values that flow through a chat completion (sessions, runs, execution
//! chunks, OpenAI chunk frames), the [`PromptBackendPort`] the proxy talks to,
//! and the static model catalog.

#![deny(unsafe_code)]

pub mod catalog;
pub mod domain;
pub mod error;
pub mod openai;
pub mod ports;

pub use catalog::{CatalogEntry, CatalogError, ModelCatalog};
pub use domain::{
    ChatMessage, ContentMode, ExecutionChunk, ExecutionStatus, Job, Run, Session, StreamTarget,
};
pub use error::{BackendError, BackendResult};
pub use openai::{ChatCompletionChunk, ChunkChoice, ChunkDelta, DONE_FRAME, SSE_DATA_PREFIX};
pub use ports::{ChunkByteStream, PromptBackendPort};

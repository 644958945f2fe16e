//! Port definitions (trait abstractions) for external systems.
//!
//! Ports define the interfaces that the proxy expects from infrastructure.
//! They contain no implementation details and use only domain types.

mod prompt_backend;

pub use prompt_backend::{ChunkByteStream, PromptBackendPort};

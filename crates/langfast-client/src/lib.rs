//! LangFast backend client.
//!
//! Implements [`langfast_core::PromptBackendPort`] on top of the Supabase
//! REST surface (signup, `create_prompt`, `initiate-prompt-run`) and the
//! Engine.IO chunk channel of the prompt runner.

#![deny(unsafe_code)]

mod bridge;
mod client;
mod config;
mod frame;
mod http;

// ============================================================================
// Public API
// ============================================================================

// Client
pub use client::{DefaultLangfastClient, LangfastClient};

// Configuration
pub use config::{
    DEFAULT_ANON_KEY, DEFAULT_MAX_COMPLETION_TOKENS, DEFAULT_RUNNER_URL, DEFAULT_SUPABASE_URL,
    LangfastClientConfig,
};

// Chunk bridge
pub use bridge::{BridgeStep, ChunkBridge, bridge_stream, open_chunk_stream};

// HTTP backend seam
pub use http::{HttpBackend, ReqwestBackend};

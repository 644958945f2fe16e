//! OpenAI-compatible front door for the LangFast prompt runner.
//!
//! Exposes `/v1/models` and `/v1/chat/completions` over axum and drives a
//! [`langfast_core::PromptBackendPort`] for every completion.

#![deny(unsafe_code)]

pub mod aggregate;
pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod server;

pub use config::ProxyConfig;
pub use error::ProxyError;
pub use server::{ProxyState, build_router, serve};

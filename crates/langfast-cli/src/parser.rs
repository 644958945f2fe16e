//! Command-line arguments. Every flag falls back to a `LANGFAST_*` variable.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use langfast_client::{
    DEFAULT_ANON_KEY, DEFAULT_MAX_COMPLETION_TOKENS, DEFAULT_RUNNER_URL, DEFAULT_SUPABASE_URL,
};
use langfast_core::ContentMode;

/// Serve the LangFast prompt runner behind an OpenAI-compatible API.
#[derive(Debug, Parser)]
#[command(name = "langfast")]
#[command(about = "OpenAI-compatible chat completions backed by LangFast")]
#[command(version)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "LANGFAST_LISTEN", default_value = "127.0.0.1:8787")]
    pub listen: SocketAddr,

    /// Model catalog JSON file (built-in list when omitted)
    #[arg(long, env = "LANGFAST_MODELS")]
    pub models: Option<PathBuf>,

    /// Bearer secret required on chat completions
    #[arg(long = "api-key", env = "LANGFAST_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Supabase project URL
    #[arg(long, env = "LANGFAST_SUPABASE_URL", default_value = DEFAULT_SUPABASE_URL)]
    pub supabase_url: String,

    /// Prompt runner URL (the Socket.IO endpoint)
    #[arg(long, env = "LANGFAST_RUNNER_URL", default_value = DEFAULT_RUNNER_URL)]
    pub runner_url: String,

    /// Supabase anonymous key
    #[arg(
        long,
        env = "LANGFAST_ANON_KEY",
        default_value = DEFAULT_ANON_KEY,
        hide_default_value = true,
        hide_env_values = true
    )]
    pub anon_key: String,

    /// Completion token limit sent with every run
    #[arg(long, env = "LANGFAST_MAX_TOKENS", default_value_t = DEFAULT_MAX_COMPLETION_TOKENS)]
    pub max_tokens: u32,

    /// How the runner reports content: cumulative or incremental
    #[arg(long, env = "LANGFAST_CONTENT_MODE", default_value_t = ContentMode::Cumulative)]
    pub content_mode: ContentMode,
}

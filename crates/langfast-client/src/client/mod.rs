//! LangFast client: the REST steps plus the chunk channel behind
//! [`PromptBackendPort`].

mod prompt;
mod run;
mod session;

use async_trait::async_trait;
use langfast_core::{
    BackendResult, ChatMessage, ChunkByteStream, PromptBackendPort, Run, Session, StreamTarget,
};

use crate::bridge;
use crate::config::LangfastClientConfig;
use crate::http::{HttpBackend, ReqwestBackend};

// ============================================================================
// Type Aliases
// ============================================================================

/// Default LangFast client using the reqwest HTTP backend.
pub type DefaultLangfastClient = LangfastClient<ReqwestBackend>;

// ============================================================================
// Client
// ============================================================================

/// Client for the LangFast prompt runner.
///
/// Generic over the HTTP backend so the REST steps can be tested against
/// canned responses. Use [`DefaultLangfastClient`] in production code.
pub struct LangfastClient<B: HttpBackend> {
    pub(crate) backend: B,
    pub(crate) config: LangfastClientConfig,
}

impl DefaultLangfastClient {
    /// Create a new client with the given configuration.
    pub fn new(config: LangfastClientConfig) -> BackendResult<Self> {
        let backend = ReqwestBackend::new(&config)?;
        Ok(Self { backend, config })
    }
}

impl<B: HttpBackend> LangfastClient<B> {
    /// Create a new client with a custom backend.
    #[cfg(test)]
    pub(crate) const fn with_backend(config: LangfastClientConfig, backend: B) -> Self {
        Self { backend, config }
    }

    pub const fn config(&self) -> &LangfastClientConfig {
        &self.config
    }
}

#[async_trait]
impl<B: HttpBackend> PromptBackendPort for LangfastClient<B> {
    async fn acquire_session(&self) -> BackendResult<Session> {
        self.signup().await
    }

    async fn register_prompt(
        &self,
        session: &Session,
        model: &str,
        messages: &[ChatMessage],
    ) -> BackendResult<String> {
        self.create_prompt(session, model, messages).await
    }

    async fn initiate_run(
        &self,
        session: &Session,
        prompt_id: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> BackendResult<Run> {
        self.start_run(session, prompt_id, model, messages).await
    }

    async fn open_chunk_stream(
        &self,
        session: &Session,
        target: &StreamTarget,
    ) -> BackendResult<ChunkByteStream> {
        bridge::open_chunk_stream(&self.config, session, target).await
    }
}

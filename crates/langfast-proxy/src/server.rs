//! Axum HTTP server for the OpenAI-compatible front door.
//!
//! This module provides the router and the `serve()` function that runs it
//! on a pre-bound `TcpListener` until cancelled.

use std::sync::Arc;

use axum::{
    Json, Router,
    body::{Body, Bytes},
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::Utc;
use langfast_core::{ChunkByteStream, ModelCatalog, PromptBackendPort};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::aggregate::aggregate_stream;
use crate::auth::authorize;
use crate::config::ProxyConfig;
use crate::error::ProxyError;
use crate::models::{ChatCompletionRequest, ChatCompletionResponse, ModelsResponse};
use crate::pipeline::open_completion_stream;

/// Shared application state for the front door.
#[derive(Clone)]
pub struct ProxyState {
    /// Backend that runs prompts.
    backend: Arc<dyn PromptBackendPort>,
    /// Models listed by `/v1/models`.
    catalog: Arc<ModelCatalog>,
    config: Arc<ProxyConfig>,
}

impl ProxyState {
    pub fn new(
        backend: Arc<dyn PromptBackendPort>,
        catalog: ModelCatalog,
        config: ProxyConfig,
    ) -> Self {
        Self {
            backend,
            catalog: Arc::new(catalog),
            config: Arc::new(config),
        }
    }
}

/// Build the front door router.
///
/// Every path and method outside the three routes answers `404`.
pub fn build_router(state: ProxyState) -> Router {
    Router::new()
        .route("/", get(root).fallback(not_found))
        .route("/v1/models", get(list_models).fallback(not_found))
        .route(
            "/v1/chat/completions",
            post(chat_completions).fallback(not_found),
        )
        .fallback(not_found)
        .with_state(state)
}

/// Start the front door with a pre-bound listener.
///
/// Runs until the cancellation token is triggered. In-flight streams are
/// allowed to finish.
pub async fn serve(
    listener: TcpListener,
    state: ProxyState,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let addr = listener.local_addr()?;
    info!(models = state.catalog.len(), "Proxy server starting on {addr}");

    let app = build_router(state);

    info!("Configure OpenAI clients to use: http://{addr}/v1");

    axum::serve(listener, app)
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await?;

    info!("Proxy server shut down");
    Ok(())
}

/// Liveness endpoint.
async fn root() -> &'static str {
    "OK"
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// List the static catalog in OpenAI format.
async fn list_models(State(state): State<ProxyState>) -> Json<ModelsResponse> {
    debug!("GET /v1/models");
    Json(ModelsResponse::from_catalog(&state.catalog))
}

/// Run one chat completion and answer streaming or aggregated.
async fn chat_completions(
    State(state): State<ProxyState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ProxyError> {
    debug!("POST /v1/chat/completions");

    authorize(&headers, state.config.api_key())?;

    let request: ChatCompletionRequest = serde_json::from_slice(&body)
        .map_err(|e| ProxyError::BadRequest(format!("Invalid request body: {e}")))?;
    if request.messages.is_empty() {
        return Err(ProxyError::BadRequest(
            "messages must contain at least one message".into(),
        ));
    }

    info!(
        model = %request.model,
        streaming = %request.stream,
        messages = request.messages.len(),
        "Processing chat completion request"
    );

    let stream =
        open_completion_stream(state.backend.as_ref(), &request.model, &request.messages).await?;

    if request.stream {
        return Ok(event_stream_response(stream));
    }

    let aggregate = aggregate_stream(stream).await;
    let now = Utc::now();
    let fallback_id = format!("chatcmpl-{}", now.timestamp_millis());
    let response =
        ChatCompletionResponse::from_aggregate(aggregate, &request.model, &fallback_id, now.timestamp());
    Ok(Json(response).into_response())
}

/// Forward bridge frames verbatim as an event stream.
fn event_stream_response(stream: ChunkByteStream) -> Response {
    Response::builder()
        .status(StatusCode::OK)
        .header("content-type", "text/event-stream")
        .header("cache-control", "no-cache")
        .header("connection", "keep-alive")
        .header("x-accel-buffering", "no")
        .body(Body::from_stream(stream))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

//! Front door errors and their HTTP mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use langfast_core::BackendError;
use thiserror::Error;
use tracing::error;

use crate::models::ErrorBody;

/// Errors returned by the proxy handlers.
#[derive(Debug, Error)]
pub enum ProxyError {
    /// Missing or wrong bearer token.
    #[error("Unauthorized")]
    Unauthorized,

    /// Request body rejected before any remote call.
    #[error("{0}")]
    BadRequest(String),

    /// A backend step failed.
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl ProxyError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Backend(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Chat completion failed: {self}");
        }
        (status, Json(ErrorBody::new(self.to_string()))).into_response()
    }
}

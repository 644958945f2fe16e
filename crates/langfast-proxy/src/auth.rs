//! Optional static bearer check.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;

use crate::error::ProxyError;

/// Accept the request when no secret is configured, or when the
/// `Authorization` header is exactly `Bearer <secret>`.
pub fn authorize(headers: &HeaderMap, secret: Option<&str>) -> Result<(), ProxyError> {
    let Some(secret) = secret else {
        return Ok(());
    };

    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    match token {
        Some(token) if token == secret => Ok(()),
        _ => Err(ProxyError::Unauthorized),
    }
}

//! HTTP backend abstraction for the Supabase REST surface.
//!
//! Every REST step of the pipeline is a JSON POST authorised with the
//! project's anonymous key plus a bearer token. This trait lets the session,
//! prompt and run steps be tested against canned responses.

use async_trait::async_trait;
use langfast_core::{BackendError, BackendResult};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use tracing::debug;

use crate::config::LangfastClientConfig;

// ============================================================================
// HTTP Backend Trait
// ============================================================================

/// Trait for HTTP backends that can POST JSON to the backend.
#[async_trait]
pub trait HttpBackend: Send + Sync {
    /// POST `body` to `url` with `bearer` as the authorization token.
    ///
    /// JSON responses are decoded; any other body is returned as a JSON
    /// string. Non-2xx statuses fail with [`BackendError::Transport`].
    async fn post_json(&self, url: &str, bearer: &str, body: &Value) -> BackendResult<Value>;
}

// ============================================================================
// Reqwest Backend
// ============================================================================

/// Production HTTP backend using reqwest. Requests are never retried.
pub struct ReqwestBackend {
    client: reqwest::Client,
    anon_key: String,
}

impl ReqwestBackend {
    /// Create a new reqwest backend with the given configuration.
    pub fn new(config: &LangfastClientConfig) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("langfast-client/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BackendError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            anon_key: config.anon_key.clone(),
        })
    }
}

#[async_trait]
impl HttpBackend for ReqwestBackend {
    async fn post_json(&self, url: &str, bearer: &str, body: &Value) -> BackendResult<Value> {
        debug!(url = %url, "POST");

        let response = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
            .json(body)
            .send()
            .await
            .map_err(|e| BackendError::Transport(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(BackendError::http_status(status.as_u16(), &text));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));

        let text = response
            .text()
            .await
            .map_err(|e| BackendError::Transport(format!("failed to read body from {url}: {e}")))?;

        decode_body(is_json, text)
    }
}

/// Interpret a successful response body.
fn decode_body(is_json: bool, text: String) -> BackendResult<Value> {
    if is_json {
        serde_json::from_str(&text)
            .map_err(|e| BackendError::Transport(format!("invalid JSON response: {e}")))
    } else {
        Ok(Value::String(text))
    }
}

// ============================================================================
// Fake Backend for Testing
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_json_body() {
        let value = decode_body(true, r#"{"run_id":"r"}"#.to_string()).unwrap();
        assert_eq!(value, json!({"run_id": "r"}));
    }

    #[test]
    fn test_decode_text_body() {
        let value = decode_body(false, "abc-123".to_string()).unwrap();
        assert_eq!(value, json!("abc-123"));
    }

    #[test]
    fn test_decode_invalid_json_is_transport_error() {
        let result = decode_body(true, "not json".to_string());
        assert!(matches!(result, Err(BackendError::Transport(_))));
    }

    #[test]
    fn test_reqwest_backend_creation() {
        let config = LangfastClientConfig::new().with_anon_key("anon");
        let backend = ReqwestBackend::new(&config).unwrap();
        assert_eq!(backend.anon_key, "anon");
    }

    mod fake_backend_tests {
        use super::super::testing::*;
        use super::*;

        #[tokio::test]
        async fn test_fake_backend_records_requests() {
            let backend = FakeBackend::new()
                .with_response("signup", CannedResponse::Ok(json!({"ok": true})));

            let value = backend
                .post_json("https://x/auth/v1/signup", "anon", &json!({}))
                .await
                .unwrap();

            assert_eq!(value["ok"], true);
            let requests = backend.requests();
            assert_eq!(requests.len(), 1);
            assert_eq!(requests[0].bearer, "anon");
        }

        #[tokio::test]
        async fn test_fake_backend_status_error() {
            let backend = FakeBackend::new()
                .with_response("rpc", CannedResponse::Status(500, "boom".into()));

            let result = backend.post_json("https://x/rest/v1/rpc/x", "t", &json!({})).await;
            assert!(matches!(result, Err(BackendError::Transport(msg)) if msg.contains("500")));
        }
    }
}

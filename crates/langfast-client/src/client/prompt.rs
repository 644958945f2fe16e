//! Prompt registration through the `create_prompt` RPC.

use chrono::Utc;
use langfast_core::{BackendError, BackendResult, ChatMessage, Session};
use serde_json::{Value, json};
use tracing::debug;

use crate::http::HttpBackend;

use super::LangfastClient;

/// The single variable-free test case attached to prompts and runs.
pub(crate) fn default_test_cases() -> Value {
    json!([{ "name": "API Test Case", "variables": [] }])
}

impl<B: HttpBackend> LangfastClient<B> {
    /// Register a prompt for `model` and `messages`, returning its id.
    pub(crate) async fn create_prompt(
        &self,
        session: &Session,
        model: &str,
        messages: &[ChatMessage],
    ) -> BackendResult<String> {
        let body = build_prompt_payload(model, messages, Utc::now().timestamp_millis());
        let response = self
            .backend
            .post_json(
                &self.config.create_prompt_url(),
                &session.access_token,
                &body,
            )
            .await?;

        let prompt_id = parse_prompt_id(response)?;
        debug!(prompt_id = %prompt_id, model = %model, "Registered prompt");
        Ok(prompt_id)
    }
}

fn build_prompt_payload(model: &str, messages: &[ChatMessage], now_millis: i64) -> Value {
    json!({
        "p_name": format!("api-{now_millis}"),
        "p_icon": "openai",
        "p_meta": {
            "model": model,
            "messages": messages,
            "stream": true,
        },
        "p_test_cases": default_test_cases(),
    })
}

fn parse_prompt_id(response: Value) -> BackendResult<String> {
    match response {
        Value::String(raw) => {
            let id = raw.trim().replace('"', "");
            if id.is_empty() {
                return Err(BackendError::Registration("prompt id is empty".into()));
            }
            Ok(id)
        }
        other => Err(BackendError::Registration(format!(
            "expected a string prompt_id, but got: {other}"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LangfastClientConfig;
    use crate::http::testing::{CannedResponse, FakeBackend};

    #[test]
    fn test_prompt_payload() {
        let messages = vec![ChatMessage::text("user", "hi")];
        let payload = build_prompt_payload("gpt-5", &messages, 1_700_000_000_123);

        assert_eq!(payload["p_name"], "api-1700000000123");
        assert_eq!(payload["p_icon"], "openai");
        assert_eq!(payload["p_meta"]["model"], "gpt-5");
        assert_eq!(payload["p_meta"]["stream"], true);
        assert_eq!(
            payload["p_meta"]["messages"],
            json!([{"role": "user", "content": "hi"}])
        );
        assert_eq!(
            payload["p_test_cases"],
            json!([{"name": "API Test Case", "variables": []}])
        );
    }

    #[test]
    fn test_parse_prompt_id_strips_quotes() {
        assert_eq!(parse_prompt_id(json!("abc-123")).unwrap(), "abc-123");
        assert_eq!(parse_prompt_id(json!(" \"abc-123\"\n")).unwrap(), "abc-123");
    }

    #[test]
    fn test_parse_prompt_id_rejects_non_strings() {
        for value in [json!({"id": "x"}), json!(42), json!(null), json!(["x"])] {
            assert!(matches!(
                parse_prompt_id(value),
                Err(BackendError::Registration(_))
            ));
        }
        assert!(matches!(
            parse_prompt_id(json!("\"\"")),
            Err(BackendError::Registration(_))
        ));
    }

    #[tokio::test]
    async fn test_create_prompt_uses_session_token() {
        let backend =
            FakeBackend::new().with_response("create_prompt", CannedResponse::Ok(json!("p-1")));
        let client = LangfastClient::with_backend(
            LangfastClientConfig::new().with_supabase_url("https://sb.test"),
            backend.clone(),
        );
        let session = Session::new("session-token", "user");

        let id = client
            .create_prompt(&session, "gpt-5", &[ChatMessage::text("user", "hi")])
            .await
            .unwrap();

        assert_eq!(id, "p-1");
        let requests = backend.requests();
        assert_eq!(requests[0].url, "https://sb.test/rest/v1/rpc/create_prompt");
        assert_eq!(requests[0].bearer, "session-token");
        assert!(
            requests[0].body["p_name"]
                .as_str()
                .unwrap()
                .starts_with("api-")
        );
    }
}

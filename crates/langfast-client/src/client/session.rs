//! Anonymous signup: one fresh session per request.

use langfast_core::{BackendError, BackendResult, Session};
use serde_json::{Value, json};
use tracing::debug;

use crate::http::HttpBackend;

use super::LangfastClient;

impl<B: HttpBackend> LangfastClient<B> {
    /// Sign up a new anonymous user and return its session.
    pub(crate) async fn signup(&self) -> BackendResult<Session> {
        let body = json!({ "data": {}, "gotrue_meta_security": {} });
        let response = self
            .backend
            .post_json(&self.config.signup_url(), &self.config.anon_key, &body)
            .await?;

        let session = parse_signup_response(&response)?;
        debug!(user_id = %session.user_id, "Acquired anonymous session");
        Ok(session)
    }
}

fn parse_signup_response(response: &Value) -> BackendResult<Session> {
    let access_token = response
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty());
    let user_id = response
        .pointer("/user/id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty());

    match (access_token, user_id) {
        (Some(token), Some(id)) => Ok(Session::new(token, id)),
        (None, _) => Err(BackendError::Auth("response has no access_token".into())),
        (_, None) => Err(BackendError::Auth("response has no user id".into())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LangfastClientConfig;
    use crate::http::testing::{CannedResponse, FakeBackend};

    #[test]
    fn test_parse_signup_response() {
        let session = parse_signup_response(&json!({
            "access_token": "tok",
            "token_type": "bearer",
            "user": {"id": "user-1", "is_anonymous": true}
        }))
        .unwrap();
        assert_eq!(session, Session::new("tok", "user-1"));
    }

    #[test]
    fn test_missing_token_or_user_fails() {
        let no_token = parse_signup_response(&json!({"user": {"id": "u"}}));
        assert!(matches!(no_token, Err(BackendError::Auth(msg)) if msg.contains("access_token")));

        let no_user = parse_signup_response(&json!({"access_token": "t"}));
        assert!(matches!(no_user, Err(BackendError::Auth(msg)) if msg.contains("user")));

        let empty = parse_signup_response(&json!({"access_token": "", "user": {"id": ""}}));
        assert!(matches!(empty, Err(BackendError::Auth(_))));
    }

    #[tokio::test]
    async fn test_signup_request_shape() {
        let backend = FakeBackend::new().with_response(
            "signup",
            CannedResponse::Ok(json!({"access_token": "tok", "user": {"id": "u"}})),
        );
        let client = LangfastClient::with_backend(
            LangfastClientConfig::new()
                .with_supabase_url("https://sb.test")
                .with_anon_key("anon-key"),
            backend.clone(),
        );

        client.signup().await.unwrap();

        let requests = backend.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://sb.test/auth/v1/signup");
        assert_eq!(requests[0].bearer, "anon-key");
        assert_eq!(
            requests[0].body,
            json!({"data": {}, "gotrue_meta_security": {}})
        );
    }

    #[tokio::test]
    async fn test_signup_http_error_is_transport() {
        let backend =
            FakeBackend::new().with_response("signup", CannedResponse::Status(429, "slow down".into()));
        let client = LangfastClient::with_backend(LangfastClientConfig::new(), backend);

        let result = client.signup().await;
        assert!(matches!(result, Err(BackendError::Transport(msg)) if msg.contains("429")));
    }
}

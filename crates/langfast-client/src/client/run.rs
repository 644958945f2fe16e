//! Run initiation through the `initiate-prompt-run` edge function.

use langfast_core::{BackendError, BackendResult, ChatMessage, Job, Run, Session};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info};
use uuid::Uuid;

use crate::http::HttpBackend;

use super::LangfastClient;
use super::prompt::default_test_cases;

/// Parameters of one run request.
struct RunRequest<'a> {
    run_id: &'a str,
    prompt_id: &'a str,
    model: &'a str,
    messages: &'a [ChatMessage],
    max_completion_tokens: u32,
    created_by: &'a str,
}

impl<B: HttpBackend> LangfastClient<B> {
    /// Start a run of `prompt_id` and return it with its jobs.
    pub(crate) async fn start_run(
        &self,
        session: &Session,
        prompt_id: &str,
        model: &str,
        messages: &[ChatMessage],
    ) -> BackendResult<Run> {
        let run_id = Uuid::new_v4().to_string();
        let body = build_run_payload(&RunRequest {
            run_id: &run_id,
            prompt_id,
            model,
            messages,
            max_completion_tokens: self.config.max_completion_tokens,
            created_by: &session.user_id,
        });

        let response = self
            .backend
            .post_json(
                &self.config.initiate_run_url(),
                &session.access_token,
                &body,
            )
            .await?;

        let run = parse_run_response(response)?;
        if run.jobs.len() > 1 {
            info!(
                run_id = %run.run_id,
                jobs = run.jobs.len(),
                "Run has several jobs, streaming only the first"
            );
        }
        debug!(run_id = %run.run_id, prompt_id = %prompt_id, "Initiated run");
        Ok(run)
    }
}

fn build_run_payload(request: &RunRequest<'_>) -> Value {
    json!({
        "run_id": request.run_id,
        "prompt_id": request.prompt_id,
        "prompt_meta": {
            "model": request.model,
            "messages": request.messages,
            "max_completion_tokens": request.max_completion_tokens,
            "stream": true,
            "response_format": "text",
        },
        "test_cases": default_test_cases(),
        "created_by": request.created_by,
    })
}

/// Lenient view of the response so missing fields map to `Initiation`.
#[derive(Deserialize)]
struct RawRunResponse {
    #[serde(default)]
    run_id: Option<String>,
    #[serde(default)]
    jobs: Option<Vec<Job>>,
}

fn parse_run_response(response: Value) -> BackendResult<Run> {
    let raw: RawRunResponse = serde_json::from_value(response)
        .map_err(|e| BackendError::Initiation(format!("unexpected response shape: {e}")))?;

    let run_id = raw
        .run_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| BackendError::Initiation("response has no run_id".into()))?;
    let jobs = raw
        .jobs
        .filter(|jobs| !jobs.is_empty())
        .ok_or_else(|| BackendError::Initiation("response has no jobs".into()))?;

    Ok(Run { run_id, jobs })
}

//! One chat completion against the backend: session, prompt, run, then the
//! chunk stream of the run's first job.

use langfast_core::{
    BackendError, BackendResult, ChatMessage, ChunkByteStream, PromptBackendPort, StreamTarget,
};
use tracing::debug;

/// Run every backend step once, in order, and open the chunk stream.
///
/// Nothing is retried. The session lives only as long as this call plus the
/// returned stream.
pub async fn open_completion_stream(
    backend: &dyn PromptBackendPort,
    model: &str,
    messages: &[ChatMessage],
) -> BackendResult<ChunkByteStream> {
    let session = backend.acquire_session().await?;
    let prompt_id = backend.register_prompt(&session, model, messages).await?;
    let run = backend
        .initiate_run(&session, &prompt_id, model, messages)
        .await?;

    let job = run
        .primary_job()
        .ok_or_else(|| BackendError::Initiation("run has no jobs".into()))?;
    let target = StreamTarget {
        job_id: job.job_id.clone(),
        run_id: run.run_id.clone(),
        model: model.to_string(),
    };
    debug!(run_id = %target.run_id, job_id = %target.job_id, "Opening chunk stream");

    backend.open_chunk_stream(&session, &target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bytes::Bytes;
    use futures_util::StreamExt;
    use langfast_core::{Job, Run, Session};
    use mockall::mock;
    use mockall::predicate::eq;

    mock! {
        pub Backend {}

        #[async_trait]
        impl PromptBackendPort for Backend {
            async fn acquire_session(&self) -> BackendResult<Session>;
            async fn register_prompt(
                &self,
                session: &Session,
                model: &str,
                messages: &[ChatMessage],
            ) -> BackendResult<String>;
            async fn initiate_run(
                &self,
                session: &Session,
                prompt_id: &str,
                model: &str,
                messages: &[ChatMessage],
            ) -> BackendResult<Run>;
            async fn open_chunk_stream(
                &self,
                session: &Session,
                target: &StreamTarget,
            ) -> BackendResult<ChunkByteStream>;
        }
    }

    fn session() -> Session {
        Session::new("tok", "user-1")
    }

    fn run_with_jobs(jobs: &[&str]) -> Run {
        Run {
            run_id: "run-1".to_string(),
            jobs: jobs
                .iter()
                .map(|id| Job {
                    job_id: (*id).to_string(),
                })
                .collect(),
        }
    }

    #[tokio::test]
    async fn test_steps_run_once_in_order_with_first_job() {
        let mut backend = MockBackend::new();
        let mut seq = mockall::Sequence::new();

        backend
            .expect_acquire_session()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(session()));
        backend
            .expect_register_prompt()
            .withf(|s, model, messages| {
                s.access_token == "tok" && model == "gpt-5" && messages.len() == 1
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _| Ok("prompt-1".to_string()));
        backend
            .expect_initiate_run()
            .withf(|_, prompt_id, model, _| prompt_id == "prompt-1" && model == "gpt-5")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _, _, _| Ok(run_with_jobs(&["job-a", "job-b"])));
        backend
            .expect_open_chunk_stream()
            .with(
                eq(session()),
                eq(StreamTarget {
                    job_id: "job-a".to_string(),
                    run_id: "run-1".to_string(),
                    model: "gpt-5".to_string(),
                }),
            )
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| {
                let items: Vec<Result<Bytes, std::io::Error>> = vec![Ok(Bytes::from("x"))];
                let stream: ChunkByteStream = Box::pin(futures_util::stream::iter(items));
                Ok(stream)
            });

        let messages = [ChatMessage::text("user", "hi")];
        let stream = open_completion_stream(&backend, "gpt-5", &messages)
            .await
            .unwrap();
        let items: Vec<_> = stream.collect().await;
        assert_eq!(items.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_stops_the_flow_without_retry() {
        let mut backend = MockBackend::new();
        backend
            .expect_acquire_session()
            .times(1)
            .returning(|| Ok(session()));
        backend
            .expect_register_prompt()
            .times(1)
            .returning(|_, _, _| Err(BackendError::Registration("bad".into())));
        backend.expect_initiate_run().times(0);
        backend.expect_open_chunk_stream().times(0);

        let result =
            open_completion_stream(&backend, "gpt-5", &[ChatMessage::text("user", "hi")]).await;
        assert!(matches!(result, Err(BackendError::Registration(_))));
    }

    #[tokio::test]
    async fn test_run_without_jobs_is_initiation_error() {
        let mut backend = MockBackend::new();
        backend
            .expect_acquire_session()
            .returning(|| Ok(session()));
        backend
            .expect_register_prompt()
            .returning(|_, _, _| Ok("p".to_string()));
        backend
            .expect_initiate_run()
            .returning(|_, _, _, _| Ok(run_with_jobs(&[])));
        backend.expect_open_chunk_stream().times(0);

        let result =
            open_completion_stream(&backend, "gpt-5", &[ChatMessage::text("user", "hi")]).await;
        assert!(matches!(result, Err(BackendError::Initiation(_))));
    }
}

//! Socket.IO chunk channel → OpenAI event-stream bridge.
//!
//! The prompt runner pushes `execution:chunk` events over an Engine.IO
//! WebSocket, each carrying the full text generated so far. The bridge keeps
//! the previously seen content for one job, turns every chunk into a
//! `chat.completion.chunk` frame holding only the new suffix, and ends with
//! `data: [DONE]` once the runner reports the job completed.
//!
//! [`ChunkBridge`] is the synchronous state machine; [`bridge_stream`] drives
//! it from a socket and yields the frames lazily.

use std::collections::VecDeque;

use bytes::Bytes;
use chrono::Utc;
use futures_util::{Sink, SinkExt, Stream, StreamExt};
use langfast_core::{
    BackendError, BackendResult, ChatCompletionChunk, ChunkByteStream, ContentMode, DONE_FRAME,
    ExecutionChunk, Session, StreamTarget,
};
use serde_json::Value;
use tokio_tungstenite::tungstenite::{self, Message};
use tracing::{debug, info, warn};
use url::Url;

use crate::config::LangfastClientConfig;
use crate::frame::{EXECUTION_CHUNK_EVENT, EnginePacket, PONG_FRAME, connect_frame, parse_event};

// =============================================================================
// State machine
// =============================================================================

/// Outcome of feeding one inbound text frame to the bridge.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct BridgeStep {
    /// Event-stream frames to emit, in order.
    pub frames: Vec<Bytes>,
    /// Frame to send back on the socket (heartbeat pong).
    pub reply: Option<String>,
    /// The bridge reached a terminal state; close the channel.
    pub finished: bool,
}

/// Per-job delta tracker and frame builder.
///
/// One instance per job and per channel. Delta state starts empty and is
/// never shared between requests.
#[derive(Debug)]
pub struct ChunkBridge {
    target: StreamTarget,
    mode: ContentMode,
    previous_content: String,
    finished: bool,
}

impl ChunkBridge {
    pub const fn new(target: StreamTarget, mode: ContentMode) -> Self {
        Self {
            target,
            mode,
            previous_content: String::new(),
            finished: false,
        }
    }

    #[cfg(test)]
    pub(crate) const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Full text reconstructed so far.
    #[cfg(test)]
    pub(crate) fn content(&self) -> &str {
        &self.previous_content
    }

    /// Feed one inbound socket text frame.
    ///
    /// Frames for other jobs, other events and malformed payloads produce an
    /// empty step. Nothing is emitted once the bridge has finished.
    pub fn handle_text(&mut self, text: &str) -> BridgeStep {
        if self.finished {
            return BridgeStep {
                finished: true,
                ..BridgeStep::default()
            };
        }

        let mut step = BridgeStep::default();
        match EnginePacket::parse(text) {
            EnginePacket::Event(payload) => match self.handle_event(payload) {
                Ok(frames) => step.frames = frames,
                Err(e) => warn!(job_id = %self.target.job_id, "Skipping chunk frame: {e}"),
            },
            EnginePacket::Ping(_) => step.reply = Some(PONG_FRAME.to_string()),
            EnginePacket::Open(handshake) => debug!(handshake = %handshake, "Engine.IO open"),
            EnginePacket::Connect(_) => debug!(job_id = %self.target.job_id, "Namespace connected"),
            EnginePacket::ConnectError(reason) => {
                warn!(job_id = %self.target.job_id, reason = %reason, "Namespace connect refused");
                self.finished = true;
            }
            EnginePacket::Close | EnginePacket::Disconnect => {
                debug!(job_id = %self.target.job_id, "Runner closed the namespace");
                self.finished = true;
            }
            EnginePacket::Pong | EnginePacket::Other(_) => {}
        }
        step.finished = self.finished;
        step
    }

    fn handle_event(&mut self, payload: &str) -> BackendResult<Vec<Bytes>> {
        let (name, data) = parse_event(payload)?;
        if name != EXECUTION_CHUNK_EVENT {
            return Ok(Vec::new());
        }
        if data.get("executionId").and_then(Value::as_str) != Some(self.target.job_id.as_str()) {
            return Ok(Vec::new());
        }

        let chunk: ExecutionChunk = serde_json::from_value(data)
            .map_err(|e| BackendError::Parse(format!("invalid execution chunk: {e}")))?;
        Ok(self.apply_chunk(&chunk))
    }

    /// Turn one accepted chunk into its delta frame, followed by the
    /// terminator when the chunk completes the job.
    pub fn apply_chunk(&mut self, chunk: &ExecutionChunk) -> Vec<Bytes> {
        let delta = self.next_delta(&chunk.content);
        let frame = ChatCompletionChunk::content_delta(
            self.target.run_id.as_str(),
            self.target.model.as_str(),
            Utc::now().timestamp(),
            delta,
            chunk.finish_reason.clone(),
        );

        let mut frames = Vec::with_capacity(2);
        match frame.to_sse_frame() {
            Ok(sse) => frames.push(Bytes::from(sse)),
            Err(e) => warn!(job_id = %self.target.job_id, "Failed to serialize chunk: {e}"),
        }

        if chunk.is_completed() {
            frames.push(Bytes::from_static(DONE_FRAME.as_bytes()));
            self.finished = true;
        }
        frames
    }

    /// Content appended since the previous chunk.
    ///
    /// Cumulative content is assumed to only ever grow. A chunk that is not a
    /// prefix extension of the previous one yields a wrong (possibly empty)
    /// delta rather than an error.
    fn next_delta(&mut self, content: &str) -> String {
        match self.mode {
            ContentMode::Cumulative => {
                let delta = content
                    .get(self.previous_content.len()..)
                    .unwrap_or_default()
                    .to_string();
                self.previous_content.clear();
                self.previous_content.push_str(content);
                delta
            }
            ContentMode::Incremental => {
                self.previous_content.push_str(content);
                content.to_string()
            }
        }
    }
}

// =============================================================================
// Channel driver
// =============================================================================

/// Build the Engine.IO WebSocket URL from the runner base URL.
pub(crate) fn socket_url(runner_url: &str) -> BackendResult<Url> {
    let mut url = Url::parse(runner_url)
        .map_err(|e| BackendError::Configuration(format!("invalid runner URL '{runner_url}': {e}")))?;

    let scheme = match url.scheme() {
        "http" | "ws" => "ws",
        "https" | "wss" => "wss",
        other => {
            return Err(BackendError::Configuration(format!(
                "unsupported runner URL scheme '{other}'"
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|()| BackendError::Configuration(format!("cannot use scheme '{scheme}'")))?;
    url.set_path("/socket.io/");
    url.set_query(Some("EIO=4&transport=websocket"));
    Ok(url)
}

/// Connect to the runner, join the namespace with the session token and
/// return the bridged frame stream for `target`.
///
/// Connection and handshake failures are returned here. Failures after this
/// point end the stream without an error item.
pub async fn open_chunk_stream(
    config: &LangfastClientConfig,
    session: &Session,
    target: &StreamTarget,
) -> BackendResult<ChunkByteStream> {
    let url = socket_url(&config.runner_url)?;
    info!(job_id = %target.job_id, run_id = %target.run_id, "Opening chunk channel");

    let (mut ws, _) = tokio_tungstenite::connect_async(url.as_str())
        .await
        .map_err(|e| BackendError::Transport(format!("WebSocket connection failed: {e}")))?;

    ws.send(Message::Text(connect_frame(&session.access_token).into()))
        .await
        .map_err(|e| BackendError::Transport(format!("WebSocket connect frame failed: {e}")))?;

    let bridge = ChunkBridge::new(target.clone(), config.content_mode);
    Ok(Box::pin(bridge_stream(ws, bridge)))
}

/// State threaded through the `unfold` stream.
struct ChannelState<W> {
    ws: W,
    bridge: ChunkBridge,
    pending: VecDeque<Bytes>,
    closed: bool,
}

impl<W> ChannelState<W>
where
    W: Sink<Message, Error = tungstenite::Error> + Unpin,
{
    async fn close(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        if let Err(e) = SinkExt::close(&mut self.ws).await {
            debug!("Closing chunk channel failed: {e}");
        }
    }
}

/// Drive `bridge` from socket `ws`, yielding event-stream frames in arrival
/// order.
///
/// Dropping the returned stream drops the socket, which closes the
/// underlying connection.
pub fn bridge_stream<W>(
    ws: W,
    bridge: ChunkBridge,
) -> impl Stream<Item = Result<Bytes, std::io::Error>> + Send + 'static
where
    W: Stream<Item = Result<Message, tungstenite::Error>>
        + Sink<Message, Error = tungstenite::Error>
        + Unpin
        + Send
        + 'static,
{
    let state = ChannelState {
        ws,
        bridge,
        pending: VecDeque::new(),
        closed: false,
    };

    futures_util::stream::unfold(state, |mut st| async move {
        loop {
            if let Some(frame) = st.pending.pop_front() {
                return Some((Ok(frame), st));
            }
            if st.closed {
                return None;
            }

            match st.ws.next().await {
                Some(Ok(Message::Text(text))) => {
                    let step = st.bridge.handle_text(text.as_str());
                    st.pending.extend(step.frames);
                    if let Some(reply) = step.reply
                        && let Err(e) = st.ws.send(Message::Text(reply.into())).await
                    {
                        warn!("Failed to answer runner heartbeat: {e}");
                        st.closed = true;
                    }
                    if step.finished {
                        st.close().await;
                    }
                }
                Some(Ok(Message::Close(frame))) => {
                    debug!(?frame, "Chunk channel closed by runner");
                    st.closed = true;
                }
                // Binary frames are unused; ping/pong is answered by tungstenite.
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Chunk channel error: {e}");
                    st.closed = true;
                }
                None => st.closed = true,
            }
        }
    })
}

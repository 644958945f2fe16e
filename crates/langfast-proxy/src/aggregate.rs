//! Collapse a chunk frame stream into one non-streaming completion.
//!
//! Bridge frames always carry incremental deltas, so the aggregator appends
//! every delta in arrival order.

use futures_util::StreamExt;
use langfast_core::{ChatCompletionChunk, ChunkByteStream, SSE_DATA_PREFIX};
use tracing::{debug, warn};

const DEFAULT_FINISH_REASON: &str = "stop";
const FRAME_DELIMITER: &[u8] = b"\n\n";

/// Final state of an aggregated stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionAggregate {
    /// Id of the first parsed chunk.
    pub id: Option<String>,
    pub content: String,
    /// Last non-null finish reason, `"stop"` if none was seen.
    pub finish_reason: String,
}

/// Incremental event-stream parser.
///
/// Bytes may arrive split anywhere, including inside a UTF-8 sequence, so
/// input is buffered until a blank-line delimiter completes a frame.
#[derive(Debug, Default)]
pub struct SseAggregator {
    buffer: Vec<u8>,
    id: Option<String>,
    content: String,
    finish_reason: Option<String>,
}

impl SseAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed raw bytes, consuming every complete frame.
    pub fn push(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
        while let Some(end) = find_delimiter(&self.buffer) {
            let frame: Vec<u8> = self.buffer.drain(..end + FRAME_DELIMITER.len()).collect();
            self.consume_frame(&frame[..end]);
        }
    }

    /// Flush any trailing frame and return the result.
    pub fn finish(mut self) -> CompletionAggregate {
        if !self.buffer.is_empty() {
            let rest = std::mem::take(&mut self.buffer);
            self.consume_frame(&rest);
        }

        CompletionAggregate {
            id: self.id,
            content: self.content,
            finish_reason: self
                .finish_reason
                .unwrap_or_else(|| DEFAULT_FINISH_REASON.to_string()),
        }
    }

    fn consume_frame(&mut self, frame: &[u8]) {
        let Ok(text) = std::str::from_utf8(frame) else {
            debug!("Skipping non UTF-8 frame");
            return;
        };

        for line in text.lines() {
            let Some(payload) = line.strip_prefix(SSE_DATA_PREFIX) else {
                continue;
            };
            let payload = payload.trim();
            if payload == "[DONE]" {
                continue;
            }
            match serde_json::from_str::<ChatCompletionChunk>(payload) {
                Ok(chunk) => self.apply(&chunk),
                Err(e) => debug!("Skipping unparsable frame: {e}"),
            }
        }
    }

    fn apply(&mut self, chunk: &ChatCompletionChunk) {
        if self.id.is_none() {
            self.id = Some(chunk.id.clone());
        }
        if let Some(content) = chunk.first_content() {
            self.content.push_str(content);
        }
        if let Some(reason) = chunk.first_finish_reason() {
            self.finish_reason = Some(reason.to_string());
        }
    }
}

fn find_delimiter(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(FRAME_DELIMITER.len())
        .position(|window| window == FRAME_DELIMITER)
}

/// Drain `stream` to the end and aggregate its frames.
///
/// A transport error ends the stream early; whatever arrived before it is
/// still returned.
pub async fn aggregate_stream(mut stream: ChunkByteStream) -> CompletionAggregate {
    let mut aggregator = SseAggregator::new();
    while let Some(item) = stream.next().await {
        match item {
            Ok(bytes) => aggregator.push(&bytes),
            Err(e) => {
                warn!("Chunk stream failed during aggregation: {e}");
                break;
            }
        }
    }
    aggregator.finish()
}

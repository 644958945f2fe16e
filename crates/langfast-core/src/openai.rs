//! OpenAI streaming chunk types shared by the bridge (which emits them) and
//! the proxy (which aggregates them).

use serde::{Deserialize, Serialize};

/// Terminator frame closing every event stream.
pub const DONE_FRAME: &str = "data: [DONE]\n\n";

/// Prefix of every event-stream data line.
pub const SSE_DATA_PREFIX: &str = "data: ";

/// Streaming chunk of `/v1/chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionChunk {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChunkChoice>,
}

/// A single streaming choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkChoice {
    #[serde(default)]
    pub index: u32,
    #[serde(default)]
    pub delta: ChunkDelta,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

/// Delta content in a streaming chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChunkDelta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionChunk {
    /// Build a single-choice content chunk.
    pub fn content_delta(
        id: impl Into<String>,
        model: impl Into<String>,
        created: i64,
        content: impl Into<String>,
        finish_reason: Option<String>,
    ) -> Self {
        Self {
            id: id.into(),
            object: "chat.completion.chunk".to_string(),
            created,
            model: model.into(),
            choices: vec![ChunkChoice {
                index: 0,
                delta: ChunkDelta {
                    role: None,
                    content: Some(content.into()),
                },
                finish_reason,
            }],
        }
    }

    /// Serialize as one `data: <json>\n\n` event-stream frame.
    pub fn to_sse_frame(&self) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(format!("{SSE_DATA_PREFIX}{json}\n\n"))
    }

    /// Content of the first choice's delta, if any.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.delta.content.as_deref()
    }

    /// Finish reason of the first choice, if any.
    pub fn first_finish_reason(&self) -> Option<&str> {
        self.choices.first()?.finish_reason.as_deref()
    }
}

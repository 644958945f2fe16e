//! OpenAI API data models for the front door.
//!
//! Chunk frames are shared with the bridge and live in `langfast-core`;
//! this module holds the request, the aggregated response and the model list.

use langfast_core::{ChatMessage, ModelCatalog};
use serde::{Deserialize, Deserializer, Serialize};

use crate::aggregate::CompletionAggregate;

// =============================================================================
// Chat Completion Request/Response Types
// =============================================================================

/// Request to the `/v1/chat/completions` endpoint.
///
/// Sampling parameters are accepted and ignored; the runner applies its own.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model slug to run.
    pub model: String,
    /// Conversation, forwarded to the runner unchanged.
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    /// Whether to stream the response. `null` means no.
    #[serde(default, deserialize_with = "null_as_false")]
    pub stream: bool,
}

fn null_as_false<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

/// Response from `/v1/chat/completions` (non-streaming).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: String,
    pub object: String,
    pub created: i64,
    pub model: String,
    pub choices: Vec<ChatChoice>,
}

/// A single completion choice.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatChoice {
    pub index: u32,
    pub message: AssistantMessage,
    pub finish_reason: String,
}

/// The assistant's reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub role: String,
    pub content: String,
}

impl ChatCompletionResponse {
    /// Wrap an aggregated stream into a `chat.completion` object.
    ///
    /// `fallback_id` is used when the stream carried no chunk at all.
    pub fn from_aggregate(
        aggregate: CompletionAggregate,
        model: &str,
        fallback_id: &str,
        created: i64,
    ) -> Self {
        Self {
            id: aggregate.id.unwrap_or_else(|| fallback_id.to_string()),
            object: "chat.completion".to_string(),
            created,
            model: model.to_string(),
            choices: vec![ChatChoice {
                index: 0,
                message: AssistantMessage {
                    role: "assistant".to_string(),
                    content: aggregate.content,
                },
                finish_reason: aggregate.finish_reason,
            }],
        }
    }
}

// =============================================================================
// Model List Types
// =============================================================================

/// Response from `/v1/models`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelsResponse {
    pub object: String,
    pub data: Vec<ModelInfo>,
}

/// A model entry in OpenAI format.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub object: String,
    /// Unix seconds.
    pub created: i64,
    pub owned_by: String,
}

impl ModelsResponse {
    pub fn from_catalog(catalog: &ModelCatalog) -> Self {
        let data = catalog
            .entries()
            .iter()
            .map(|entry| ModelInfo {
                id: entry.slug.clone(),
                object: "model".to_string(),
                created: entry.created_secs(),
                owned_by: entry.provider.clone(),
            })
            .collect();

        Self {
            object: "list".to_string(),
            data,
        }
    }
}

// =============================================================================
// Errors
// =============================================================================

/// JSON error body: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use langfast_core::CatalogEntry;
    use serde_json::json;

    #[test]
    fn test_request_defaults() {
        let request: ChatCompletionRequest =
            serde_json::from_value(json!({"model": "gpt-5", "temperature": 0.2})).unwrap();
        assert_eq!(request.model, "gpt-5");
        assert!(request.messages.is_empty());
        assert!(!request.stream);
    }

    #[test]
    fn test_request_null_stream_is_false() {
        let request: ChatCompletionRequest = serde_json::from_value(json!({
            "model": "gpt-5",
            "messages": [{"role": "user", "content": "hi"}],
            "stream": null
        }))
        .unwrap();
        assert!(!request.stream);
    }

    #[test]
    fn test_request_requires_model() {
        let result: Result<ChatCompletionRequest, _> =
            serde_json::from_value(json!({"messages": []}));
        assert!(result.is_err());
    }

    #[test]
    fn test_models_response_from_catalog() {
        let catalog = ModelCatalog::new(vec![
            CatalogEntry {
                slug: "gpt-5".to_string(),
                provider: "openai".to_string(),
                created_at: 1_754_524_800_999,
            },
            CatalogEntry {
                slug: "claude".to_string(),
                provider: "anthropic".to_string(),
                created_at: 1_000,
            },
        ]);

        let response = ModelsResponse::from_catalog(&catalog);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["object"], "list");
        assert_eq!(value["data"].as_array().unwrap().len(), 2);
        assert_eq!(
            value["data"][0],
            json!({"id": "gpt-5", "object": "model", "created": 1_754_524_800, "owned_by": "openai"})
        );
        assert_eq!(value["data"][1]["created"], 1);
    }

    #[test]
    fn test_response_from_aggregate() {
        let aggregate = CompletionAggregate {
            id: None,
            content: "Hello".to_string(),
            finish_reason: "stop".to_string(),
        };
        let response = ChatCompletionResponse::from_aggregate(aggregate, "gpt-5", "fallback", 7);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(
            value,
            json!({
                "id": "fallback",
                "object": "chat.completion",
                "created": 7,
                "model": "gpt-5",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hello"},
                    "finish_reason": "stop"
                }]
            })
        );
    }
}

//! Shared data models for backend requests and responses.

use serde::{Deserialize, Serialize};

use crate::client::ClientError;

/// Response envelope every non-streaming backend endpoint wraps its
/// payload in. Business status is carried in `code`, not the HTTP status.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub code: String,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// Codes the backend uses for a successful call.
    fn is_ok(&self) -> bool {
        self.code == "0" || self.code == "200"
    }

    /// Unwrap the envelope, mapping a non-success business code to
    /// [`ClientError::Api`]. Endpoints that return no payload yield `None`.
    pub fn into_result(self) -> Result<Option<T>, ClientError> {
        if self.is_ok() {
            Ok(self.data)
        } else {
            Err(ClientError::Api {
                code: self.code,
                message: self.msg.unwrap_or_default(),
            })
        }
    }

    /// Like [`into_result`](Self::into_result) but for endpoints whose
    /// success payload is mandatory.
    pub fn into_data(self) -> Result<T, ClientError> {
        self.into_result()?.ok_or(ClientError::MissingData)
    }
}

/// Role of a chat message sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    System,
}

/// One persisted message of a conversation's history.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    #[serde(default)]
    pub id: Option<i64>,
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub create_time: Option<String>,
}

/// Request body for both the plain and the streaming chat endpoint.
///
/// `conversation_id` continues an existing conversation; omitting it asks
/// the backend to open a new one and report its id back in the stream.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,

    /// Enable retrieval-augmented generation for this turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_rag: Option<bool>,

    /// Number of documents to retrieve when RAG is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rag_top_k: Option<u32>,

    /// Override the backend's default sampling temperature (0.0 - 2.0).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_temperature: Option<f32>,

    /// Override the backend's default generation length limit.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_max_tokens: Option<u32>,

    /// Whether the backend should include prior turns as context.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_memory: Option<bool>,
}

impl ChatRequest {
    /// Create a request for a new conversation.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            conversation_id: None,
            enable_rag: None,
            rag_top_k: None,
            custom_temperature: None,
            custom_max_tokens: None,
            enable_memory: None,
        }
    }

    /// Continue an existing conversation.
    pub fn with_conversation(mut self, conversation_id: impl Into<String>) -> Self {
        self.conversation_id = Some(conversation_id.into());
        self
    }

    /// Enable retrieval-augmented generation.
    pub fn with_rag(mut self, top_k: Option<u32>) -> Self {
        self.enable_rag = Some(true);
        self.rag_top_k = top_k;
        self
    }

    /// Override the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.custom_temperature = Some(temperature);
        self
    }

    /// Override the maximum generated tokens.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.custom_max_tokens = Some(max_tokens);
        self
    }
}

/// Decoded JSON payload of a single SSE `data:` line.
///
/// The backend names the text field either `delta` or `content` depending
/// on version; both are accepted, `delta` wins when both are present.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamFrame {
    #[serde(default)]
    pub delta: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub done: Option<bool>,
}

impl StreamFrame {
    /// Extract the text payload, preferring a non-empty `delta` over a
    /// non-empty `content`. Returns `None` when the frame carries no text.
    pub fn text(&self) -> Option<&str> {
        self.delta
            .as_deref()
            .filter(|s| !s.is_empty())
            .or_else(|| self.content.as_deref().filter(|s| !s.is_empty()))
    }
}

/// One unit of generated text delivered by a streaming chat call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatDelta {
    pub content: String,
    /// Conversation id, present on frames where the backend reports it
    /// (typically the first frame of a new conversation).
    pub conversation_id: Option<String>,
}

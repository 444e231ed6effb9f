//! Chat and conversation-management endpoints.
//!
//! The streaming variant of `/ai/chat` lives in [`crate::stream`]; this
//! module covers the buffered chat call and conversation housekeeping.

use reqwest::Method;
use serde::Deserialize;

use crate::client::{ApiClient, ClientError};
use crate::model::{ChatMessage, ChatRequest};

/// Buffered (non-streaming) chat completion.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub conversation_id: String,
    #[serde(default)]
    pub user_message: Option<String>,
    pub ai_response: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// One conversation in the user's session list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    #[serde(default)]
    pub id: Option<i64>,
    pub conversation_id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub create_time: Option<String>,
    #[serde(default)]
    pub update_time: Option<String>,
}

impl ApiClient {
    /// `POST /ai/chat` — single buffered completion, same request shape as
    /// the streaming endpoint.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse, ClientError> {
        if request.message.is_empty() {
            return Err(ClientError::InvalidRequest("message must not be empty"));
        }
        let req = self.request(Method::POST, "/ai/chat").await.json(request);
        self.send::<ChatResponse>(req).await?.into_data()
    }

    /// `GET /ai/sessions` — list the user's conversations.
    pub async fn conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        let req = self.request(Method::GET, "/ai/sessions").await;
        Ok(self
            .send::<Vec<Conversation>>(req)
            .await?
            .into_result()?
            .unwrap_or_default())
    }

    /// `POST /ai/sessions` — create a conversation, returning its id.
    pub async fn create_conversation(
        &self,
        title: Option<&str>,
    ) -> Result<String, ClientError> {
        let mut req = self.request(Method::POST, "/ai/sessions").await;
        if let Some(title) = title {
            req = req.query(&[("title", title)]);
        }
        self.send::<String>(req).await?.into_data()
    }

    /// `DELETE /ai/sessions/{id}` — delete a conversation and its history.
    pub async fn delete_conversation(&self, conversation_id: &str) -> Result<(), ClientError> {
        let req = self
            .request(Method::DELETE, &format!("/ai/sessions/{conversation_id}"))
            .await;
        let _ = self.send::<serde_json::Value>(req).await?.into_result()?;
        Ok(())
    }

    /// `GET /ai/sessions/{id}/history` — full message history of a
    /// conversation, oldest first.
    pub async fn conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<Vec<ChatMessage>, ClientError> {
        let req = self
            .request(
                Method::GET,
                &format!("/ai/sessions/{conversation_id}/history"),
            )
            .await;
        Ok(self
            .send::<Vec<ChatMessage>>(req)
            .await?
            .into_result()?
            .unwrap_or_default())
    }

    /// `DELETE /ai/sessions/{id}/history` — clear a conversation's history
    /// without deleting the conversation itself.
    pub async fn clear_conversation_history(
        &self,
        conversation_id: &str,
    ) -> Result<(), ClientError> {
        let req = self
            .request(
                Method::DELETE,
                &format!("/ai/sessions/{conversation_id}/history"),
            )
            .await;
        let _ = self.send::<serde_json::Value>(req).await?.into_result()?;
        Ok(())
    }
}

/// Chat-session service client — the server of record for sessions,
/// messages and candidate profiles.
///
/// ARCHITECTURAL RULE: no other module talks to the chat-session service
/// directly. The rest of the crate sees only the `ChatSessionApi` trait,
/// which also keeps orchestration tests free of the network.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::chat::{ChatMessage, NewMessage};
use crate::models::profile::{SaveProfileRequest, SavedProfile};
use crate::models::session::{AppUser, ChatSession, HistoryEntry};

const REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ChatServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Chat service error (status {status}): {message}")]
    Api { status: u16, message: String },
}

#[async_trait]
pub trait ChatSessionApi: Send + Sync {
    async fn create_session(
        &self,
        user: &AppUser,
        session_type: &str,
        metadata: Value,
    ) -> Result<ChatSession, ChatServiceError>;

    async fn add_message(
        &self,
        session_id: &str,
        message: NewMessage,
    ) -> Result<ChatMessage, ChatServiceError>;

    async fn session_messages(&self, session_id: &str)
        -> Result<Vec<ChatMessage>, ChatServiceError>;

    async fn save_candidate_profile(
        &self,
        session_id: &str,
        fields: SaveProfileRequest,
    ) -> Result<SavedProfile, ChatServiceError>;

    async fn candidate_profile(
        &self,
        session_id: &str,
    ) -> Result<Option<SavedProfile>, ChatServiceError>;

    async fn end_session(&self, session_id: &str) -> Result<(), ChatServiceError>;

    async fn load_session(&self, session_id: &str)
        -> Result<Option<ChatSession>, ChatServiceError>;

    async fn user_chat_history(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, ChatServiceError>;

    async fn export_chat_data(&self, session_id: &str) -> Result<Value, ChatServiceError>;
}

/// HTTP implementation against the chat-session service REST API.
#[derive(Clone)]
pub struct HttpChatServiceClient {
    client: Client,
    base_url: String,
}

impl HttpChatServiceClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, ChatServiceError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let message = resp.text().await.unwrap_or_default();
        Err(ChatServiceError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ChatSessionApi for HttpChatServiceClient {
    async fn create_session(
        &self,
        user: &AppUser,
        session_type: &str,
        metadata: Value,
    ) -> Result<ChatSession, ChatServiceError> {
        let resp = self
            .client
            .post(self.url("/api/v1/sessions"))
            .json(&serde_json::json!({
                "user": user,
                "sessionType": session_type,
                "metadata": metadata,
            }))
            .send()
            .await?;
        let session: ChatSession = Self::check(resp).await?.json().await?;
        debug!("Created chat session {}", session.id);
        Ok(session)
    }

    async fn add_message(
        &self,
        session_id: &str,
        message: NewMessage,
    ) -> Result<ChatMessage, ChatServiceError> {
        let resp = self
            .client
            .post(self.url(&format!("/api/v1/sessions/{session_id}/messages")))
            .json(&message)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn session_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatServiceError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/v1/sessions/{session_id}/messages")))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn save_candidate_profile(
        &self,
        session_id: &str,
        fields: SaveProfileRequest,
    ) -> Result<SavedProfile, ChatServiceError> {
        let resp = self
            .client
            .put(self.url(&format!("/api/v1/sessions/{session_id}/profile")))
            .json(&fields)
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn candidate_profile(
        &self,
        session_id: &str,
    ) -> Result<Option<SavedProfile>, ChatServiceError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/v1/sessions/{session_id}/profile")))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(resp).await?.json().await?))
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ChatServiceError> {
        let resp = self
            .client
            .post(self.url(&format!("/api/v1/sessions/{session_id}/end")))
            .send()
            .await?;
        Self::check(resp).await?;
        Ok(())
    }

    async fn load_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ChatSession>, ChatServiceError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/v1/sessions/{session_id}")))
            .send()
            .await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Ok(Some(Self::check(resp).await?.json().await?))
    }

    async fn user_chat_history(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, ChatServiceError> {
        let resp = self
            .client
            .get(self.url("/api/v1/history"))
            .query(&[("email", email), ("limit", &limit.to_string())])
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }

    async fn export_chat_data(&self, session_id: &str) -> Result<Value, ChatServiceError> {
        let resp = self
            .client
            .get(self.url(&format!("/api/v1/sessions/{session_id}/export")))
            .send()
            .await?;
        Ok(Self::check(resp).await?.json().await?)
    }
}

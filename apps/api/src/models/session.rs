use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::chat::ChatMessage;
use crate::models::profile::SavedProfile;

/// The authenticated interviewee. Identity key is the email address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppUser {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Active,
    Completed,
}

/// A chat session record owned by the chat-session service.
/// Created once per interview attempt, ended exactly once.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSession {
    pub id: String,
    pub user_email: String,
    pub session_type: String,
    pub status: SessionStatus,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub metadata: Value,
}

/// One entry of a user's chat history: the session, its full transcript
/// and the profile, when one was saved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub session: ChatSession,
    pub messages: Vec<ChatMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<SavedProfile>,
}

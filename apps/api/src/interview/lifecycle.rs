//! Session lifecycle: restore-or-create on entry, end-and-reset, and
//! resuming an older session from history.
//!
//! Every collaborator call on these paths is best-effort: failures are
//! logged and degrade to the canned welcome, never to an unusable session.

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::interview::texts;
use crate::models::chat::{ChatMessage, MessageRole, MessageType, NewMessage};
use crate::models::profile::SavedProfile;
use crate::models::session::{AppUser, SessionStatus};
use crate::state::AppState;

/// Session type recorded with every interview attempt.
pub const SESSION_TYPE: &str = "rag-chat";
/// Interview difficulty is fixed for now; the RAG engine expects it on
/// every turn.
pub const DIFFICULTY: &str = "middle";

/// Everything a client needs to render the conversation after a lifecycle
/// operation. `session_id` is None only when no session could be created
/// at all (the messages then carry sentinel ids).
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewSnapshot {
    pub session_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<SavedProfile>,
    pub answered: u32,
}

/// Key under which a user's active session id is remembered.
pub fn pointer_key(email: &str) -> String {
    format!("active-session-{email}")
}

/// Entry point: restore the active session if one is remembered and still
/// resolves, otherwise start a new one. Never fails.
pub async fn initialize(state: &AppState, user: &AppUser) -> InterviewSnapshot {
    match restore_active_session(state, user).await {
        Ok(Some(snapshot)) => {
            info!(
                "Restored session {:?} for {} ({} messages)",
                snapshot.session_id,
                user.email,
                snapshot.messages.len()
            );
            return snapshot;
        }
        Ok(None) => {}
        Err(e) => warn!("Session restore failed for {}: {e}", user.email),
    }
    start_new_session(state, user).await
}

/// Follows the stored pointer. Returns Ok(None) when there is no pointer,
/// the session no longer resolves, or it is already completed.
async fn restore_active_session(
    state: &AppState,
    user: &AppUser,
) -> Result<Option<InterviewSnapshot>, AppError> {
    let key = pointer_key(&user.email);
    let session_id = match state.kv.get(&key).await? {
        Some(id) => id,
        None => return Ok(None),
    };

    let session = match state.chat.load_session(&session_id).await? {
        Some(session) => session,
        None => return Ok(None), // stale pointer; overwritten on new session
    };
    if session.status != SessionStatus::Active {
        return Ok(None);
    }

    let messages = state.chat.session_messages(&session_id).await?;
    let answered = count_user_turns(&messages);
    let profile = state.chat.candidate_profile(&session_id).await?;

    state.sessions.activate(&session_id, answered);
    Ok(Some(InterviewSnapshot {
        session_id: Some(session_id),
        messages,
        profile,
        answered,
    }))
}

/// Creates a fresh session and asks the RAG engine for an opening message.
/// Degrades stepwise: no opening → canned welcome persisted; persist fails
/// → canned welcome in memory; no session at all → sentinel ids only.
pub async fn start_new_session(state: &AppState, user: &AppUser) -> InterviewSnapshot {
    let session = match state
        .chat
        .create_session(user, SESSION_TYPE, json!({ "difficulty": DIFFICULTY }))
        .await
    {
        Ok(session) => Some(session),
        Err(e) => {
            error!("Failed to create chat session for {}: {e}", user.email);
            None
        }
    };

    let Some(session) = session else {
        return InterviewSnapshot {
            session_id: None,
            messages: vec![in_memory_welcome(texts::TEMP_SESSION_ID, &user.name)],
            profile: None,
            answered: 0,
        };
    };

    if let Err(e) = state.kv.set(&pointer_key(&user.email), &session.id).await {
        warn!(
            "Failed to save active-session pointer for {}: {e}",
            user.email
        );
    }

    match open_interview(state, user, &session.id).await {
        Ok(message) => {
            state.sessions.activate(&session.id, 0);
            info!("Started session {} for {}", session.id, user.email);
            return InterviewSnapshot {
                session_id: Some(session.id),
                messages: vec![message],
                profile: None,
                answered: 0,
            };
        }
        Err(e) => error!("Interview opening failed, falling back to canned welcome: {e}"),
    }

    let message = match state
        .chat
        .add_message(
            &session.id,
            NewMessage::assistant_text(texts::fallback_welcome(&user.name)),
        )
        .await
    {
        Ok(message) => message,
        Err(e) => {
            error!("Failed to persist fallback welcome: {e}");
            in_memory_welcome(&session.id, &user.name)
        }
    };

    state.sessions.activate(&session.id, 0);
    InterviewSnapshot {
        session_id: Some(session.id),
        messages: vec![message],
        profile: None,
        answered: 0,
    }
}

/// Ends the remembered session (best-effort), forgets it, then starts over.
pub async fn end_and_reset(state: &AppState, user: &AppUser) -> InterviewSnapshot {
    let key = pointer_key(&user.email);
    match state.kv.get(&key).await {
        Ok(Some(session_id)) => {
            if let Err(e) = state.chat.end_session(&session_id).await {
                warn!("Failed to end session {session_id}: {e}");
            }
            state.sessions.drop_session(&session_id);
        }
        Ok(None) => {}
        Err(e) => warn!("Failed to read active-session pointer for {}: {e}", user.email),
    }
    if let Err(e) = state.kv.remove(&key).await {
        warn!(
            "Failed to clear active-session pointer for {}: {e}",
            user.email
        );
    }

    start_new_session(state, user).await
}

/// Re-opens a session from history. Only still-active sessions re-enter the
/// phase registry; completed ones load read-only.
pub async fn resume_history_session(
    state: &AppState,
    user: &AppUser,
    session_id: &str,
) -> Result<InterviewSnapshot, AppError> {
    let session = state
        .chat
        .load_session(session_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Session {session_id} not found")))?;

    let messages = state.chat.session_messages(session_id).await?;
    let answered = count_user_turns(&messages);
    let profile = state.chat.candidate_profile(session_id).await?;

    if let Err(e) = state.kv.set(&pointer_key(&user.email), session_id).await {
        warn!(
            "Failed to save active-session pointer for {}: {e}",
            user.email
        );
    }
    if session.status == SessionStatus::Active {
        state.sessions.activate(session_id, answered);
    }

    Ok(InterviewSnapshot {
        session_id: Some(session_id.to_string()),
        messages,
        profile,
        answered,
    })
}

/// Seeds the RAG engine with a greeting and persists its opening message.
async fn open_interview(
    state: &AppState,
    user: &AppUser,
    session_id: &str,
) -> Result<ChatMessage, AppError> {
    let greeting = texts::interview_greeting(&user.name);
    let opening = state.rag.conduct_interview(&greeting, DIFFICULTY).await?;
    let message = state
        .chat
        .add_message(session_id, NewMessage::assistant_text(opening))
        .await?;
    Ok(message)
}

fn count_user_turns(messages: &[ChatMessage]) -> u32 {
    messages
        .iter()
        .filter(|m| m.role == MessageRole::User)
        .count() as u32
}

fn in_memory_welcome(session_id: &str, name: &str) -> ChatMessage {
    ChatMessage {
        id: texts::TEMP_MESSAGE_ID.to_string(),
        session_id: session_id.to_string(),
        role: MessageRole::Assistant,
        content: texts::fallback_welcome(name),
        message_type: MessageType::Text,
        timestamp: Utc::now(),
        confidence: None,
        metadata: None,
    }
}

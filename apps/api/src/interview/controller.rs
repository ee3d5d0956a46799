//! Conversation flow: persisting both sides of an exchange, triggering
//! evaluation, finalizing the interview and exporting the transcript.

use chrono::Utc;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::competency::updater::apply_assessment;
use crate::errors::AppError;
use crate::interview::lifecycle::{pointer_key, DIFFICULTY};
use crate::interview::texts;
use crate::models::chat::{ChatMessage, MessageRole, MessageType, NewMessage};
use crate::models::profile::{parse_skill_map, SaveProfileRequest, SavedProfile};
use crate::models::session::AppUser;
use crate::state::AppState;

/// One user turn as accepted by `send`.
#[derive(Debug, Clone)]
pub struct SendInput {
    pub message: String,
    pub message_type: MessageType,
    pub confidence: Option<f32>,
    pub metadata: Option<Value>,
}

#[derive(Debug)]
pub enum SendResult {
    /// Blank input, exchange already in flight, or the session is not
    /// active. Deliberately indistinguishable from the caller's side;
    /// nothing happened.
    Rejected,
    /// The exchange ran. `messages` holds every turn appended by this call,
    /// including the apology when a collaborator failed mid-flow.
    Exchange {
        messages: Vec<ChatMessage>,
        answered: u32,
        profile: Option<SavedProfile>,
    },
}

#[derive(Debug)]
pub enum FinalizeResult {
    /// Fewer than three answers so far; nothing was called or changed.
    Guidance(String),
    /// Not currently finalizable (busy, finalized, or unknown session).
    Rejected,
    /// Interview completed and the session ended.
    Completed {
        profile: SavedProfile,
        message: ChatMessage,
    },
    /// A collaborator failed; the session stays active and can retry.
    Failed,
}

/// Runs one full exchange: persist the user's turn, get the interviewer's
/// reply, persist it, score the exchange and refresh the saved profile.
/// Collaborator failures mid-flow degrade to the apology message.
pub async fn send(state: &AppState, session_id: &str, input: SendInput) -> SendResult {
    if input.message.trim().is_empty() {
        return SendResult::Rejected;
    }
    if !state.sessions.try_begin_exchange(session_id) {
        debug!("Dropping send for session {session_id}: not active or busy");
        return SendResult::Rejected;
    }

    let mut appended = Vec::new();
    let mut profile = None;
    let outcome = run_exchange(state, session_id, &input, &mut appended, &mut profile).await;
    state.sessions.end_exchange(session_id);

    if let Err(e) = outcome {
        warn!("Exchange failed for session {session_id}: {e}");
        appended.push(apology_message(state, session_id).await);
    }

    SendResult::Exchange {
        messages: appended,
        answered: state.sessions.answered(session_id),
        profile,
    }
}

async fn run_exchange(
    state: &AppState,
    session_id: &str,
    input: &SendInput,
    appended: &mut Vec<ChatMessage>,
    profile: &mut Option<SavedProfile>,
) -> Result<(), AppError> {
    let user_message = state
        .chat
        .add_message(
            session_id,
            NewMessage {
                role: MessageRole::User,
                content: input.message.clone(),
                message_type: input.message_type,
                confidence: input.confidence,
                metadata: input.metadata.clone(),
            },
        )
        .await?;
    appended.push(user_message);
    state.sessions.record_answer(session_id);

    let reply = state.rag.conduct_interview(&input.message, DIFFICULTY).await?;
    let assistant_message = state
        .chat
        .add_message(session_id, NewMessage::assistant_text(reply))
        .await?;
    appended.push(assistant_message);

    state.rag.auto_evaluate_last_response().await?;

    if let Some(current) = state.rag.current_profile().await? {
        let saved = state
            .chat
            .save_candidate_profile(session_id, SaveProfileRequest::from_profile(&current))
            .await?;
        debug!(
            "Profile refreshed for session {session_id}: score {}, {} technical skills",
            saved.overall_score,
            parse_skill_map(&saved.technical_skills).len()
        );
        *profile = Some(saved);
    }

    Ok(())
}

/// Persists the apology turn; if even that fails, hands back an in-memory
/// copy so the conversation still shows something.
async fn apology_message(state: &AppState, session_id: &str) -> ChatMessage {
    match state
        .chat
        .add_message(session_id, NewMessage::assistant_text(texts::APOLOGY_MESSAGE))
        .await
    {
        Ok(message) => message,
        Err(e) => {
            warn!("Failed to persist apology message: {e}");
            ChatMessage {
                id: texts::TEMP_MESSAGE_ID.to_string(),
                session_id: session_id.to_string(),
                role: MessageRole::Assistant,
                content: texts::APOLOGY_MESSAGE.to_string(),
                message_type: MessageType::Text,
                timestamp: Utc::now(),
                confidence: None,
                metadata: None,
            }
        }
    }
}

/// Finalizes the interview: final profile, competency deltas, completion
/// summary, session end. Guarded on three answered questions.
pub async fn finalize(state: &AppState, session_id: &str, user: &AppUser) -> FinalizeResult {
    if state.sessions.answered(session_id) < 3 {
        return FinalizeResult::Guidance(texts::FINALIZE_GUIDANCE.to_string());
    }
    if !state.sessions.try_begin_exchange(session_id) {
        debug!("Dropping finalize for session {session_id}: not active or busy");
        return FinalizeResult::Rejected;
    }

    match run_finalize(state, session_id, user).await {
        Ok((profile, message)) => {
            state.sessions.complete(session_id);
            info!("Session {session_id} finalized with score {}", profile.overall_score);
            FinalizeResult::Completed { profile, message }
        }
        Err(e) => {
            warn!("Finalize failed for session {session_id}: {e}");
            state.sessions.end_exchange(session_id);
            FinalizeResult::Failed
        }
    }
}

async fn run_finalize(
    state: &AppState,
    session_id: &str,
    user: &AppUser,
) -> Result<(SavedProfile, ChatMessage), AppError> {
    let final_profile = state.rag.generate_final_profile().await?;
    let saved = state
        .chat
        .save_candidate_profile(session_id, SaveProfileRequest::from_profile(&final_profile))
        .await?;

    // Rating updates are best-effort: a cache hiccup must not block
    // finishing the interview.
    let mut ratings = state.ratings.get(&user.email).await;
    apply_assessment(
        &mut ratings,
        state.classifier.as_ref(),
        &final_profile.summary,
        final_profile.overall_score,
    );
    if let Err(e) = state.ratings.put(&user.email, &ratings).await {
        warn!("Failed to persist competency ratings for {}: {e}", user.email);
    }

    let message = state
        .chat
        .add_message(
            session_id,
            NewMessage::assistant_text(texts::completion_message(&final_profile)),
        )
        .await?;

    state.chat.end_session(session_id).await?;
    if let Err(e) = state.kv.remove(&pointer_key(&user.email)).await {
        warn!(
            "Failed to clear active-session pointer for {}: {e}",
            user.email
        );
    }

    Ok((saved, message))
}

/// Fetches the full export payload and names the download file.
pub async fn export(state: &AppState, session_id: &str) -> Result<(String, Value), AppError> {
    let data = state.chat.export_chat_data(session_id).await?;
    let filename = format!(
        "chat-session-{session_id}-{}.json",
        Utc::now().timestamp_millis()
    );
    Ok((filename, data))
}

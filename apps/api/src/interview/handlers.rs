use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::interview::controller::{self, FinalizeResult, SendInput, SendResult};
use crate::interview::lifecycle::{self, InterviewSnapshot};
use crate::models::chat::{ChatMessage, MessageType};
use crate::models::profile::SavedProfile;
use crate::models::session::{AppUser, HistoryEntry};
use crate::state::AppState;

const DEFAULT_HISTORY_LIMIT: u32 = 10;

#[derive(Deserialize)]
pub struct UserPayload {
    pub user: AppUser,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendRequest {
    pub session_id: String,
    pub message: String,
    #[serde(default)]
    pub message_type: MessageType,
    #[serde(default)]
    pub confidence: Option<f32>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendResponse {
    pub accepted: bool,
    pub messages: Vec<ChatMessage>,
    pub answered: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<SavedProfile>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeRequest {
    pub session_id: String,
    pub user: AppUser,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<SavedProfile>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<ChatMessage>,
}

#[derive(Deserialize)]
pub struct HistoryQuery {
    pub email: String,
    pub limit: Option<u32>,
}

/// POST /api/v1/interview/initialize
/// Restores the remembered session or starts a new one. Never fails;
/// worst case the snapshot carries the canned welcome under sentinel ids.
pub async fn handle_initialize(
    State(state): State<AppState>,
    Json(req): Json<UserPayload>,
) -> Json<InterviewSnapshot> {
    Json(lifecycle::initialize(&state, &req.user).await)
}

/// POST /api/v1/interview/messages
pub async fn handle_send(
    State(state): State<AppState>,
    Json(req): Json<SendRequest>,
) -> Json<SendResponse> {
    let input = SendInput {
        message: req.message,
        message_type: req.message_type,
        confidence: req.confidence,
        metadata: req.metadata,
    };
    let response = match controller::send(&state, &req.session_id, input).await {
        SendResult::Rejected => SendResponse {
            accepted: false,
            messages: Vec::new(),
            answered: state.sessions.answered(&req.session_id),
            profile: None,
        },
        SendResult::Exchange {
            messages,
            answered,
            profile,
        } => SendResponse {
            accepted: true,
            messages,
            answered,
            profile,
        },
    };
    Json(response)
}

/// POST /api/v1/interview/finalize
pub async fn handle_finalize(
    State(state): State<AppState>,
    Json(req): Json<FinalizeRequest>,
) -> Json<FinalizeResponse> {
    let response = match controller::finalize(&state, &req.session_id, &req.user).await {
        FinalizeResult::Guidance(guidance) => FinalizeResponse {
            completed: false,
            guidance: Some(guidance),
            profile: None,
            message: None,
        },
        FinalizeResult::Rejected | FinalizeResult::Failed => FinalizeResponse {
            completed: false,
            guidance: None,
            profile: None,
            message: None,
        },
        FinalizeResult::Completed { profile, message } => FinalizeResponse {
            completed: true,
            guidance: None,
            profile: Some(profile),
            message: Some(message),
        },
    };
    Json(response)
}

/// POST /api/v1/interview/reset
/// Ends the current session (best-effort) and starts a fresh one.
pub async fn handle_reset(
    State(state): State<AppState>,
    Json(req): Json<UserPayload>,
) -> Json<InterviewSnapshot> {
    Json(lifecycle::end_and_reset(&state, &req.user).await)
}

/// POST /api/v1/interview/sessions/:id/resume
pub async fn handle_resume(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(req): Json<UserPayload>,
) -> Result<Json<InterviewSnapshot>, AppError> {
    let snapshot = lifecycle::resume_history_session(&state, &req.user, &session_id).await?;
    Ok(Json(snapshot))
}

/// GET /api/v1/interview/history?email=&limit=
pub async fn handle_history(
    State(state): State<AppState>,
    Query(params): Query<HistoryQuery>,
) -> Result<Json<Vec<HistoryEntry>>, AppError> {
    if params.email.trim().is_empty() {
        return Err(AppError::Validation("email is required".to_string()));
    }
    let limit = params.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let history = state.chat.user_chat_history(&params.email, limit).await?;
    Ok(Json(history))
}

/// GET /api/v1/interview/sessions/:id/export
/// Serves the full export payload as a downloadable JSON file named
/// `chat-session-<id>-<timestamp>.json`.
pub async fn handle_export(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Response, AppError> {
    let (filename, data) = controller::export(&state, &session_id).await?;
    let body = serde_json::to_string_pretty(&data)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("export serialization: {e}")))?;
    let headers = [
        (header::CONTENT_TYPE, "application/json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, body).into_response())
}

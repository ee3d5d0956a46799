#![allow(dead_code)]

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::clients::{ChatServiceError, RagError};
use crate::store::StoreError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
///
/// Most collaborator failures never reach this type: the lifecycle and
/// conversation flows catch them and degrade to fallback messages. AppError
/// covers the transport edge — bad requests and the few endpoints (history,
/// export, resume) with no sensible degraded answer.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Chat service error: {0}")]
    ChatService(#[from] ChatServiceError),

    #[error("RAG engine error: {0}")]
    Rag(#[from] RagError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::ChatService(e) => {
                tracing::error!("Chat service error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "CHAT_SERVICE_ERROR",
                    "The chat-session service is unavailable".to_string(),
                )
            }
            AppError::Rag(e) => {
                tracing::error!("RAG engine error: {e}");
                (
                    StatusCode::BAD_GATEWAY,
                    "RAG_ERROR",
                    "The interview engine is unavailable".to_string(),
                )
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "STORE_ERROR",
                    "A storage error occurred".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

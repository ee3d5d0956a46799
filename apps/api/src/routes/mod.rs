pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::interview::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/interview/initialize",
            post(handlers::handle_initialize),
        )
        .route("/api/v1/interview/messages", post(handlers::handle_send))
        .route(
            "/api/v1/interview/finalize",
            post(handlers::handle_finalize),
        )
        .route("/api/v1/interview/reset", post(handlers::handle_reset))
        .route("/api/v1/interview/history", get(handlers::handle_history))
        .route(
            "/api/v1/interview/sessions/:id/resume",
            post(handlers::handle_resume),
        )
        .route(
            "/api/v1/interview/sessions/:id/export",
            get(handlers::handle_export),
        )
        .with_state(state)
}

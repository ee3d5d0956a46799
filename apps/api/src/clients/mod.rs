//! Outbound HTTP collaborators. Both are consumed strictly through their
//! call/return contracts; their internals (persistence schema, retrieval
//! pipeline) are out of scope for this service.

pub mod chat_service;
pub mod rag;

pub use chat_service::{ChatServiceError, ChatSessionApi, HttpChatServiceClient};
pub use rag::{HttpRagClient, RagError, RagInterviewer};

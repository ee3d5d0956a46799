//! Interview orchestration: session lifecycle against the chat-session
//! service, the conversation flow against the RAG engine, and the explicit
//! per-session phase machine that gates both.

pub mod controller;
pub mod handlers;
pub mod lifecycle;
pub mod phase;
pub mod texts;

#[cfg(test)]
pub mod testing;

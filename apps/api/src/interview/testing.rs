//! In-memory collaborator doubles for orchestration tests. Behavior is
//! intentionally minimal: enough statefulness to follow the contracts,
//! plus call recording so tests can assert what was (not) invoked.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Value};

use crate::clients::{ChatServiceError, ChatSessionApi, RagError, RagInterviewer};
use crate::competency::classifier::KeywordClassifier;
use crate::competency::repo::KvRatingRepository;
use crate::interview::phase::SessionRegistry;
use crate::models::chat::{ChatMessage, MessageRole, MessageType, NewMessage};
use crate::models::profile::{CandidateProfile, SaveProfileRequest, SavedProfile};
use crate::models::session::{AppUser, ChatSession, HistoryEntry, SessionStatus};
use crate::state::AppState;
use crate::store::MemoryKvStore;

pub fn user() -> AppUser {
    AppUser {
        name: "Анна".to_string(),
        email: "anna@example.com".to_string(),
    }
}

/// Builds an AppState wired to the given doubles and a fresh in-memory KV.
pub fn state_with(chat: Arc<MockChatService>, rag: Arc<MockRag>) -> AppState {
    let kv = Arc::new(MemoryKvStore::new());
    AppState {
        chat,
        rag,
        kv: kv.clone(),
        ratings: Arc::new(KvRatingRepository::new(kv)),
        classifier: Arc::new(KeywordClassifier),
        sessions: Arc::new(SessionRegistry::new()),
    }
}

fn service_error(message: &str) -> ChatServiceError {
    ChatServiceError::Api {
        status: 500,
        message: message.to_string(),
    }
}

#[derive(Default)]
pub struct MockChatService {
    fail_create: bool,
    sessions: Mutex<HashMap<String, ChatSession>>,
    messages: Mutex<Vec<ChatMessage>>,
    profiles: Mutex<HashMap<String, SavedProfile>>,
    ended: Mutex<Vec<String>>,
    calls: Mutex<Vec<String>>,
    next_id: AtomicU64,
}

impl MockChatService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn ended_sessions(&self) -> Vec<String> {
        self.ended.lock().unwrap().clone()
    }

    pub fn mark_completed(&self, session_id: &str) {
        if let Some(session) = self.sessions.lock().unwrap().get_mut(session_id) {
            session.status = SessionStatus::Completed;
        }
    }

    /// Injects a user turn directly, as if persisted in an earlier run.
    pub fn push_user_message(&self, session_id: &str, content: &str) {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.messages.lock().unwrap().push(ChatMessage {
            id: format!("msg-{id}"),
            session_id: session_id.to_string(),
            role: MessageRole::User,
            content: content.to_string(),
            message_type: MessageType::Text,
            timestamp: Utc::now(),
            confidence: None,
            metadata: None,
        });
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl ChatSessionApi for MockChatService {
    async fn create_session(
        &self,
        user: &AppUser,
        session_type: &str,
        metadata: Value,
    ) -> Result<ChatSession, ChatServiceError> {
        self.record("create_session");
        if self.fail_create {
            return Err(service_error("create_session down"));
        }
        let id = format!("session-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let session = ChatSession {
            id: id.clone(),
            user_email: user.email.clone(),
            session_type: session_type.to_string(),
            status: SessionStatus::Active,
            start_time: Utc::now(),
            metadata,
        };
        self.sessions.lock().unwrap().insert(id, session.clone());
        Ok(session)
    }

    async fn add_message(
        &self,
        session_id: &str,
        message: NewMessage,
    ) -> Result<ChatMessage, ChatServiceError> {
        self.record("add_message");
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let stored = ChatMessage {
            id: format!("msg-{id}"),
            session_id: session_id.to_string(),
            role: message.role,
            content: message.content,
            message_type: message.message_type,
            timestamp: Utc::now(),
            confidence: message.confidence,
            metadata: message.metadata,
        };
        self.messages.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn session_messages(
        &self,
        session_id: &str,
    ) -> Result<Vec<ChatMessage>, ChatServiceError> {
        self.record("session_messages");
        Ok(self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn save_candidate_profile(
        &self,
        session_id: &str,
        fields: SaveProfileRequest,
    ) -> Result<SavedProfile, ChatServiceError> {
        self.record("save_candidate_profile");
        let saved = SavedProfile {
            overall_score: fields.overall_score,
            technical_skills: fields.technical_skills,
            soft_skills: fields.soft_skills,
            summary: fields.summary,
            recommendations: fields.recommendations,
            strengths: fields.strengths,
            weaknesses: fields.weaknesses,
            ai_analysis: Some(fields.ai_analysis),
            individual_development_plan: Some(fields.individual_development_plan),
            created_at: Utc::now(),
        };
        self.profiles
            .lock()
            .unwrap()
            .insert(session_id.to_string(), saved.clone());
        Ok(saved)
    }

    async fn candidate_profile(
        &self,
        session_id: &str,
    ) -> Result<Option<SavedProfile>, ChatServiceError> {
        self.record("candidate_profile");
        Ok(self.profiles.lock().unwrap().get(session_id).cloned())
    }

    async fn end_session(&self, session_id: &str) -> Result<(), ChatServiceError> {
        self.record("end_session");
        self.mark_completed(session_id);
        self.ended.lock().unwrap().push(session_id.to_string());
        Ok(())
    }

    async fn load_session(
        &self,
        session_id: &str,
    ) -> Result<Option<ChatSession>, ChatServiceError> {
        self.record("load_session");
        Ok(self.sessions.lock().unwrap().get(session_id).cloned())
    }

    async fn user_chat_history(
        &self,
        email: &str,
        limit: u32,
    ) -> Result<Vec<HistoryEntry>, ChatServiceError> {
        self.record("user_chat_history");
        let sessions = self.sessions.lock().unwrap();
        let messages = self.messages.lock().unwrap();
        let profiles = self.profiles.lock().unwrap();
        Ok(sessions
            .values()
            .filter(|s| s.user_email == email)
            .take(limit as usize)
            .map(|session| HistoryEntry {
                session: session.clone(),
                messages: messages
                    .iter()
                    .filter(|m| m.session_id == session.id)
                    .cloned()
                    .collect(),
                profile: profiles.get(&session.id).cloned(),
            })
            .collect())
    }

    async fn export_chat_data(&self, session_id: &str) -> Result<Value, ChatServiceError> {
        self.record("export_chat_data");
        let session = self
            .sessions
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .ok_or_else(|| service_error("unknown session"))?;
        let messages: Vec<ChatMessage> = self
            .messages
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect();
        let profile = self.profiles.lock().unwrap().get(session_id).cloned();
        Ok(json!({
            "session": session,
            "messages": messages,
            "profile": profile,
        }))
    }
}

pub struct MockRag {
    reply: String,
    fail_conduct: AtomicBool,
    fail_final: AtomicBool,
    current: Mutex<Option<CandidateProfile>>,
    final_profile: Mutex<CandidateProfile>,
    calls: Mutex<Vec<String>>,
}

impl MockRag {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            fail_conduct: AtomicBool::new(false),
            fail_final: AtomicBool::new(false),
            current: Mutex::new(None),
            final_profile: Mutex::new(Self::profile(50, "Стабильный кандидат.")),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn failing_conduct(self) -> Self {
        self.fail_conduct.store(true, Ordering::SeqCst);
        self
    }

    pub fn fail_conduct_from_now_on(&self) {
        self.fail_conduct.store(true, Ordering::SeqCst);
    }

    pub fn fail_final_profile(&self) {
        self.fail_final.store(true, Ordering::SeqCst);
    }

    pub fn set_current_profile(&self, profile: CandidateProfile) {
        *self.current.lock().unwrap() = Some(profile);
    }

    pub fn set_final_profile(&self, profile: CandidateProfile) {
        *self.final_profile.lock().unwrap() = profile;
    }

    pub fn count_calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == name).count()
    }

    pub fn profile(overall_score: u32, summary: &str) -> CandidateProfile {
        CandidateProfile {
            overall_score,
            technical_skills: BTreeMap::from([
                ("Rust".to_string(), 60),
                ("SQL".to_string(), 50),
            ]),
            soft_skills: BTreeMap::from([("communication".to_string(), 45)]),
            summary: summary.to_string(),
            recommendations: vec![
                "Изучить алгоритмы".to_string(),
                "Подтянуть SQL".to_string(),
                "Практиковать собеседования".to_string(),
            ],
            strengths: vec!["Опыт разработки".to_string()],
            weaknesses: vec![],
            ai_analysis: None,
            individual_development_plan: None,
        }
    }

    fn record(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl RagInterviewer for MockRag {
    async fn conduct_interview(
        &self,
        _message: &str,
        _difficulty: &str,
    ) -> Result<String, RagError> {
        self.record("conduct_interview");
        if self.fail_conduct.load(Ordering::SeqCst) {
            return Err(RagError::Api {
                status: 503,
                message: "engine offline".to_string(),
            });
        }
        Ok(self.reply.clone())
    }

    async fn auto_evaluate_last_response(&self) -> Result<(), RagError> {
        self.record("auto_evaluate_last_response");
        Ok(())
    }

    async fn current_profile(&self) -> Result<Option<CandidateProfile>, RagError> {
        self.record("current_profile");
        Ok(self.current.lock().unwrap().clone())
    }

    async fn generate_final_profile(&self) -> Result<CandidateProfile, RagError> {
        self.record("generate_final_profile");
        if self.fail_final.load(Ordering::SeqCst) {
            return Err(RagError::Api {
                status: 503,
                message: "engine offline".to_string(),
            });
        }
        Ok(self.final_profile.lock().unwrap().clone())
    }
}

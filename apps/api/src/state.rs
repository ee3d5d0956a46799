use std::sync::Arc;

use crate::clients::{ChatSessionApi, RagInterviewer};
use crate::competency::classifier::BehaviorClassifier;
use crate::competency::repo::RatingRepository;
use crate::interview::phase::SessionRegistry;
use crate::store::KvStore;

/// Shared application state injected into all route handlers via Axum
/// extractors. Collaborators and the KV layer sit behind traits so the
/// orchestration code can be tested against in-memory doubles.
#[derive(Clone)]
pub struct AppState {
    pub chat: Arc<dyn ChatSessionApi>,
    pub rag: Arc<dyn RagInterviewer>,
    pub kv: Arc<dyn KvStore>,
    pub ratings: Arc<dyn RatingRepository>,
    /// Pluggable behavior classifier. Default: KeywordClassifier.
    pub classifier: Arc<dyn BehaviorClassifier>,
    /// Per-session phase machine; doubles as admission control for sends.
    pub sessions: Arc<SessionRegistry>,
}

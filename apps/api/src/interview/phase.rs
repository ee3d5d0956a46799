//! Per-session phase machine.
//!
//! `Uninitialized → Active ⇄ Evaluating → Finalized`, where Uninitialized
//! is simply absence from the registry. Evaluating marks an exchange in
//! flight; it doubles as admission control — a send or finalize arriving
//! while a session is Evaluating is dropped, not queued.

use std::collections::HashMap;
use std::sync::Mutex;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPhase {
    Active,
    Evaluating,
    Finalized,
}

#[derive(Debug)]
struct SessionState {
    phase: SessionPhase,
    answered: u32,
}

/// In-process registry of known sessions. Guards all phase transitions;
/// callers never mutate phases directly.
#[derive(Default)]
pub struct SessionRegistry {
    inner: Mutex<HashMap<String, SessionState>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session as Active with a known answered-turn count.
    /// Used on creation and on restore; resets any previous state.
    pub fn activate(&self, session_id: &str, answered: u32) {
        self.inner.lock().unwrap().insert(
            session_id.to_string(),
            SessionState {
                phase: SessionPhase::Active,
                answered,
            },
        );
    }

    /// Active → Evaluating. Returns false (and changes nothing) for an
    /// unknown session or any other phase.
    pub fn try_begin_exchange(&self, session_id: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        match inner.get_mut(session_id) {
            Some(state) if state.phase == SessionPhase::Active => {
                state.phase = SessionPhase::Evaluating;
                true
            }
            _ => false,
        }
    }

    /// Evaluating → Active. No-op in any other phase.
    pub fn end_exchange(&self, session_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(state) = inner.get_mut(session_id) {
            if state.phase == SessionPhase::Evaluating {
                state.phase = SessionPhase::Active;
            }
        }
    }

    /// Evaluating → Finalized. Terminal; the session never leaves it.
    pub fn complete(&self, session_id: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(state) = inner.get_mut(session_id) {
            if state.phase == SessionPhase::Evaluating {
                state.phase = SessionPhase::Finalized;
            }
        }
    }

    /// Increments the answered-turn count, returning the new value.
    pub fn record_answer(&self, session_id: &str) -> u32 {
        let mut inner = self.inner.lock().unwrap();
        match inner.get_mut(session_id) {
            Some(state) => {
                state.answered += 1;
                state.answered
            }
            None => 0,
        }
    }

    pub fn answered(&self, session_id: &str) -> u32 {
        self.inner
            .lock()
            .unwrap()
            .get(session_id)
            .map(|s| s.answered)
            .unwrap_or(0)
    }

    pub fn phase(&self, session_id: &str) -> Option<SessionPhase> {
        self.inner.lock().unwrap().get(session_id).map(|s| s.phase)
    }

    /// Forgets a session entirely (reset path).
    pub fn drop_session(&self, session_id: &str) {
        self.inner.lock().unwrap().remove(session_id);
    }
}

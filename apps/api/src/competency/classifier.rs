//! Behavior classification over a profile's free-text summary.
//!
//! Pluggable, trait-based: the scoring table in `updater` is decoupled from
//! the detection mechanism, so a semantic classifier can replace the keyword
//! one without touching the delta arithmetic.
//!
//! Default: `KeywordClassifier` — case-insensitive substring match against
//! fixed marker lists. The markers are Russian literals because the RAG
//! engine writes its summaries in Russian; they are matched verbatim, not
//! translated.

use serde::Serialize;

/// A behavior signal detected in a profile summary. Flags are independent;
/// a summary can carry several at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BehaviorFlag {
    /// Rudeness, aggression, disrespect, refusal to cooperate.
    Unprofessional,
    /// Low engagement, evasive or one-word answers, no interest.
    Unmotivated,
    /// Communication, respect or professionalism called out as a problem.
    PoorCommunication,
}

pub trait BehaviorClassifier: Send + Sync {
    /// Returns the flags triggered by `summary`, in a fixed order.
    fn classify(&self, summary: &str) -> Vec<BehaviorFlag>;
}

const UNPROFESSIONAL_MARKERS: &[&str] = &[
    "груб",
    "агрессив",
    "неуважитель",
    "отказ",
    "негатив",
    "проблем",
    "серьезный минус",
    "не подходит",
    "крайне низкий",
    "непрофессиональ",
];

const UNMOTIVATED_MARKERS: &[&str] = &[
    "немотивирован",
    "односложн",
    "уклончив",
    "отсутствие интереса",
    "нежелание",
];

const POOR_COMMUNICATION_MARKERS: &[&str] = &[
    "коммуник",
    "уважен",
    "профессионализм",
    "поведен",
    "агрессивное поведение",
    "отказ от сотрудничества",
];

/// Keyword-based classifier. Fast, deterministic, no model call.
pub struct KeywordClassifier;

impl BehaviorClassifier for KeywordClassifier {
    fn classify(&self, summary: &str) -> Vec<BehaviorFlag> {
        let haystack = summary.to_lowercase();
        let mut flags = Vec::new();

        if matches_any(&haystack, UNPROFESSIONAL_MARKERS) {
            flags.push(BehaviorFlag::Unprofessional);
        }
        if matches_any(&haystack, UNMOTIVATED_MARKERS) {
            flags.push(BehaviorFlag::Unmotivated);
        }
        if matches_any(&haystack, POOR_COMMUNICATION_MARKERS) {
            flags.push(BehaviorFlag::PoorCommunication);
        }

        flags
    }
}

fn matches_any(haystack: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| haystack.contains(m))
}

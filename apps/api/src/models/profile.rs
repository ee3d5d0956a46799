use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// A candidate profile as reported by the RAG interview engine.
///
/// Skill maps are structured here; the chat-session service stores them as
/// JSON-encoded strings (see [`SaveProfileRequest`]). One profile exists per
/// session and is replaced wholesale on every recomputation, never merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateProfile {
    pub overall_score: u32,
    pub technical_skills: BTreeMap<String, u32>,
    pub soft_skills: BTreeMap<String, u32>,
    pub summary: String,
    pub recommendations: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_development_plan: Option<Value>,
}

/// The flattened form the chat-session service accepts for profile saves.
/// Collection fields travel as JSON strings per that service's contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveProfileRequest {
    pub overall_score: u32,
    pub technical_skills: String,
    pub soft_skills: String,
    pub summary: String,
    pub recommendations: String,
    pub strengths: String,
    pub weaknesses: String,
    pub ai_analysis: String,
    pub individual_development_plan: String,
}

impl SaveProfileRequest {
    pub fn from_profile(profile: &CandidateProfile) -> Self {
        let empty = Value::Object(serde_json::Map::new());
        Self {
            overall_score: profile.overall_score,
            technical_skills: to_json_string(&profile.technical_skills),
            soft_skills: to_json_string(&profile.soft_skills),
            summary: profile.summary.clone(),
            recommendations: to_json_string(&profile.recommendations),
            strengths: to_json_string(&profile.strengths),
            weaknesses: to_json_string(&profile.weaknesses),
            ai_analysis: to_json_string(profile.ai_analysis.as_ref().unwrap_or(&empty)),
            individual_development_plan: to_json_string(
                profile.individual_development_plan.as_ref().unwrap_or(&empty),
            ),
        }
    }
}

/// A saved profile record as returned by the chat-session service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedProfile {
    pub overall_score: u32,
    pub technical_skills: String,
    pub soft_skills: String,
    pub summary: String,
    pub recommendations: String,
    pub strengths: String,
    pub weaknesses: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub individual_development_plan: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Parses a JSON-encoded skill map. Malformed data renders as an empty map
/// rather than an error; the conversation must survive a bad cache.
pub fn parse_skill_map(raw: &str) -> BTreeMap<String, u32> {
    match serde_json::from_str(raw) {
        Ok(map) => map,
        Err(e) => {
            warn!("Unparsable skill map in saved profile: {e}");
            BTreeMap::new()
        }
    }
}

fn to_json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}

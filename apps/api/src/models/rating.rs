use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A per-user competency rating cached in the key-value store under
/// `competency-data-<email>`.
///
/// Field names stay camelCase on the wire: the cache predates this service
/// and other readers of the same key depend on the original shape.
///
/// Invariants after every write: `0.0 <= current_value <= 5.0` and
/// `target_value == min(5.0, current_value + 1.0)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetencyRating {
    pub competency_id: String,
    pub current_value: f64,
    pub target_value: f64,
    pub category: String,
    pub last_assessed: DateTime<Utc>,
    #[serde(default)]
    pub improvement_plan: Vec<String>,
}

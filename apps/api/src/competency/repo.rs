//! Per-user rating repository over the key-value store.
//!
//! Key shape `competency-data-<email>` and the camelCase JSON array inside
//! it are wire-compatible with the older browser cache. The cache is
//! read-modify-written wholesale; concurrent writers are last-write-wins.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::warn;

use crate::models::rating::CompetencyRating;
use crate::store::{KvStore, StoreError};

#[async_trait]
pub trait RatingRepository: Send + Sync {
    /// The user's rating list. Missing or unparsable cache reads as empty.
    async fn get(&self, email: &str) -> Vec<CompetencyRating>;

    /// Replaces the user's rating list.
    async fn put(&self, email: &str, ratings: &[CompetencyRating]) -> Result<(), StoreError>;
}

pub struct KvRatingRepository {
    kv: Arc<dyn KvStore>,
}

impl KvRatingRepository {
    pub fn new(kv: Arc<dyn KvStore>) -> Self {
        Self { kv }
    }

    fn cache_key(email: &str) -> String {
        format!("competency-data-{email}")
    }
}

#[async_trait]
impl RatingRepository for KvRatingRepository {
    async fn get(&self, email: &str) -> Vec<CompetencyRating> {
        let raw = match self.kv.get(&Self::cache_key(email)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                warn!("Failed to read rating cache for {email}: {e}");
                return Vec::new();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(ratings) => ratings,
            Err(e) => {
                warn!("Malformed rating cache for {email}, treating as empty: {e}");
                Vec::new()
            }
        }
    }

    async fn put(&self, email: &str, ratings: &[CompetencyRating]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(ratings).unwrap_or_else(|_| "[]".to_string());
        self.kv.set(&Self::cache_key(email), &raw).await
    }
}

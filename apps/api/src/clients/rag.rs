/// RAG interview engine client. Generates interviewer turns, evaluates
/// answers and produces candidate profiles; this service only orchestrates.
///
/// Retries on 429 and 5xx with exponential backoff, since a dropped reply
/// mid-interview costs the whole exchange.
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::profile::CandidateProfile;

const REQUEST_TIMEOUT_SECS: u64 = 120;
const MAX_RETRIES: u32 = 3;

#[derive(Debug, Error)]
pub enum RagError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RAG engine error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("RAG engine returned an empty reply")]
    EmptyReply,

    #[error("Rate limited after {retries} retries")]
    RateLimited { retries: u32 },
}

#[async_trait]
pub trait RagInterviewer: Send + Sync {
    /// Sends one candidate utterance and returns the interviewer's reply.
    async fn conduct_interview(&self, message: &str, difficulty: &str)
        -> Result<String, RagError>;

    /// Asks the engine to score the most recent exchange.
    async fn auto_evaluate_last_response(&self) -> Result<(), RagError>;

    /// The engine's running profile, if it has scored anything yet.
    async fn current_profile(&self) -> Result<Option<CandidateProfile>, RagError>;

    /// Produces the final profile for the whole conversation.
    async fn generate_final_profile(&self) -> Result<CandidateProfile, RagError>;
}

#[derive(Debug, Deserialize)]
struct InterviewReply {
    reply: String,
}

/// HTTP implementation against the RAG engine REST API.
#[derive(Clone)]
pub struct HttpRagClient {
    client: Client,
    base_url: String,
}

impl HttpRagClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// POSTs `body` to `path`, retrying 429/5xx with backoff (1s, 2s).
    async fn post_with_retry(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::Response, RagError> {
        let mut last_error: Option<RagError> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = std::time::Duration::from_millis(1000 * (1 << (attempt - 1)));
                warn!(
                    "RAG call attempt {} failed, retrying after {}ms...",
                    attempt,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }

            let response = self.client.post(self.url(path)).json(body).send().await;

            let response = match response {
                Ok(r) => r,
                Err(e) => {
                    last_error = Some(RagError::Http(e));
                    continue;
                }
            };

            let status = response.status();

            if status.as_u16() == 429 || status.is_server_error() {
                let message = response.text().await.unwrap_or_default();
                warn!("RAG engine returned {status}: {message}");
                last_error = Some(RagError::Api {
                    status: status.as_u16(),
                    message,
                });
                continue;
            }

            if !status.is_success() {
                let message = response.text().await.unwrap_or_default();
                return Err(RagError::Api {
                    status: status.as_u16(),
                    message,
                });
            }

            return Ok(response);
        }

        Err(last_error.unwrap_or(RagError::RateLimited {
            retries: MAX_RETRIES,
        }))
    }
}

#[async_trait]
impl RagInterviewer for HttpRagClient {
    async fn conduct_interview(
        &self,
        message: &str,
        difficulty: &str,
    ) -> Result<String, RagError> {
        let body = serde_json::json!({ "message": message, "difficulty": difficulty });
        let resp = self.post_with_retry("/api/v1/interview", &body).await?;
        let reply: InterviewReply = resp.json().await?;
        if reply.reply.trim().is_empty() {
            return Err(RagError::EmptyReply);
        }
        debug!("RAG reply received ({} chars)", reply.reply.len());
        Ok(reply.reply)
    }

    async fn auto_evaluate_last_response(&self) -> Result<(), RagError> {
        self.post_with_retry("/api/v1/evaluate", &serde_json::json!({}))
            .await?;
        Ok(())
    }

    async fn current_profile(&self) -> Result<Option<CandidateProfile>, RagError> {
        let resp = self.client.get(self.url("/api/v1/profile")).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(RagError::Api {
                status: status.as_u16(),
                message,
            });
        }
        Ok(Some(resp.json().await?))
    }

    async fn generate_final_profile(&self) -> Result<CandidateProfile, RagError> {
        let resp = self
            .post_with_retry("/api/v1/profile/final", &serde_json::json!({}))
            .await?;
        Ok(resp.json().await?)
    }
}

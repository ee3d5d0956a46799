mod clients;
mod competency;
mod config;
mod errors;
mod interview;
mod models;
mod routes;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::clients::{HttpChatServiceClient, HttpRagClient};
use crate::competency::classifier::KeywordClassifier;
use crate::competency::repo::KvRatingRepository;
use crate::config::Config;
use crate::interview::phase::SessionRegistry;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::{KvStore, RedisKvStore};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize Redis (active-session pointers + competency rating cache)
    let redis = redis::Client::open(config.redis_url.clone())?;
    let kv: Arc<dyn KvStore> = Arc::new(RedisKvStore::new(redis));
    info!("Redis client initialized");

    // Outbound collaborators
    let chat = Arc::new(HttpChatServiceClient::new(config.chat_service_url.clone()));
    info!("Chat-session service client initialized ({})", config.chat_service_url);
    let rag = Arc::new(HttpRagClient::new(config.rag_service_url.clone()));
    info!("RAG engine client initialized ({})", config.rag_service_url);

    // Build app state
    let state = AppState {
        chat,
        rag,
        kv: kv.clone(),
        ratings: Arc::new(KvRatingRepository::new(kv)),
        classifier: Arc::new(KeywordClassifier),
        sessions: Arc::new(SessionRegistry::new()),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

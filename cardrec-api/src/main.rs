//! Card Recommendation API Server
//!
//! HTTP API server that ranks credit cards against a spending category and
//! summarizes their benefits with a language model.

mod config;
mod error;
mod routes;

use anyhow::Context;
use axum::{
    http::{header, Method},
    Router,
};
use cardrec_embedding::{EmbeddingClient, EmbeddingStore};
use cardrec_llm::{BenefitExtractor, OpenAIClient};
use cardrec_services::{RecommendationContext, RecommendationService};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::AppConfig;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub recommendation_service: Arc<RecommendationService>,
    /// Applied when a request leaves `top_n` out
    pub default_top_n: i64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env.local file
    if let Err(e) = dotenvy::from_filename(".env.local") {
        // Not an error if the file doesn't exist
        if !matches!(e, dotenvy::Error::Io(_)) {
            eprintln!("Warning: Failed to load .env.local: {}", e);
        }
    }

    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,cardrec_api=debug")),
        )
        .init();

    info!("Starting Card Recommendation API");

    let config = AppConfig::from_env()?;

    // Both embedding and chat clients read the key through async-openai
    std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

    if let Some(parent) = config.embedding_db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    info!("Opening embedding store at: {}", config.embedding_db_path.display());
    let store = EmbeddingStore::new(&config.embedding_db_path)
        .context("Failed to initialize embedding store")?;

    let embedder = EmbeddingClient::from_env()
        .with_model(&config.embedding_model, config.embedding_dimension);

    // Corpus and category vectors are resolved once, before serving
    info!("Loading card corpus from: {}", config.corpus_path.display());
    let context = RecommendationContext::load(&config.corpus_path, &store, &embedder)
        .await
        .context("Failed to build recommendation context")?;

    if let Ok(stats) = store.get_stats() {
        info!(
            "Embedding store: {} card vectors, {} category vectors, {} bytes",
            stats.card_count, stats.category_count, stats.database_size_bytes
        );
    }

    let generator = OpenAIClient::new()
        .with_model(&config.chat_model)
        .with_timeout(config.generation_timeout);
    info!("Benefit extraction using {}", generator.model());

    let recommendation_service =
        RecommendationService::new(Arc::new(context), BenefitExtractor::new(Arc::new(generator)));

    // Create app state
    let state = AppState {
        recommendation_service: Arc::new(recommendation_service),
        default_top_n: config.default_top_n,
    };

    // Configure CORS for frontend
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    // Build router
    let app = Router::new()
        .merge(routes::api_routes())
        .layer(cors)
        .with_state(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

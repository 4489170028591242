mod config;
mod db;
mod errors;
mod models;
mod routes;
mod search;
mod state;
mod store;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::search::engine::{SearchEngine, SearchSettings};
use crate::search::similarity::{EmbeddingSimilarityScorer, SimilarityScorer};
use crate::state::AppState;
use crate::store::postgres::PgDocumentStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting CV search API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL-backed document store
    let db = create_pool(&config.database_url, config.database_max_connections).await?;
    let store = Arc::new(PgDocumentStore::new(db));

    // Semantic blending is optional: without an endpoint, scores are keyword-only
    let similarity: Option<Arc<dyn SimilarityScorer>> = match &config.embedding_api_url {
        Some(url) => {
            info!(
                "Semantic similarity enabled (model: {}, concurrency: {})",
                config.embedding_model, config.similarity_concurrency
            );
            Some(Arc::new(EmbeddingSimilarityScorer::new(
                url.clone(),
                config.embedding_api_key.clone(),
                config.embedding_model.clone(),
            )?))
        }
        None => {
            info!("EMBEDDING_API_URL not set; semantic similarity disabled");
            None
        }
    };

    let engine = SearchEngine::new(store, similarity, SearchSettings::from(&config));

    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend domain is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

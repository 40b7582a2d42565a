mod analysis;
mod config;
mod corpus;
mod errors;
mod generation;
mod llm_client;
mod models;
mod retrieval;
mod routes;
mod state;

#[cfg(test)]
mod testing;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::llm_client::WatsonxClient;
use crate::retrieval::knowledge::KnowledgeBase;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed numeric env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Proposals API v{}", env!("CARGO_PKG_VERSION"));

    if config.credentials().is_err() {
        tracing::warn!(
            "WATSONX_API_KEY or WATSONX_PROJECT_ID not set; provider-backed endpoints will return 503"
        );
    }

    // Load the historical corpus once; read-only from here on
    let corpus = load_corpus(&config.corpus_path)?;

    // Knowledge base: file override or the built-in corpus
    let knowledge_base = match &config.knowledge_base_path {
        Some(path) => KnowledgeBase::from_path(path)?,
        None => KnowledgeBase::builtin(),
    };
    info!(
        "Knowledge base ready: {} practices in {} categories",
        knowledge_base.len(),
        knowledge_base.categories().len()
    );

    // Initialize provider client
    let llm = WatsonxClient::new(&config).context("Failed to build provider HTTP client")?;
    info!(
        "Provider client initialized (generation model: {}, embedding model: {})",
        llm.generation_model_id(),
        config.embedding_model_id
    );

    let state = AppState {
        llm: Arc::new(llm),
        corpus: Arc::new(corpus),
        knowledge_base: Arc::new(knowledge_base),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

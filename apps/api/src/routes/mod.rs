pub mod health;
pub mod knowledge;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::generation::handlers as generation;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/api/v1/knowledge-base",
            get(knowledge::handle_knowledge_base),
        )
        .route(
            "/api/v1/generate-proposal",
            post(generation::handle_generate_proposal),
        )
        .route(
            "/api/v1/analyze-outcome",
            post(analysis::handle_analyze_outcome),
        )
        .route(
            "/api/v1/analyze-proposal",
            post(analysis::handle_analyze_proposal),
        )
        .with_state(state)
}

use axum::{extract::State, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CategorySummary {
    pub name: String,
    pub practice_count: usize,
}

#[derive(Debug, Serialize)]
pub struct KnowledgeBaseSummary {
    pub categories: Vec<CategorySummary>,
    pub total_practices: usize,
}

/// GET /api/v1/knowledge-base
/// Lists the best-practice categories and how many statements each holds.
pub async fn handle_knowledge_base(State(state): State<AppState>) -> Json<KnowledgeBaseSummary> {
    let categories = state
        .knowledge_base
        .categories()
        .iter()
        .map(|c| CategorySummary {
            name: c.name.clone(),
            practice_count: c.practices.len(),
        })
        .collect();

    Json(KnowledgeBaseSummary {
        categories,
        total_practices: state.knowledge_base.len(),
    })
}

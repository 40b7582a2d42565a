//! Axum route handlers for the Analysis API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::critique::{analyze_proposal, ProposalCritique};
use crate::analysis::outcome::{estimate_win_probability, OutcomeEstimate};
use crate::errors::AppError;
use crate::models::ProposalContent;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AnalyzeProposalRequest {
    #[serde(default, alias = "proposal", alias = "proposalText")]
    pub proposal_text: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutcomeResponse {
    #[serde(flatten)]
    pub estimate: OutcomeEstimate,
    pub corpus_size: usize,
    pub analyzed_at: DateTime<Utc>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/analyze-outcome
///
/// Estimates the win probability of a proposal from its nearest historical neighbours.
pub async fn handle_analyze_outcome(
    State(state): State<AppState>,
    payload: Result<Json<ProposalContent>, JsonRejection>,
) -> Result<Json<AnalyzeOutcomeResponse>, AppError> {
    let Json(proposal) = payload?;
    let missing = proposal.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::Validation(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let session = state.open_session().await?;
    let estimate = estimate_win_probability(
        &proposal,
        &state.corpus,
        session.as_ref(),
        &state.config.outcome,
    )
    .await?;

    Ok(Json(AnalyzeOutcomeResponse {
        estimate,
        corpus_size: state.corpus.len(),
        analyzed_at: Utc::now(),
    }))
}

/// POST /api/v1/analyze-proposal
///
/// Critiques a proposal against the most relevant best practices.
pub async fn handle_analyze_proposal(
    State(state): State<AppState>,
    payload: Result<Json<AnalyzeProposalRequest>, JsonRejection>,
) -> Result<Json<ProposalCritique>, AppError> {
    let Json(request) = payload?;
    if request.proposal_text.trim().is_empty() {
        return Err(AppError::Validation(
            "proposal_text cannot be empty".to_string(),
        ));
    }

    let session = state.open_session().await?;
    let critique = analyze_proposal(
        session.as_ref(),
        &state.knowledge_base,
        &request.proposal_text,
        state.config.practices_top_k,
    )
    .await?;

    Ok(Json(critique))
}

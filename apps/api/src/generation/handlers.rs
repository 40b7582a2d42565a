//! Axum route handlers for the Generation API.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use chrono::Utc;

use crate::errors::AppError;
use crate::generation::generator::{generate_proposal, GenerateRequest, GeneratedProposal};
use crate::state::AppState;

/// POST /api/v1/generate-proposal
///
/// Drafts a proposal from the client profile and returns it split into sections.
pub async fn handle_generate_proposal(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GeneratedProposal>, AppError> {
    let Json(request) = payload?;
    request.validate()?;

    let session = state.open_session().await?;
    let proposal =
        generate_proposal(session.as_ref(), &request, Utc::now().date_naive()).await?;

    Ok(Json(proposal))
}

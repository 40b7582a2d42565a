//! Proposal critique: retrieval-augmented review against the best-practice corpus.
//!
//! Flow: retrieve top-k practices → fill critique template → generate → return
//! the raw critique with the practices and request metadata.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::analysis::prompts::{CRITIQUE_PROMPT_TEMPLATE, NO_PRACTICES};
use crate::errors::AppError;
use crate::llm_client::prompts::{MARKDOWN_SECTIONS_INSTRUCTION, PROFESSIONAL_TONE_INSTRUCTION};
use crate::llm_client::{EmbeddingProvider, GenerationParameters, TextGenerationProvider};
use crate::retrieval::knowledge::{retrieve_relevant_practices, KnowledgeBase, Practice};
use crate::retrieval::similarity::ScoredItem;

#[derive(Debug, Clone, Serialize)]
pub struct CritiqueMetadata {
    pub request_id: Uuid,
    pub analyzed_at: DateTime<Utc>,
    pub model_id: String,
    /// Every knowledge-base category that was searched.
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProposalCritique {
    pub analysis: String,
    pub relevant_practices: Vec<ScoredItem<Practice>>,
    pub metadata: CritiqueMetadata,
}

/// Decoding parameters for critiques.
pub fn critique_parameters() -> GenerationParameters {
    GenerationParameters {
        decoding_method: "greedy".to_string(),
        max_new_tokens: 1500,
        min_new_tokens: 100,
        repetition_penalty: 1.05,
        temperature: None,
        stop_sequences: Vec::new(),
    }
}

/// Critiques `proposal_text` against the `top_k` most relevant practices.
/// Callers reject blank text before opening a provider session.
pub async fn analyze_proposal<S>(
    session: &S,
    knowledge_base: &KnowledgeBase,
    proposal_text: &str,
    top_k: usize,
) -> Result<ProposalCritique, AppError>
where
    S: EmbeddingProvider + TextGenerationProvider + ?Sized,
{
    let practices =
        retrieve_relevant_practices(proposal_text, knowledge_base, session, top_k).await?;
    info!("Critiquing proposal against {} practices", practices.len());

    let prompt = build_critique_prompt(proposal_text, &practices);
    let analysis = session
        .generate(&prompt, &critique_parameters())
        .await
        .map_err(AppError::generation)?;

    Ok(ProposalCritique {
        analysis: analysis.trim().to_string(),
        relevant_practices: practices,
        metadata: CritiqueMetadata {
            request_id: Uuid::new_v4(),
            analyzed_at: Utc::now(),
            model_id: session.model_id().to_string(),
            categories: knowledge_base.category_names(),
        },
    })
}

fn build_critique_prompt(proposal_text: &str, practices: &[ScoredItem<Practice>]) -> String {
    let practice_list = if practices.is_empty() {
        NO_PRACTICES.to_string()
    } else {
        practices
            .iter()
            .enumerate()
            .map(|(i, scored)| {
                format!(
                    "{}. [{}] {}",
                    i + 1,
                    scored.item.category,
                    scored.item.statement
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    };

    CRITIQUE_PROMPT_TEMPLATE
        .replace("{tone_instruction}", PROFESSIONAL_TONE_INSTRUCTION)
        .replace("{format_instruction}", MARKDOWN_SECTIONS_INSTRUCTION)
        .replace("{practices}", &practice_list)
        .replace("{proposal_text}", proposal_text.trim())
}

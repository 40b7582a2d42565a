//! Best-practice knowledge base and the retriever that ranks it against a proposal.
//!
//! The knowledge base is built once at startup and shared read-only. Statements are
//! re-embedded on every retrieval; there is no index.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::debug;

use crate::errors::AppError;
use crate::llm_client::{EmbeddingProvider, LlmError};
use crate::retrieval::embed_checked;
use crate::retrieval::similarity::{rank_by_similarity, ScoredItem};

/// A single best-practice statement tagged with its category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Practice {
    pub category: String,
    pub statement: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PracticeCategory {
    pub name: String,
    pub practices: Vec<String>,
}

/// Category-partitioned best-practice statements. Category order is fixed at construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct KnowledgeBase {
    categories: Vec<PracticeCategory>,
}

impl KnowledgeBase {
    pub fn new(categories: Vec<PracticeCategory>) -> Self {
        Self { categories }
    }

    /// The curated corpus shipped with the service.
    pub fn builtin() -> Self {
        let category = |name: &str, practices: &[&str]| PracticeCategory {
            name: name.to_string(),
            practices: practices.iter().map(|s| s.to_string()).collect(),
        };

        Self::new(vec![
            category(
                "executiveSummary",
                &[
                    "Open with the client's core business problem before describing the solution.",
                    "State the quantified business outcome the client can expect within the first paragraph.",
                    "Keep the executive summary to one page and free of technical jargon.",
                    "Explain why your team is uniquely positioned to deliver, citing comparable past results.",
                    "Close the summary with a clear call to action and the next decision the client must make.",
                ],
            ),
            category(
                "technical",
                &[
                    "Describe the target architecture with a component diagram and the responsibility of each part.",
                    "Justify every major technology choice against the client's existing stack and skills.",
                    "Address security, data protection, and compliance requirements explicitly.",
                    "Define non-functional requirements such as availability, latency, and scalability targets.",
                    "Explain the integration approach for legacy systems and third-party services.",
                    "Describe the testing strategy, including acceptance criteria the client will sign off on.",
                ],
            ),
            category(
                "timeline",
                &[
                    "Break delivery into phases with concrete milestones and deliverables for each.",
                    "Identify the critical path and the dependencies that sit on it.",
                    "Include buffer for client reviews, approvals, and procurement lead times.",
                    "Tie each milestone to a measurable acceptance event rather than a calendar date alone.",
                    "Show an early, low-risk deliverable that proves value within the first weeks.",
                ],
            ),
            category(
                "budget",
                &[
                    "Itemise costs by phase and by role so the client can trace every figure.",
                    "Separate one-time implementation costs from recurring operating and licensing costs.",
                    "State pricing assumptions and what triggers a change request.",
                    "Present the expected return on investment and the payback period.",
                    "Offer options or tiers so the client can trade scope against cost.",
                ],
            ),
            category(
                "riskMitigation",
                &[
                    "List the top delivery risks with likelihood, impact, and a named owner.",
                    "Provide a concrete mitigation and a contingency plan for each major risk.",
                    "Address data migration and cut-over risk with rollback procedures.",
                    "Describe governance: steering meetings, status reporting, and escalation paths.",
                    "Plan for knowledge transfer so the client is not dependent on the vendor after go-live.",
                ],
            ),
        ])
    }

    /// Loads a knowledge base from a JSON object of `{category: [statement, ...]}`.
    /// Categories come back sorted by name; blank statements are skipped.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: BTreeMap<String, Vec<String>> = serde_json::from_str(json)
            .context("Knowledge base must be a JSON object of string arrays")?;

        Ok(Self::new(
            raw.into_iter()
                .map(|(name, practices)| PracticeCategory {
                    name,
                    practices: practices
                        .into_iter()
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect(),
                })
                .collect(),
        ))
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read knowledge base at {}", path.display()))?;
        Self::from_json_str(&json)
            .with_context(|| format!("Failed to parse knowledge base at {}", path.display()))
    }

    pub fn categories(&self) -> &[PracticeCategory] {
        &self.categories
    }

    pub fn category_names(&self) -> Vec<String> {
        self.categories.iter().map(|c| c.name.clone()).collect()
    }

    /// All statements flattened in category order, then statement order.
    pub fn practices(&self) -> Vec<Practice> {
        self.categories
            .iter()
            .flat_map(|c| {
                c.practices.iter().map(|statement| Practice {
                    category: c.name.clone(),
                    statement: statement.clone(),
                })
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.categories.iter().map(|c| c.practices.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Returns the `k` practices most similar to `proposal_text`, best first.
///
/// Two provider calls: one for the proposal, one batch for every statement.
/// Statements with no measurable similarity (zero-norm vectors) are left out.
pub async fn retrieve_relevant_practices<E>(
    proposal_text: &str,
    knowledge_base: &KnowledgeBase,
    embedder: &E,
    k: usize,
) -> Result<Vec<ScoredItem<Practice>>, AppError>
where
    E: EmbeddingProvider + ?Sized,
{
    let practices = knowledge_base.practices();
    if practices.is_empty() || k == 0 {
        return Ok(Vec::new());
    }

    let query = embed_checked(embedder, &[proposal_text.to_string()], None)
        .await?
        .pop()
        .ok_or_else(|| AppError::embedding(LlmError::EmptyContent))?;

    let statements: Vec<String> = practices.iter().map(|p| p.statement.clone()).collect();
    let vectors = embed_checked(embedder, &statements, Some(query.len())).await?;

    let top: Vec<ScoredItem<Practice>> =
        rank_by_similarity(&query, practices.into_iter().zip(vectors))
            .into_iter()
            .filter(|scored| !scored.score.is_nan())
            .take(k)
            .collect();

    debug!(
        "Retrieved {} of {} practices (k={k})",
        top.len(),
        statements.len()
    );
    Ok(top)
}

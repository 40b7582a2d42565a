//! Outcome estimation: k-nearest-neighbour vote over the historical corpus.
//!
//! Algorithm:
//! 1. Composite text per historical record and for the new proposal (same field order)
//! 2. One batched embedding call; the new proposal is the last input
//! 3. Rank historical records by cosine similarity, keep the top `neighbors`
//! 4. probability = (wins + α) / (k + 2α), k = neighbours actually used
//! 5. outcome = win when probability ≥ threshold
//!
//! With the defaults (3, α = 1, 0.5) an empty corpus yields exactly 0.5 → "win".

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::corpus::HistoricalCorpus;
use crate::errors::AppError;
use crate::llm_client::{EmbeddingProvider, LlmError};
use crate::models::{Outcome, OutcomeLabel, ProposalContent};
use crate::retrieval::embed_checked;
use crate::retrieval::similarity::rank_by_similarity;

/// Tunable constants of the neighbour vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeModel {
    /// Neighbours consulted (k before truncation to the corpus size).
    pub neighbors: usize,
    /// Pseudo-count added to each outcome (1.0 = Laplace add-one).
    pub smoothing: f64,
    /// Probability at or above which the outcome is "win".
    pub threshold: f64,
}

impl Default for OutcomeModel {
    fn default() -> Self {
        Self {
            neighbors: 3,
            smoothing: 1.0,
            threshold: 0.5,
        }
    }
}

impl OutcomeModel {
    /// Smoothed win probability for `wins` out of `k` neighbours.
    pub fn probability(&self, wins: usize, k: usize) -> f64 {
        let denominator = k as f64 + 2.0 * self.smoothing;
        if denominator <= 0.0 {
            return 0.5;
        }
        (wins as f64 + self.smoothing) / denominator
    }

    pub fn classify(&self, probability: f64) -> Outcome {
        if probability >= self.threshold {
            Outcome::Win
        } else {
            Outcome::Loss
        }
    }
}

/// A historical record that took part in the vote.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Neighbor {
    /// Position of the record in the corpus.
    pub index: usize,
    pub score: f32,
    pub label: OutcomeLabel,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeEstimate {
    pub outcome: Outcome,
    pub probability: f64,
    pub wins: usize,
    pub neighbors: Vec<Neighbor>,
}

/// Estimates the chance that `proposal` wins, from its nearest historical neighbours.
///
/// Any embedding failure fails the whole estimate; no partial result is returned.
pub async fn estimate_win_probability<E>(
    proposal: &ProposalContent,
    corpus: &HistoricalCorpus,
    embedder: &E,
    model: &OutcomeModel,
) -> Result<OutcomeEstimate, AppError>
where
    E: EmbeddingProvider + ?Sized,
{
    let mut texts: Vec<String> = corpus
        .proposals()
        .iter()
        .map(|p| p.content.composite_text())
        .collect();
    texts.push(proposal.composite_text());

    let mut vectors = embed_checked(embedder, &texts, None).await?;
    let query = vectors
        .pop()
        .ok_or_else(|| AppError::embedding(LlmError::EmptyContent))?;

    let neighbors: Vec<Neighbor> = rank_by_similarity(
        &query,
        corpus.proposals().iter().enumerate().zip(vectors),
    )
    .into_iter()
    .filter(|scored| !scored.score.is_nan())
    .take(model.neighbors)
    .map(|scored| {
        let (index, record) = scored.item;
        Neighbor {
            index,
            score: scored.score,
            label: record.label,
        }
    })
    .collect();

    let wins = neighbors.iter().filter(|n| n.label.is_win()).count();
    let probability = model.probability(wins, neighbors.len());
    let outcome = model.classify(probability);

    debug!(
        "Outcome estimate: {wins}/{} winning neighbours → p={probability:.3} ({})",
        neighbors.len(),
        outcome.as_str()
    );

    Ok(OutcomeEstimate {
        outcome,
        probability,
        wins,
        neighbors,
    })
}

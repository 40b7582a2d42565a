use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

use crate::models::{HistoricalProposal, OutcomeLabel};

/// Past proposals with their outcomes, loaded once at startup and shared read-only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoricalCorpus {
    proposals: Vec<HistoricalProposal>,
}

impl HistoricalCorpus {
    pub fn new(proposals: Vec<HistoricalProposal>) -> Self {
        Self { proposals }
    }

    pub fn proposals(&self) -> &[HistoricalProposal] {
        &self.proposals
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}

/// Reads the historical corpus from a JSON array of proposal records.
pub fn load_corpus(path: &Path) -> Result<HistoricalCorpus> {
    info!("Loading historical corpus from {}...", path.display());

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read historical corpus at {}", path.display()))?;
    let proposals: Vec<HistoricalProposal> = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse historical corpus at {}", path.display()))?;

    let labeled = proposals
        .iter()
        .filter(|p| matches!(p.label, OutcomeLabel::Labeled(_)))
        .count();
    info!(
        "Historical corpus loaded: {} proposals ({} labeled)",
        proposals.len(),
        labeled
    );

    Ok(HistoricalCorpus::new(proposals))
}

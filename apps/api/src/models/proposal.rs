use serde::{Deserialize, Serialize};

/// Final result of a past bid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Win => "win",
            Outcome::Loss => "loss",
        }
    }
}

/// Outcome label of a historical record. Records without a recognised label still
/// take part in neighbour search but never count as a win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "status", content = "outcome")]
pub enum OutcomeLabel {
    Labeled(Outcome),
    Unlabeled,
}

impl OutcomeLabel {
    pub fn is_win(&self) -> bool {
        matches!(self, OutcomeLabel::Labeled(Outcome::Win))
    }

    fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("win") => OutcomeLabel::Labeled(Outcome::Win),
            Some("loss") => OutcomeLabel::Labeled(Outcome::Loss),
            _ => OutcomeLabel::Unlabeled,
        }
    }
}

/// The three narrative fields shared by historical records and submitted proposals.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalContent {
    #[serde(default, alias = "executiveSummary")]
    pub executive_summary: String,
    #[serde(default, alias = "projectScope")]
    pub project_scope: String,
    #[serde(default, alias = "technicalDetails")]
    pub technical_details: String,
}

impl ProposalContent {
    /// Labeled concatenation used as the embedding input. Field order is fixed.
    pub fn composite_text(&self) -> String {
        format!(
            "Executive Summary: {}\nProject Scope: {}\nTechnical Details: {}",
            self.executive_summary.trim(),
            self.project_scope.trim(),
            self.technical_details.trim()
        )
    }

    /// Names of required fields that are blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("executive_summary", &self.executive_summary),
            ("project_scope", &self.project_scope),
            ("technical_details", &self.technical_details),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect()
    }
}

/// A past proposal with its (optional) outcome. Read-only once loaded.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawHistoricalProposal")]
pub struct HistoricalProposal {
    pub content: ProposalContent,
    pub label: OutcomeLabel,
}

impl HistoricalProposal {
    pub fn new(content: ProposalContent, label: OutcomeLabel) -> Self {
        Self { content, label }
    }
}

#[derive(Deserialize)]
struct RawHistoricalProposal {
    #[serde(flatten)]
    content: ProposalContent,
    #[serde(default)]
    metadata: Option<RawMetadata>,
}

#[derive(Deserialize)]
struct RawMetadata {
    #[serde(default)]
    outcome: Option<String>,
}

impl From<RawHistoricalProposal> for HistoricalProposal {
    fn from(raw: RawHistoricalProposal) -> Self {
        let outcome = raw.metadata.as_ref().and_then(|m| m.outcome.as_deref());
        Self {
            content: raw.content,
            label: OutcomeLabel::parse(outcome),
        }
    }
}

/// A titled block of generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposalSection {
    pub title: String,
    pub content: String,
}

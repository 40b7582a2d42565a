//! Proposal generation: fills the proposal template, calls the generator, and
//! parses the output into sections.
//!
//! Flow: build prompt → generate → parse_sections → response. Requests are
//! validated by the handler before a provider session is opened.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::generation::prompts::{NOT_SPECIFIED, PROPOSAL_PROMPT_TEMPLATE};
use crate::generation::sections::parse_sections;
use crate::llm_client::prompts::{MARKDOWN_SECTIONS_INSTRUCTION, PROFESSIONAL_TONE_INSTRUCTION};
use crate::llm_client::{GenerationParameters, TextGenerationProvider};
use crate::models::ProposalSection;

/// Title attached to every generated proposal.
pub const PROPOSAL_TITLE: &str = "Business Proposal";

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// Request body for proposal generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(default, alias = "clientName")]
    pub client_name: String,
    #[serde(default)]
    pub industry: String,
    #[serde(default, alias = "companySize", alias = "size")]
    pub company_size: String,
    #[serde(default)]
    pub requirements: String,
    #[serde(default)]
    pub budget: String,
    #[serde(default)]
    pub timeline: String,
}

impl GenerateRequest {
    /// Rejects requests with blank required fields.
    pub fn validate(&self) -> Result<(), AppError> {
        let missing: Vec<&str> = [
            ("client_name", &self.client_name),
            ("industry", &self.industry),
            ("requirements", &self.requirements),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "Missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// A generated proposal split into sections.
#[derive(Debug, Clone, Serialize)]
pub struct GeneratedProposal {
    pub title: String,
    pub client_name: String,
    pub date: NaiveDate,
    pub sections: Vec<ProposalSection>,
}

// ────────────────────────────────────────────────────────────────────────────
// Generation pipeline
// ────────────────────────────────────────────────────────────────────────────

/// Decoding parameters for full proposal drafts.
pub fn proposal_parameters() -> GenerationParameters {
    GenerationParameters {
        decoding_method: "greedy".to_string(),
        max_new_tokens: 2000,
        min_new_tokens: 200,
        repetition_penalty: 1.1,
        temperature: None,
        stop_sequences: Vec::new(),
    }
}

/// Generates a proposal for `request`, dated `date`.
pub async fn generate_proposal<G>(
    generator: &G,
    request: &GenerateRequest,
    date: NaiveDate,
) -> Result<GeneratedProposal, AppError>
where
    G: TextGenerationProvider + ?Sized,
{
    let prompt = build_proposal_prompt(request);
    info!(
        "Generating proposal for '{}' ({}) with {}",
        request.client_name.trim(),
        request.industry.trim(),
        generator.model_id()
    );

    let text = generator
        .generate(&prompt, &proposal_parameters())
        .await
        .map_err(AppError::generation)?;

    let sections = parse_sections(&text);
    if sections.is_empty() {
        warn!(
            "Generated proposal contained no sections: {:?}",
            text.chars().take(80).collect::<String>()
        );
    } else {
        info!("Generated proposal with {} sections", sections.len());
    }

    Ok(GeneratedProposal {
        title: PROPOSAL_TITLE.to_string(),
        client_name: request.client_name.trim().to_string(),
        date,
        sections,
    })
}

/// Fills the proposal template. Blank optional fields become "Not specified".
fn build_proposal_prompt(request: &GenerateRequest) -> String {
    let or_default = |value: &str| {
        let value = value.trim();
        if value.is_empty() {
            NOT_SPECIFIED.to_string()
        } else {
            value.to_string()
        }
    };

    PROPOSAL_PROMPT_TEMPLATE
        .replace("{tone_instruction}", PROFESSIONAL_TONE_INSTRUCTION)
        .replace("{format_instruction}", MARKDOWN_SECTIONS_INSTRUCTION)
        .replace("{client_name}", &or_default(&request.client_name))
        .replace("{industry}", &or_default(&request.industry))
        .replace("{company_size}", &or_default(&request.company_size))
        .replace("{requirements}", &or_default(&request.requirements))
        .replace("{budget}", &or_default(&request.budget))
        .replace("{timeline}", &or_default(&request.timeline))
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::StaticGenerator;

    fn request() -> GenerateRequest {
        GenerateRequest {
            client_name: "Acme Bakeries".to_string(),
            industry: "Retail".to_string(),
            company_size: "250 employees".to_string(),
            requirements: "Online ordering and loyalty".to_string(),
            budget: String::new(),
            timeline: "6 months".to_string(),
        }
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 14).unwrap()
    }

    #[test]
    fn test_prompt_fills_every_placeholder() {
        let prompt = build_proposal_prompt(&request());
        assert!(prompt.contains("Client name: Acme Bakeries"));
        assert!(prompt.contains("Company size: 250 employees"));
        assert!(prompt.contains("Budget: Not specified"));
        assert!(prompt.contains("Timeline: 6 months"));
        assert!(prompt.contains(MARKDOWN_SECTIONS_INSTRUCTION));
        assert!(!prompt.contains('{'), "unfilled placeholder in prompt");
    }

    #[test]
    fn test_validate_lists_missing_fields() {
        let bad = GenerateRequest {
            client_name: "  ".to_string(),
            requirements: String::new(),
            ..request()
        };
        match bad.validate() {
            Err(AppError::Validation(msg)) => {
                assert!(msg.contains("client_name"));
                assert!(msg.contains("requirements"));
                assert!(!msg.contains("industry"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_request_accepts_camel_case() {
        let request: GenerateRequest = serde_json::from_value(serde_json::json!({
            "clientName": "Acme",
            "industry": "Retail",
            "size": "small",
            "requirements": "POS"
        }))
        .unwrap();
        assert_eq!(request.client_name, "Acme");
        assert_eq!(request.company_size, "small");
        assert!(request.budget.is_empty());
    }

    #[tokio::test]
    async fn test_generate_parses_sections() {
        let generator = StaticGenerator::new(
            "Here is your proposal.\n## Executive Summary\nWe will grow online sales.\n## Timeline\nPhase 1: 2 months\nPhase 2: 4 months\n## Budget\n",
        );

        let proposal = generate_proposal(&generator, &request(), date()).await.unwrap();

        assert_eq!(proposal.title, PROPOSAL_TITLE);
        assert_eq!(proposal.client_name, "Acme Bakeries");
        assert_eq!(proposal.date, date());
        assert_eq!(proposal.sections.len(), 2);
        assert_eq!(proposal.sections[1].title, "Timeline");
        assert_eq!(proposal.sections[1].content, "Phase 1: 2 months\nPhase 2: 4 months");
        assert_eq!(generator.prompts().len(), 1);
    }

    #[tokio::test]
    async fn test_generation_failure_propagates() {
        let generator = StaticGenerator::failing(500);
        let err = generate_proposal(&generator, &request(), date())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::GenerationProvider {
                status: Some(500),
                ..
            }
        ));
    }
}

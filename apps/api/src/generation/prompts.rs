// Prompt constants for proposal generation.
// Reuses cross-cutting fragments from llm_client::prompts.

/// Proposal generation prompt template.
/// Replace: {format_instruction}, {tone_instruction}, {client_name}, {industry},
///          {company_size}, {requirements}, {budget}, {timeline}
pub const PROPOSAL_PROMPT_TEMPLATE: &str = r#"You are an experienced bid manager writing a business proposal for a prospective client.

{tone_instruction}

{format_instruction}

CLIENT PROFILE:
- Client name: {client_name}
- Industry: {industry}
- Company size: {company_size}

CLIENT REQUIREMENTS:
{requirements}

COMMERCIAL CONSTRAINTS:
- Budget: {budget}
- Timeline: {timeline}

Write the proposal with these sections, in this order:
## Executive Summary
## Project Scope
## Technical Approach
## Timeline
## Budget
## Risk Mitigation
## Why Us

Tailor every section to the client's industry and requirements. Where a constraint is
"Not specified", propose a reasonable assumption and label it as an assumption.

PROPOSAL:
"#;

/// Placeholder used for optional request fields left blank.
pub const NOT_SPECIFIED: &str = "Not specified";

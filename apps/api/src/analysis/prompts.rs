// Prompt constants for proposal critique.

/// Critique prompt template.
/// Replace: {tone_instruction}, {format_instruction}, {practices}, {proposal_text}
pub const CRITIQUE_PROMPT_TEMPLATE: &str = r#"You are a senior bid reviewer. Critique the business proposal below against the
best practices retrieved for it.

{tone_instruction}

{format_instruction}

RELEVANT BEST PRACTICES (most relevant first):
{practices}

PROPOSAL UNDER REVIEW:
{proposal_text}

Structure the critique as follows:

## Scores
Score the proposal from 1 to 10 on each criterion, with one sentence of justification each:
- Clarity
- Completeness
- Feasibility
- Value Proposition

## Section Gap Analysis
For each section of the proposal (executive summary, scope, technical approach, timeline,
budget, risk mitigation), state which of the best practices above it meets, which it misses,
and what specifically is absent.

## Recommendations
List the five most impactful concrete changes, highest impact first.

CRITIQUE:
"#;

/// Shown in place of the practice list when nothing relevant was retrieved.
pub const NO_PRACTICES: &str =
    "(no best practices available; rely on general bid-writing standards)";

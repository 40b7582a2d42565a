// Shared prompt fragments.
// Each flow that calls the generator defines its own prompts.rs alongside it.
// This file contains the cross-cutting pieces.

/// Output-format instruction shared by every prompt whose answer is parsed into sections.
pub const MARKDOWN_SECTIONS_INSTRUCTION: &str = "\
    Format the response in markdown. Start every section with a level-two heading \
    (`## Section Title`) on its own line, followed by the section body. \
    Do NOT use level-two headings for anything else.";

/// Register instruction shared by generation and critique prompts.
pub const PROFESSIONAL_TONE_INSTRUCTION: &str = "\
    Write in a clear, professional business register. Be specific and concrete. \
    Do NOT invent figures, client names, or commitments that are not present in the input.";

// Proposal analysis: historical outcome estimation and best-practice critique.
// All provider calls go through llm_client traits; nothing here talks HTTP.

pub mod critique;
pub mod handlers;
pub mod outcome;
pub mod prompts;

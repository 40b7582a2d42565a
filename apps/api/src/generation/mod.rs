// Proposal generation: prompt building, generation, and section parsing.
// All provider calls go through llm_client; no direct HTTP calls here.

pub mod generator;
pub mod handlers;
pub mod prompts;
pub mod sections;

pub mod proposal;

pub use proposal::{HistoricalProposal, Outcome, OutcomeLabel, ProposalContent, ProposalSection};

//! Error types for field generation and tabulation.

use es_core::{CandidateId, Party};
use thiserror::Error;

/// Candidate-field or population construction failure. A district without a
/// valid field is a configuration problem, never an election outcome.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GenerateError {
    #[error("party {0} has no candidates")]
    EmptyParty(Party),
    #[error("population has no {0} group")]
    MissingGroup(Party),
    #[error("population has no groups with positive weight")]
    EmptyPopulation,
    #[error("group {party} has invalid weight {weight}")]
    InvalidWeight { party: Party, weight: f64 },
    #[error("candidate field of {0} entrants exceeds the id range")]
    FieldTooLarge(usize),
}

/// Tabulation failure. Unreachable with a valid configuration; fatal for the
/// affected district only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TabError {
    #[error("no ballots to tabulate")]
    NoBallots,
    #[error("candidate field is empty")]
    NoCandidates,
    #[error("candidate {0} appears twice in the field")]
    DuplicateCandidate(CandidateId),
    #[error("ballot {ballot} ranks unknown candidate {candidate}")]
    UnknownCandidate { ballot: usize, candidate: CandidateId },
    #[error("ballot {ballot} ranks candidate {candidate} more than once")]
    DuplicateRanking { ballot: usize, candidate: CandidateId },
    #[error("{stage}: tie could not be resolved")]
    UnresolvedTie { stage: &'static str },
}

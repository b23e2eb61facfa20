// crates/es_algo/src/tabulation/plurality.rs
//
// First-choice plurality over a field. Counts are reported in field order;
// the winner is the highest count, ties to the lower CandidateId.

use es_core::determinism::standings;
use es_core::{Ballot, CandidateId};
use serde::Serialize;

use super::field_index::FieldIndex;
use crate::errors::TabError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluralityOutcome {
    pub winner: CandidateId,
    /// Winner minus runner-up; the winner's own count when unopposed.
    pub margin: u64,
    /// First-choice counts in field order.
    pub counts: Vec<(CandidateId, u64)>,
    /// Ballots ranking no candidate in the field.
    pub exhausted: u64,
}

/// Count each ballot's highest-ranked field member. No validation.
pub(crate) fn count_first_choices(field: &FieldIndex, ballots: &[Ballot]) -> (Vec<u64>, u64) {
    let mut counts = vec![0u64; field.len()];
    let mut exhausted = 0u64;
    for b in ballots {
        match b.ranking().iter().find_map(|&c| field.position(c)) {
            Some(p) => counts[p] += 1,
            None => exhausted += 1,
        }
    }
    (counts, exhausted)
}

/// Winner and margin from `(id, count)` pairs in any order.
pub(crate) fn decide(counts: &[(CandidateId, u64)]) -> Option<(CandidateId, u64)> {
    let ranked = standings(counts.iter().copied());
    let (winner, top) = *ranked.first()?;
    let runner_up = ranked.get(1).map_or(0, |&(_, c)| c);
    Some((winner, top - runner_up))
}

pub fn tabulate_plurality(field: &[CandidateId], ballots: &[Ballot]) -> Result<PluralityOutcome, TabError> {
    let index = FieldIndex::new(field)?;
    index.validate_ballots(ballots)?;

    let (raw, exhausted) = count_first_choices(&index, ballots);
    let counts = index.with_ids(&raw);
    let (winner, margin) = decide(&counts).ok_or(TabError::UnresolvedTie { stage: "plurality" })?;
    Ok(PluralityOutcome { winner, margin, counts, exhausted })
}

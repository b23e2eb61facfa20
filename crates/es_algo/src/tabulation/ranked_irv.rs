// crates/es_algo/src/tabulation/ranked_irv.rs
//
// Instant-runoff with a full round log.
//
// Each round tallies every ballot's highest-ranked continuing candidate.
// Ballots with no continuing preference are exhausted and leave the majority
// denominator. A candidate wins with votes * 2 > continuing ballots, or by
// being the last one standing. Otherwise one candidate is eliminated:
//   1) fewest votes this round
//   2) then fewest cumulative votes over all rounds so far
//   3) then the higher CandidateId

use core::cmp::Reverse;

use es_core::{Ballot, CandidateId};
use serde::Serialize;

use super::field_index::FieldIndex;
use crate::errors::TabError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrvRound {
    /// 1-based.
    pub round: u32,
    /// Votes for each continuing candidate, ascending id.
    pub counts: Vec<(CandidateId, u64)>,
    pub continuing_ballots: u64,
    pub exhausted_ballots: u64,
    /// Candidate dropped at the end of this round; `None` in the final round.
    pub eliminated: Option<CandidateId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IrvOutcome {
    pub winner: CandidateId,
    /// Winner minus runner-up in the final round.
    pub margin: u64,
    pub rounds: Vec<IrvRound>,
}

/// First continuing preference, as a field position.
#[inline]
fn next_active_pref(ballot: &Ballot, index: &FieldIndex, active: &[bool]) -> Option<usize> {
    ballot
        .ranking()
        .iter()
        .filter_map(|&c| index.position(c))
        .find(|&p| active[p])
}

/// `(counts by position, continuing ballots)`; exhausted ballots are skipped.
fn tally_current_first_choices(ballots: &[Ballot], index: &FieldIndex, active: &[bool]) -> (Vec<u64>, u64) {
    let mut counts = vec![0u64; index.len()];
    let mut continuing = 0u64;
    for b in ballots {
        if let Some(p) = next_active_pref(b, index, active) {
            counts[p] += 1;
            continuing += 1;
        }
    }
    (counts, continuing)
}

fn check_majority(counts: &[u64], active: &[bool], continuing_ballots: u64) -> Option<usize> {
    (0..counts.len()).find(|&p| active[p] && counts[p] * 2 > continuing_ballots)
}

fn pick_lowest_to_eliminate(counts: &[u64], cumulative: &[u64], active: &[bool]) -> Option<usize> {
    (0..counts.len())
        .filter(|&p| active[p])
        .min_by_key(|&p| (counts[p], cumulative[p], Reverse(p)))
}

pub fn tabulate_irv(field: &[CandidateId], ballots: &[Ballot]) -> Result<IrvOutcome, TabError> {
    // Positions follow ascending id, so Reverse(position) eliminates the higher id.
    let mut by_id: Vec<CandidateId> = field.to_vec();
    by_id.sort_unstable();
    let index = FieldIndex::new(&by_id)?;
    index.validate_ballots(ballots)?;

    let n = index.len();
    let total = ballots.len() as u64;
    let mut active = vec![true; n];
    let mut cumulative = vec![0u64; n];
    let mut rounds: Vec<IrvRound> = Vec::with_capacity(n);

    loop {
        let (counts, continuing) = tally_current_first_choices(ballots, &index, &active);
        for (c, v) in cumulative.iter_mut().zip(&counts) {
            *c += v;
        }
        let standing: Vec<(CandidateId, u64)> =
            (0..n).filter(|&p| active[p]).map(|p| (index.id(p), counts[p])).collect();

        let remaining = standing.len();
        let decided = if remaining == 1 {
            (0..n).find(|&p| active[p])
        } else {
            check_majority(&counts, &active, continuing)
        };

        let round = rounds.len() as u32 + 1;
        if let Some(p) = decided {
            let winner = index.id(p);
            let runner_up = standing
                .iter()
                .filter(|&&(c, _)| c != winner)
                .map(|&(_, v)| v)
                .max()
                .unwrap_or(0);
            let margin = counts[p].saturating_sub(runner_up);
            rounds.push(IrvRound {
                round,
                counts: standing,
                continuing_ballots: continuing,
                exhausted_ballots: total - continuing,
                eliminated: None,
            });
            return Ok(IrvOutcome { winner, margin, rounds });
        }

        let out = pick_lowest_to_eliminate(&counts, &cumulative, &active)
            .ok_or(TabError::UnresolvedTie { stage: "irv elimination" })?;
        active[out] = false;
        rounds.push(IrvRound {
            round,
            counts: standing,
            continuing_ballots: continuing,
            exhausted_ballots: total - continuing,
            eliminated: Some(index.id(out)),
        });
    }
}

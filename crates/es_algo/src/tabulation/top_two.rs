// crates/es_algo/src/tabulation/top_two.rs
//
// Nonpartisan top-two: a plurality first round picks the two leaders
// regardless of party, then each ballot backs whichever finalist it ranks
// higher. Equivalent to IRV stopped after a single bulk elimination.

use es_core::determinism::standings;
use es_core::{Ballot, CandidateId};
use serde::Serialize;

use super::field_index::FieldIndex;
use super::plurality::{count_first_choices, decide};
use crate::errors::TabError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopTwoOutcome {
    pub winner: CandidateId,
    pub margin: u64,
    /// First-round counts, field order.
    pub first_round: Vec<(CandidateId, u64)>,
    /// One entry when the field has a single candidate.
    pub finalists: Vec<CandidateId>,
    /// Runoff counts in finalist order.
    pub runoff: Vec<(CandidateId, u64)>,
    /// Ballots ranking neither finalist.
    pub exhausted: u64,
}

pub fn tabulate_top_two(field: &[CandidateId], ballots: &[Ballot]) -> Result<TopTwoOutcome, TabError> {
    let index = FieldIndex::new(field)?;
    index.validate_ballots(ballots)?;

    let (raw, _) = count_first_choices(&index, ballots);
    let first_round = index.with_ids(&raw);
    let finalists: Vec<CandidateId> = standings(first_round.iter().copied())
        .into_iter()
        .take(2)
        .map(|(c, _)| c)
        .collect();

    let (runoff, exhausted) = match finalists.as_slice() {
        [a, b] => {
            let (mut va, mut vb, mut ex) = (0u64, 0u64, 0u64);
            for ballot in ballots {
                match ballot.prefers(*a, *b) {
                    Some(true) => va += 1,
                    Some(false) => vb += 1,
                    None => ex += 1,
                }
            }
            (vec![(*a, va), (*b, vb)], ex)
        }
        [a] => {
            let ranked = ballots.iter().filter(|b| b.rank_of(*a).is_some()).count() as u64;
            (vec![(*a, ranked)], ballots.len() as u64 - ranked)
        }
        _ => return Err(TabError::UnresolvedTie { stage: "top-2 first round" }),
    };

    let (winner, margin) = decide(&runoff).ok_or(TabError::UnresolvedTie { stage: "top-2 runoff" })?;
    Ok(TopTwoOutcome { winner, margin, first_round, finalists, runoff, exhausted })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(xs: &[u16]) -> Vec<CandidateId> {
        xs.iter().map(|&x| CandidateId(x)).collect()
    }

    fn ballots(rows: &[&[u16]]) -> Vec<Ballot> {
        rows.iter().map(|r| Ballot::new(ids(r))).collect()
    }

    #[test]
    fn runoff_reverses_first_round_leader() {
        // C0 leads the first round, but C2's and C1's voters prefer C1 in the runoff
        let bs = ballots(&[
            &[0, 1, 2],
            &[0, 1, 2],
            &[0, 1, 2],
            &[1, 2, 0],
            &[1, 2, 0],
            &[2, 1, 0],
            &[2, 1, 0],
        ]);
        let out = tabulate_top_two(&ids(&[0, 1, 2]), &bs).unwrap();
        assert_eq!(out.finalists, ids(&[0, 1]));
        assert_eq!(out.runoff, vec![(CandidateId(0), 3), (CandidateId(1), 4)]);
        assert_eq!(out.winner, CandidateId(1));
        assert_eq!(out.margin, 1);
        assert_eq!(out.exhausted, 0);
    }

    #[test]
    fn finalist_tie_goes_to_lower_id_and_truncated_ballots_exhaust() {
        let bs = ballots(&[&[2, 0], &[1, 2], &[0], &[3]]);
        let out = tabulate_top_two(&ids(&[0, 1, 2, 3]), &bs).unwrap();
        assert_eq!(out.finalists, ids(&[0, 1]));
        // [2,0] backs 0, [1,2] backs 1, [0] backs 0, [3] ranks neither
        assert_eq!(out.runoff, vec![(CandidateId(0), 2), (CandidateId(1), 1)]);
        assert_eq!(out.exhausted, 1);
        assert_eq!(out.winner, CandidateId(0));
    }

    #[test]
    fn single_candidate_wins_unopposed() {
        let out = tabulate_top_two(&ids(&[5]), &ballots(&[&[5], &[]])).unwrap();
        assert_eq!(out.finalists, ids(&[5]));
        assert_eq!((out.winner, out.margin, out.exhausted), (CandidateId(5), 1, 1));
    }
}

//! Ranked Condorcet with Copeland completion (deterministic, integers-only).
//!
//! - Build a dense pairwise matrix from full rankings: `wins[i][j]` counts
//!   ballots ranking candidate `i` above candidate `j`. A ranked candidate
//!   sits above every unranked one; two unranked candidates express nothing.
//! - A Condorcet winner strictly beats every other candidate.
//! - Without one, the winner is the best Copeland score (2 per pairwise win,
//!   1 per pairwise tie), then the smallest worst defeat, then the lower
//!   `CandidateId`. `cycle` is set exactly when there is no Condorcet winner.
//!
//! Loops run by index over the field sorted by id, so nothing depends on map
//! iteration order.

use es_core::{Ballot, CandidateId};
use serde::Serialize;

use super::field_index::FieldIndex;
use crate::errors::TabError;

/// `wins[i][j]` = ballots preferring `candidates[i]` over `candidates[j]`.
/// The diagonal stays 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairwiseMatrix {
    pub candidates: Vec<CandidateId>,
    pub wins: Vec<Vec<u64>>,
}

impl PairwiseMatrix {
    /// One pass over the ballots; each ballot touches every ordered pair once.
    fn from_ballots(index: &FieldIndex, ballots: &[Ballot]) -> Self {
        let n = index.len();
        let mut wins = vec![vec![0u64; n]; n];
        let mut rank: Vec<Option<usize>> = vec![None; n];
        for ballot in ballots {
            rank.iter_mut().for_each(|r| *r = None);
            for (r, &c) in ballot.ranking().iter().enumerate() {
                if let Some(p) = index.position(c) {
                    rank[p] = Some(r);
                }
            }
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let above = match (rank[i], rank[j]) {
                        (Some(ri), Some(rj)) => ri < rj,
                        (Some(_), None) => true,
                        _ => false,
                    };
                    if above {
                        wins[i][j] += 1;
                    }
                }
            }
        }
        Self { candidates: index.ids().to_vec(), wins }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// `wins(i, j) - wins(j, i)` by position.
    #[inline]
    pub fn margin(&self, i: usize, j: usize) -> i64 {
        self.wins[i][j] as i64 - self.wins[j][i] as i64
    }

    /// Position of the candidate who strictly beats all others, if any.
    pub fn condorcet_winner(&self) -> Option<usize> {
        (0..self.len()).find(|&i| (0..self.len()).all(|j| i == j || self.margin(i, j) > 0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopelandEntry {
    pub candidate: CandidateId,
    pub wins: u32,
    pub ties: u32,
    pub losses: u32,
    /// 2 * wins + ties.
    pub score: u32,
    /// Largest pairwise defeat margin; 0 when undefeated.
    pub worst_defeat: u64,
}

fn copeland(m: &PairwiseMatrix) -> Vec<CopelandEntry> {
    (0..m.len())
        .map(|i| {
            let (mut wins, mut ties, mut losses, mut worst) = (0u32, 0u32, 0u32, 0u64);
            for j in (0..m.len()).filter(|&j| j != i) {
                match m.margin(i, j) {
                    d if d > 0 => wins += 1,
                    0 => ties += 1,
                    d => {
                        losses += 1;
                        worst = worst.max(d.unsigned_abs());
                    }
                }
            }
            CopelandEntry { candidate: m.candidates[i], wins, ties, losses, score: 2 * wins + ties, worst_defeat: worst }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CondorcetOutcome {
    pub winner: CandidateId,
    /// The winner's smallest pairwise margin over any opponent; negative
    /// when a cycle is resolved in favour of a candidate with a defeat.
    /// For an unopposed candidate, the ballots ranking it.
    pub margin: i64,
    pub matrix: PairwiseMatrix,
    pub copeland: Vec<CopelandEntry>,
    pub condorcet_winner: Option<CandidateId>,
    pub cycle: bool,
}

pub fn tabulate_condorcet(field: &[CandidateId], ballots: &[Ballot]) -> Result<CondorcetOutcome, TabError> {
    let mut by_id = field.to_vec();
    by_id.sort_unstable();
    let index = FieldIndex::new(&by_id)?;
    index.validate_ballots(ballots)?;

    let matrix = PairwiseMatrix::from_ballots(&index, ballots);
    let scores = copeland(&matrix);
    let condorcet = matrix.condorcet_winner();

    let pos = match condorcet {
        Some(p) => p,
        None => (0..scores.len())
            .min_by(|&a, &b| {
                let (x, y) = (&scores[a], &scores[b]);
                y.score.cmp(&x.score).then(x.worst_defeat.cmp(&y.worst_defeat)).then(a.cmp(&b))
            })
            .ok_or(TabError::UnresolvedTie { stage: "condorcet completion" })?,
    };

    let margin = if matrix.len() == 1 {
        ballots.iter().filter(|b| !b.is_empty()).count() as i64
    } else {
        (0..matrix.len()).filter(|&j| j != pos).map(|j| matrix.margin(pos, j)).min().unwrap_or(0)
    };

    Ok(CondorcetOutcome {
        winner: matrix.candidates[pos],
        margin,
        condorcet_winner: condorcet.map(|p| matrix.candidates[p]),
        cycle: condorcet.is_none(),
        copeland: scores,
        matrix,
    })
}

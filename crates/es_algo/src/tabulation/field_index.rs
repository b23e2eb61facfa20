// crates/es_algo/src/tabulation/field_index.rs
//
// Dense position index over a candidate field plus ballot validation shared
// by every tabulator.

use std::collections::BTreeMap;

use es_core::{Ballot, CandidateId};

use crate::errors::TabError;

/// `CandidateId -> dense position`, in field order.
#[derive(Debug, Clone)]
pub struct FieldIndex {
    ids: Vec<CandidateId>,
    pos: BTreeMap<CandidateId, usize>,
}

impl FieldIndex {
    /// Rejects an empty field and duplicate ids.
    pub fn new(ids: &[CandidateId]) -> Result<Self, TabError> {
        if ids.is_empty() {
            return Err(TabError::NoCandidates);
        }
        let mut pos = BTreeMap::new();
        for (i, &id) in ids.iter().enumerate() {
            if pos.insert(id, i).is_some() {
                return Err(TabError::DuplicateCandidate(id));
            }
        }
        Ok(Self { ids: ids.to_vec(), pos })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    #[inline]
    pub fn ids(&self) -> &[CandidateId] {
        &self.ids
    }

    #[inline]
    pub fn id(&self, position: usize) -> CandidateId {
        self.ids[position]
    }

    #[inline]
    pub fn position(&self, id: CandidateId) -> Option<usize> {
        self.pos.get(&id).copied()
    }

    /// Every ranked id must be in the field and appear at most once. Ballots
    /// may be truncated. An empty collection is an error.
    pub fn validate_ballots(&self, ballots: &[Ballot]) -> Result<(), TabError> {
        if ballots.is_empty() {
            return Err(TabError::NoBallots);
        }
        let mut seen = vec![false; self.len()];
        for (b, ballot) in ballots.iter().enumerate() {
            seen.iter_mut().for_each(|s| *s = false);
            for &c in ballot.ranking() {
                let p = self
                    .position(c)
                    .ok_or(TabError::UnknownCandidate { ballot: b, candidate: c })?;
                if seen[p] {
                    return Err(TabError::DuplicateRanking { ballot: b, candidate: c });
                }
                seen[p] = true;
            }
        }
        Ok(())
    }

    /// Pair counts with ids in field order.
    pub fn with_ids(&self, counts: &[u64]) -> Vec<(CandidateId, u64)> {
        self.ids.iter().copied().zip(counts.iter().copied()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(xs: &[u16]) -> Vec<CandidateId> {
        xs.iter().map(|&x| CandidateId(x)).collect()
    }

    #[test]
    fn rejects_empty_and_duplicate_fields() {
        assert!(matches!(FieldIndex::new(&[]), Err(TabError::NoCandidates)));
        assert!(matches!(
            FieldIndex::new(&ids(&[0, 1, 0])),
            Err(TabError::DuplicateCandidate(CandidateId(0)))
        ));
    }

    #[test]
    fn validates_ballot_contents() {
        let f = FieldIndex::new(&ids(&[0, 1, 2])).unwrap();
        assert_eq!(f.validate_ballots(&[]), Err(TabError::NoBallots));
        assert!(f.validate_ballots(&[Ballot::new(ids(&[2])), Ballot::default()]).is_ok());
        assert_eq!(
            f.validate_ballots(&[Ballot::new(ids(&[0, 5]))]),
            Err(TabError::UnknownCandidate { ballot: 0, candidate: CandidateId(5) })
        );
        assert_eq!(
            f.validate_ballots(&[Ballot::new(ids(&[0])), Ballot::new(ids(&[1, 2, 1]))]),
            Err(TabError::DuplicateRanking { ballot: 1, candidate: CandidateId(1) })
        );
    }
}

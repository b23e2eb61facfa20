//! Determinism utilities: stable ordering and order-fixed reductions.
//!
//! Floating-point sums depend on order, so every reduction here consumes its
//! input in the order given; callers pass canonically sorted data.

use core::cmp::Ordering;

use crate::entities::DistrictVotingRecord;
use crate::ids::{CandidateId, DistrictId};

/* ---- Stable Ordering ---- */

/// A total, stable order for values that must sort canonically.
pub trait StableOrd {
    fn stable_cmp(&self, other: &Self) -> Ordering;
}

impl StableOrd for DistrictId {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl StableOrd for CandidateId {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl StableOrd for DistrictVotingRecord {
    #[inline]
    fn stable_cmp(&self, other: &Self) -> Ordering {
        self.district.stable_cmp(&other.district)
    }
}

/// Higher count first, then lower candidate id.
#[inline]
pub fn cmp_count_desc(a: &(CandidateId, u64), b: &(CandidateId, u64)) -> Ordering {
    b.1.cmp(&a.1).then_with(|| a.0.stable_cmp(&b.0))
}

/// Higher utility first; equal (or incomparable) utilities fall back to lower id.
#[inline]
pub fn cmp_utility_desc(a: (CandidateId, f64), b: (CandidateId, f64)) -> Ordering {
    b.1.partial_cmp(&a.1)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.0.stable_cmp(&b.0))
}

/* ---- Canonical sort helpers ---- */

/// Sort `(candidate, count)` pairs into standings order.
pub fn standings<I>(counts: I) -> Vec<(CandidateId, u64)>
where
    I: IntoIterator<Item = (CandidateId, u64)>,
{
    let mut v: Vec<(CandidateId, u64)> = counts.into_iter().collect();
    v.sort_by(cmp_count_desc);
    v
}

pub fn sort_records_by_district(records: &mut [DistrictVotingRecord]) {
    records.sort_by(|a, b| a.stable_cmp(b));
}

/* ---- Reductions ---- */

/// Arithmetic mean in input order; `None` for an empty input.
pub fn mean<I: IntoIterator<Item = f64>>(values: I) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0_f64, 0_u64), |(s, n), x| (s + x, n + 1));
    if n == 0 {
        None
    } else {
        Some(sum / n as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standings_break_ties_by_lower_id() {
        let s = standings([(CandidateId(2), 5), (CandidateId(0), 3), (CandidateId(1), 5)]);
        assert_eq!(s, vec![(CandidateId(1), 5), (CandidateId(2), 5), (CandidateId(0), 3)]);
    }

    #[test]
    fn utility_ties_fall_back_to_id() {
        let a = (CandidateId(3), -0.5);
        let b = (CandidateId(1), -0.5);
        assert_eq!(cmp_utility_desc(a, b), Ordering::Greater);
        assert_eq!(cmp_utility_desc((CandidateId(3), 0.0), (CandidateId(1), -0.0)), Ordering::Greater);
        assert_eq!(cmp_utility_desc((CandidateId(3), 1.0), b), Ordering::Less);
    }

    #[test]
    fn records_sort_by_district_token() {
        let mut rs = vec![
            DistrictVotingRecord::new("TX-02".parse().unwrap(), 0.0),
            DistrictVotingRecord::new("AK-01".parse().unwrap(), 0.0),
            DistrictVotingRecord::new("TX-01".parse().unwrap(), 0.0),
        ];
        sort_records_by_district(&mut rs);
        let ids: Vec<&str> = rs.iter().map(|r| r.district.as_str()).collect();
        assert_eq!(ids, vec!["AK-01", "TX-01", "TX-02"]);
    }

    #[test]
    fn mean_of_empty_is_none() {
        assert_eq!(mean(Vec::new()), None);
        assert_eq!(mean([1.0, 2.0, 3.0]), Some(2.0));
    }
}

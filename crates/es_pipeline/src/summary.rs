//! Per-method summary statistics over a batch.

use std::collections::BTreeMap;

use es_core::determinism::mean;
use es_core::{ElectionMethod, Party};
use serde::Serialize;

use crate::runner::ElectionResult;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodSummary {
    pub method: ElectionMethod,
    pub districts: usize,
    /// Seats per party; every party is listed, including those with none.
    pub party_wins: BTreeMap<Party, usize>,
    /// Seat share in percent.
    pub party_share: BTreeMap<Party, f64>,
    pub mean_voter_satisfaction: f64,
    pub mean_median_satisfaction: f64,
    pub mean_winner_ideology: f64,
    /// Mean expected lean of the districts each party won; parties without seats are omitted.
    pub mean_lean_by_party: BTreeMap<Party, f64>,
    /// Wins per candidate name (`D-1`, `R-2`, ...).
    pub wins_by_candidate: BTreeMap<String, usize>,
    pub condorcet_cycles: usize,
    pub mean_margin: f64,
}

/// Summarize the results recorded under `method`; other methods are ignored.
/// Means over an empty set are 0.
pub fn summarize(method: ElectionMethod, results: &[ElectionResult]) -> MethodSummary {
    let rows: Vec<&ElectionResult> = results.iter().filter(|r| r.method == method).collect();
    let n = rows.len();

    let mut party_wins: BTreeMap<Party, usize> = Party::ALL.iter().map(|&p| (p, 0)).collect();
    let mut wins_by_candidate: BTreeMap<String, usize> = BTreeMap::new();
    let mut leans: BTreeMap<Party, Vec<f64>> = BTreeMap::new();
    for r in &rows {
        *party_wins.entry(r.winner.party).or_insert(0) += 1;
        *wins_by_candidate.entry(r.winner.name.clone()).or_insert(0) += 1;
        leans.entry(r.winner.party).or_default().push(r.expected_lean);
    }

    let party_share = party_wins
        .iter()
        .map(|(&p, &w)| {
            let pct = if n == 0 { 0.0 } else { w as f64 * 100.0 / n as f64 };
            (p, pct)
        })
        .collect();
    let mean_lean_by_party = leans
        .into_iter()
        .filter_map(|(p, xs)| mean(xs).map(|m| (p, m)))
        .collect();

    MethodSummary {
        method,
        districts: n,
        party_wins,
        party_share,
        mean_voter_satisfaction: mean(rows.iter().map(|r| r.voter_satisfaction)).unwrap_or(0.0),
        mean_median_satisfaction: mean(rows.iter().map(|r| r.median_satisfaction)).unwrap_or(0.0),
        mean_winner_ideology: mean(rows.iter().map(|r| r.winner.ideology)).unwrap_or(0.0),
        mean_lean_by_party,
        wins_by_candidate,
        condorcet_cycles: rows.iter().filter(|r| r.trace.is_cycle()).count(),
        mean_margin: mean(rows.iter().map(|r| r.margin as f64)).unwrap_or(0.0),
    }
}

/// One summary per method, in `methods` order.
pub fn summarize_all(methods: &[ElectionMethod], results: &[ElectionResult]) -> Vec<MethodSummary> {
    methods.iter().map(|&m| summarize(m, results)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::WinnerInfo;
    use core::str::FromStr;
    use es_algo::TabulationTrace;
    use es_core::{CandidateId, DistrictId};

    fn result(district: &str, method: ElectionMethod, party: Party, name: &str, lean: f64, margin: i64) -> ElectionResult {
        ElectionResult {
            district: DistrictId::from_str(district).unwrap(),
            state: district[..2].to_string(),
            incumbent: String::new(),
            incumbent_party: None,
            expected_lean: lean,
            method,
            winner: WinnerInfo { id: CandidateId(0), name: name.to_string(), party, ideology: lean / 10.0, quality: 0.0 },
            margin,
            total_votes: 100,
            voter_satisfaction: 0.5,
            median_satisfaction: 1.0,
            field: Vec::new(),
            trace: TabulationTrace::InstantRunoff { rounds: Vec::new() },
        }
    }

    #[test]
    fn counts_shares_and_means() {
        let m = ElectionMethod::InstantRunoff;
        let rows = vec![
            result("CA-01", m, Party::Republican, "R-1", 10.0, 20),
            result("CA-02", m, Party::Democratic, "D-1", -20.0, 40),
            result("CA-03", m, Party::Democratic, "D-2", -10.0, 0),
            result("CA-04", m, Party::Democratic, "D-1", 2.0, 4),
            result("CA-01", ElectionMethod::TopTwo, Party::Republican, "R-1", 10.0, 99),
        ];
        let s = summarize(m, &rows);
        assert_eq!(s.districts, 4);
        assert_eq!(s.party_wins[&Party::Democratic], 3);
        assert_eq!(s.party_wins[&Party::Republican], 1);
        assert_eq!(s.party_wins[&Party::Independent], 0);
        assert_eq!(s.party_share[&Party::Democratic], 75.0);
        assert_eq!(s.mean_lean_by_party[&Party::Democratic], -28.0 / 3.0);
        assert!(!s.mean_lean_by_party.contains_key(&Party::Independent));
        assert_eq!(s.wins_by_candidate["D-1"], 2);
        assert_eq!(s.mean_margin, 16.0);
        assert_eq!(s.mean_voter_satisfaction, 0.5);
        assert_eq!(s.condorcet_cycles, 0);
    }

    #[test]
    fn empty_method_summarizes_to_zeroes() {
        let s = summarize(ElectionMethod::Condorcet, &[]);
        assert_eq!(s.districts, 0);
        assert_eq!(s.party_share[&Party::Republican], 0.0);
        assert_eq!(s.mean_margin, 0.0);
        assert!(s.wins_by_candidate.is_empty());
    }
}

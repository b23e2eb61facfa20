//! Cross-method outcome quality metrics.

use es_core::determinism::mean;
use es_core::{Candidate, CandidateId, SimulationConfig, Voter};

use crate::ballot::base_utility;

/// Mean over voters of the winner's noiseless utility, rescaled per voter so
/// that their least-liked candidate is 0 and their favourite is 1. A voter who
/// is indifferent across the field scores 1. Returns 0 with no voters.
pub fn voter_satisfaction(
    voters: &[Voter],
    field: &[Candidate],
    winner: CandidateId,
    config: &SimulationConfig,
) -> f64 {
    let Some(w) = field.iter().find(|c| c.id == winner) else {
        return 0.0;
    };
    mean(voters.iter().map(|v| {
        let (lo, hi) = field.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), c| {
            let u = base_utility(v, c, config);
            (lo.min(u), hi.max(u))
        });
        if hi - lo <= 0.0 {
            1.0
        } else {
            (base_utility(v, w, config) - lo) / (hi - lo)
        }
    }))
    .unwrap_or(0.0)
}

/// How central the winner sits in the electorate: 1 at the median voter,
/// 0 at either extreme. `1 - |2 * left / n - 1|`, where `left` counts voters
/// strictly left of the winner.
pub fn median_satisfaction(voters: &[Voter], winner_ideology: f64) -> f64 {
    if voters.is_empty() {
        return 0.0;
    }
    let left = voters.iter().filter(|v| v.ideology < winner_ideology).count();
    1.0 - (2.0 * left as f64 / voters.len() as f64 - 1.0).abs()
}

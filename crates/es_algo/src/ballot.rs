// crates/es_algo/src/ballot.rs
//
// Voter utility model and ballot construction.
//
// utility(v, c) = -|v - c|                                  absolute distance
//               + quality_scale * c.quality
//               + [same party] * party_loyalty * party_bonus_scale * bonus(v.party)
//               - wasted_vote_factor * (1 - viability(c))   only when the factor is non-zero
//               + z * v.uncertainty                         z ~ N(0,1), one per candidate

use std::collections::BTreeMap;

use es_core::determinism::cmp_utility_desc;
use es_core::rng::GaussianSampler;
use es_core::{Ballot, Candidate, CandidateId, SimulationConfig, Voter};

use crate::population::default_party_bonus;

/// Same-party bonus for `voter` toward `candidate`.
#[inline]
pub fn party_term(voter: &Voter, candidate: &Candidate, config: &SimulationConfig) -> f64 {
    if voter.party == candidate.party {
        config.party_loyalty * config.party_bonus_scale * default_party_bonus(voter.party)
    } else {
        0.0
    }
}

/// Noiseless, non-strategic utility: distance, quality and party terms only.
#[inline]
pub fn base_utility(voter: &Voter, candidate: &Candidate, config: &SimulationConfig) -> f64 {
    -(voter.ideology - candidate.ideology).abs()
        + config.quality_scale * candidate.quality
        + party_term(voter, candidate, config)
}

/// Full utility for one (voter, candidate) pair given its noise draw.
pub fn utility(
    voter: &Voter,
    candidate: &Candidate,
    config: &SimulationConfig,
    viability: Option<&Viability>,
    noise: f64,
) -> f64 {
    let mut u = base_utility(voter, candidate, config);
    if config.wasted_vote_factor != 0.0 {
        if let Some(v) = viability {
            u -= config.wasted_vote_factor * (1.0 - v.of(candidate.id));
        }
    }
    u + noise * voter.uncertainty
}

/// One standard normal per candidate, in field order.
pub fn draw_noise(candidates: usize, rng: &mut GaussianSampler) -> Vec<f64> {
    (0..candidates).map(|_| rng.standard_normal()).collect()
}

/// Rank `candidates` for `voter` with pre-drawn noise, `noise[i]` belonging
/// to `candidates[i]`. Equal utilities fall back to ascending `CandidateId`.
pub fn rank_with_noise(
    voter: &Voter,
    candidates: &[Candidate],
    config: &SimulationConfig,
    viability: Option<&Viability>,
    noise: &[f64],
) -> Ballot {
    debug_assert_eq!(candidates.len(), noise.len());
    let mut scored: Vec<(CandidateId, f64)> = candidates
        .iter()
        .zip(noise)
        .map(|(c, &z)| (c.id, utility(voter, c, config, viability, z)))
        .collect();
    scored.sort_by(|a, b| cmp_utility_desc(*a, *b));
    Ballot::new(scored.into_iter().map(|(id, _)| id).collect())
}

/// Rank `candidates` for `voter`. Draws exactly one standard normal per
/// candidate, in field order, so stream consumption depends only on the
/// field size.
pub fn generate_ballot(
    voter: &Voter,
    candidates: &[Candidate],
    config: &SimulationConfig,
    viability: Option<&Viability>,
    rng: &mut GaussianSampler,
) -> Ballot {
    let noise = draw_noise(candidates.len(), rng);
    rank_with_noise(voter, candidates, config, viability, &noise)
}

/// Favourite by noiseless utility, ties to the lower id. `None` for an empty field.
pub fn sincere_favorite(voter: &Voter, candidates: &[Candidate], config: &SimulationConfig) -> Option<CandidateId> {
    candidates
        .iter()
        .map(|c| (c.id, base_utility(voter, c, config)))
        .min_by(|a, b| cmp_utility_desc(*a, *b))
        .map(|(id, _)| id)
}

/// Perceived chance of winning, as first-choice share relative to the leader
/// (leader = 1). Estimated once per field from noiseless sincere preferences.
#[derive(Debug, Clone, PartialEq)]
pub struct Viability {
    relative: BTreeMap<CandidateId, f64>,
}

impl Viability {
    pub fn estimate(voters: &[Voter], candidates: &[Candidate], config: &SimulationConfig) -> Self {
        let mut counts: BTreeMap<CandidateId, u64> = candidates.iter().map(|c| (c.id, 0)).collect();
        for v in voters {
            if let Some(fav) = sincere_favorite(v, candidates, config) {
                *counts.entry(fav).or_insert(0) += 1;
            }
        }
        let leader = counts.values().copied().max().unwrap_or(0);
        let relative = counts
            .into_iter()
            .map(|(id, n)| {
                let r = if leader == 0 { 1.0 } else { n as f64 / leader as f64 };
                (id, r)
            })
            .collect();
        Self { relative }
    }

    /// Relative share for `id`; unknown candidates are treated as fully viable.
    pub fn of(&self, id: CandidateId) -> f64 {
        self.relative.get(&id).copied().unwrap_or(1.0)
    }
}

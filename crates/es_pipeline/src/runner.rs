//! One district, end to end: electorate, field, ballots, tabulation,
//! satisfaction. Every random draw comes from a per-purpose stream keyed on
//! (seed, district), so the methods of one district share an electorate and a
//! district's result does not depend on which worker ran it.

use std::collections::BTreeMap;

use es_algo::{
    draw_noise, generate_candidates, median_satisfaction, primary_voter, rank_with_noise, tabulate,
    voter_satisfaction, CombinedPopulation, ElectionInput, TabulationTrace, Viability,
};
use es_core::rng::{GaussianSampler, StreamPurpose};
use es_core::{
    Ballot, Candidate, CandidateId, DistrictId, DistrictVotingRecord, ElectionMethod, Party, SimulationConfig, Voter,
};
use serde::Serialize;
use tracing::debug;

use crate::DistrictError;

/// The elected candidate, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WinnerInfo {
    pub id: CandidateId,
    pub name: String,
    pub party: Party,
    pub ideology: f64,
    pub quality: f64,
}

/// Outcome of one (district, method) simulation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElectionResult {
    pub district: DistrictId,
    pub state: String,
    pub incumbent: String,
    pub incumbent_party: Option<Party>,
    pub expected_lean: f64,
    pub method: ElectionMethod,
    pub winner: WinnerInfo,
    pub margin: i64,
    pub total_votes: u64,
    pub voter_satisfaction: f64,
    pub median_satisfaction: f64,
    pub field: Vec<Candidate>,
    pub trace: TabulationTrace,
}

/// Everything about a district that does not depend on the election method.
#[derive(Debug, Clone)]
pub struct DistrictElectorate {
    pub record: DistrictVotingRecord,
    pub voters: Vec<Voter>,
    pub field: Vec<Candidate>,
    pub ballots: Vec<Ballot>,
    /// Closed-primary ballots per major party; built when a requested method needs them.
    pub primaries: Option<BTreeMap<Party, Vec<Ballot>>>,
    /// Per-voter utility noise, one draw per field candidate in field order.
    noise: Vec<Vec<f64>>,
    viability: Option<Viability>,
}

impl DistrictElectorate {
    /// Sample voters, draw the field and cast general ballots. Primary ballots
    /// are cast too when any of `methods` holds primaries.
    pub fn build(
        record: &DistrictVotingRecord,
        config: &SimulationConfig,
        methods: &[ElectionMethod],
    ) -> Result<Self, DistrictError> {
        let district = &record.district;
        let population = CombinedPopulation::from_lean(record.lean, &config.population);

        let sampler = GaussianSampler::for_stream(config.seed, district, StreamPurpose::Population);
        let voters: Vec<Voter> = population
            .sample_population(config.n_voters as usize, sampler, config.uncertainty)
            .collect();

        let field = generate_candidates(config.candidate_strategy, record, config, &population)
            .map_err(|source| DistrictError::Generate { district: district.clone(), source })?;

        let mut rng = GaussianSampler::for_stream(config.seed, district, StreamPurpose::BallotNoise);
        let noise: Vec<Vec<f64>> = voters.iter().map(|_| draw_noise(field.len(), &mut rng)).collect();
        let viability = (config.wasted_vote_factor != 0.0).then(|| Viability::estimate(&voters, &field, config));
        let ballots = voters
            .iter()
            .zip(&noise)
            .map(|(v, z)| rank_with_noise(v, &field, config, viability.as_ref(), z))
            .collect();

        let mut electorate =
            Self { record: record.clone(), voters, field, ballots, primaries: None, noise, viability };
        if methods.iter().any(|m| m.needs_primary_ballots()) {
            electorate.primaries = Some(electorate.primary_ballots(config));
        }
        Ok(electorate)
    }

    /// Closed primaries: each major party's members, shifted by `primary_skew`,
    /// rank that party's primary-eligible candidates. A member reuses the noise
    /// behind their general ballot, so with no skew their primary ballot is the
    /// general ballot restricted to the slate.
    pub fn primary_ballots(&self, config: &SimulationConfig) -> BTreeMap<Party, Vec<Ballot>> {
        let mut out = BTreeMap::new();
        for party in Party::MAJOR {
            let seats: Vec<usize> = self
                .field
                .iter()
                .enumerate()
                .filter(|(_, c)| c.primary_eligible && c.party == party)
                .map(|(i, _)| i)
                .collect();
            if seats.is_empty() {
                continue;
            }
            let slate: Vec<Candidate> = seats.iter().map(|&i| self.field[i].clone()).collect();
            let ballots = self
                .voters
                .iter()
                .zip(&self.noise)
                .filter(|(v, _)| v.party == party)
                .filter_map(|(v, z)| {
                    let member = primary_voter(v, config.primary_skew)?;
                    let z: Vec<f64> = seats.iter().map(|&i| z[i]).collect();
                    Some(rank_with_noise(&member, &slate, config, self.viability.as_ref(), &z))
                })
                .collect();
            out.insert(party, ballots);
        }
        out
    }

    /// Tabulate under `method` and score the winner.
    pub fn run(&self, config: &SimulationConfig, method: ElectionMethod) -> Result<ElectionResult, DistrictError> {
        let district = &self.record.district;

        let built;
        let primaries = match (&self.primaries, method.needs_primary_ballots()) {
            (Some(p), _) => Some(p),
            (None, true) => {
                built = self.primary_ballots(config);
                Some(&built)
            }
            (None, false) => None,
        };
        let mut input = ElectionInput::new(&self.field, &self.ballots);
        if let Some(p) = primaries {
            input = input.with_primaries(p);
        }

        let tab = tabulate(method, &input).map_err(|source| DistrictError::Tabulate {
            district: district.clone(),
            method,
            source,
        })?;
        let winner = self.field.iter().find(|c| c.id == tab.winner).ok_or_else(|| DistrictError::MissingWinner {
            district: district.clone(),
            method,
            winner: tab.winner,
        })?;

        let result = ElectionResult {
            district: district.clone(),
            state: self.record.state.clone(),
            incumbent: self.record.incumbent.clone(),
            incumbent_party: self.record.incumbent_party,
            expected_lean: self.record.lean,
            method,
            winner: WinnerInfo {
                id: winner.id,
                name: winner.name.clone(),
                party: winner.party,
                ideology: winner.ideology,
                quality: winner.quality,
            },
            margin: tab.margin,
            total_votes: tab.total_votes,
            voter_satisfaction: voter_satisfaction(&self.voters, &self.field, winner.id, config),
            median_satisfaction: median_satisfaction(&self.voters, winner.ideology),
            field: self.field.clone(),
            trace: tab.trace,
        };
        debug!(
            district = %district,
            %method,
            winner = %result.winner.name,
            party = %result.winner.party,
            margin = result.margin,
            "district complete"
        );
        Ok(result)
    }
}

/// Simulate one district under one method.
pub fn simulate_district(
    record: &DistrictVotingRecord,
    config: &SimulationConfig,
    method: ElectionMethod,
) -> Result<ElectionResult, DistrictError> {
    DistrictElectorate::build(record, config, &[method])?.run(config, method)
}

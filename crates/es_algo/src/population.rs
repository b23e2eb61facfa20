// crates/es_algo/src/population.rs
//
// District electorate as a weighted mixture of party-tagged normal groups.
// A voter's party is the group it was drawn from, so party and ideology are
// correlated the way they are in real electorates.

use es_core::config::PopulationParams;
use es_core::rng::GaussianSampler;
use es_core::{Party, Voter};
use serde::Serialize;

use crate::errors::GenerateError;

/// Same-party bonus magnitude carried by each group.
pub const fn default_party_bonus(party: Party) -> f64 {
    match party {
        Party::Democratic | Party::Republican => 1.0,
        Party::Independent => 0.5,
    }
}

/// One normal sub-population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationGroup {
    pub party: Party,
    pub mean: f64,
    pub stddev: f64,
    /// Relative weight; normalized to sum to 1 inside a `CombinedPopulation`.
    pub weight: f64,
    pub party_bonus: f64,
}

impl PopulationGroup {
    pub fn new(party: Party, mean: f64, stddev: f64, weight: f64) -> Self {
        Self { party, mean, stddev, weight, party_bonus: default_party_bonus(party) }
    }
}

/// Weighted mixture of groups. Weights always sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedPopulation {
    groups: Vec<PopulationGroup>,
}

impl CombinedPopulation {
    /// Normalize weights on construction. Rejects an empty mixture and any
    /// negative, non-finite, or all-zero weights.
    pub fn new(mut groups: Vec<PopulationGroup>) -> Result<Self, GenerateError> {
        if groups.is_empty() {
            return Err(GenerateError::EmptyPopulation);
        }
        for g in &groups {
            if !g.weight.is_finite() || g.weight < 0.0 {
                return Err(GenerateError::InvalidWeight { party: g.party, weight: g.weight });
            }
        }
        let total: f64 = groups.iter().map(|g| g.weight).sum();
        if total <= 0.0 {
            return Err(GenerateError::EmptyPopulation);
        }
        for g in &mut groups {
            g.weight /= total;
        }
        Ok(Self { groups })
    }

    /// Three-group electorate (Dem, Rep, Ind) for a signed lean, positive = Republican.
    pub fn from_lean(lean: f64, params: &PopulationParams) -> Self {
        let r_pct = 0.5 + lean / 200.0;
        let d_pct = 0.5 - lean / 200.0;

        let i_weight = 0.20;
        let r_weight = f64::max(0.05, 0.8 * r_pct);
        let d_weight = f64::max(0.05, 0.8 * d_pct);

        let skew = (r_weight - d_weight) / 2.0 * params.partisan_shift * 100.0;

        let groups = vec![
            PopulationGroup::new(Party::Democratic, -params.partisanship + skew, params.stddev, d_weight),
            PopulationGroup::new(Party::Republican, params.partisanship + skew, params.stddev, r_weight),
            PopulationGroup::new(Party::Independent, skew, params.stddev, i_weight),
        ];
        let total = d_weight + r_weight + i_weight;
        Self {
            groups: groups
                .into_iter()
                .map(|g| PopulationGroup { weight: g.weight / total, ..g })
                .collect(),
        }
    }

    pub fn groups(&self) -> &[PopulationGroup] {
        &self.groups
    }

    pub fn group(&self, party: Party) -> Option<&PopulationGroup> {
        self.groups.iter().find(|g| g.party == party)
    }

    /// Democrats if their group outweighs the Republicans', otherwise Republicans.
    pub fn dominant_party(&self) -> Party {
        let weight = |p| self.group(p).map_or(0.0, |g| g.weight);
        if weight(Party::Democratic) > weight(Party::Republican) {
            Party::Democratic
        } else {
            Party::Republican
        }
    }

    /// Pick a group by weight with one uniform draw.
    pub fn sample_group(&self, rng: &mut GaussianSampler) -> &PopulationGroup {
        let u = rng.uniform();
        let mut acc = 0.0;
        for g in &self.groups {
            acc += g.weight;
            if u < acc {
                return g;
            }
        }
        // rounding left the cumulative sum just under 1
        &self.groups[self.groups.len() - 1]
    }

    pub fn sample_ideology(&self, rng: &mut GaussianSampler) -> f64 {
        let g = self.sample_group(rng);
        rng.normal(g.mean, g.stddev)
    }

    pub fn sample_voter(&self, rng: &mut GaussianSampler, uncertainty: f64) -> Voter {
        let g = self.sample_group(rng);
        let (party, mean, stddev) = (g.party, g.mean, g.stddev);
        Voter { ideology: rng.normal(mean, stddev), party, uncertainty }
    }

    /// Lazy, finite, restartable sequence of `n` voters drawn from `rng`.
    pub fn sample_population(&self, n: usize, rng: GaussianSampler, uncertainty: f64) -> PopulationSample<'_> {
        PopulationSample {
            population: self,
            start: rng.clone(),
            rng,
            uncertainty,
            n,
            emitted: 0,
        }
    }

    /// Median ideology of a `samples`-voter draw.
    pub fn median_ideology(&self, samples: usize, rng: &mut GaussianSampler) -> f64 {
        let n = samples.max(1);
        let mut xs: Vec<f64> = (0..n).map(|_| self.sample_ideology(rng)).collect();
        sample_median(&mut xs)
    }
}

/// Median of a non-empty sample; even counts average the two middle values.
fn sample_median(xs: &mut [f64]) -> f64 {
    xs.sort_by(f64::total_cmp);
    let mid = xs.len() / 2;
    if xs.len() % 2 == 0 {
        (xs[mid - 1] + xs[mid]) / 2.0
    } else {
        xs[mid]
    }
}

/// Iterator returned by [`CombinedPopulation::sample_population`].
#[derive(Debug, Clone)]
pub struct PopulationSample<'a> {
    population: &'a CombinedPopulation,
    start: GaussianSampler,
    rng: GaussianSampler,
    uncertainty: f64,
    n: usize,
    emitted: usize,
}

impl PopulationSample<'_> {
    /// Rewind to the first voter; the replay is identical.
    pub fn restart(&mut self) {
        self.rng = self.start.clone();
        self.emitted = 0;
    }
}

impl Iterator for PopulationSample<'_> {
    type Item = Voter;

    fn next(&mut self) -> Option<Voter> {
        if self.emitted >= self.n {
            return None;
        }
        self.emitted += 1;
        Some(self.population.sample_voter(&mut self.rng, self.uncertainty))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.n - self.emitted;
        (left, Some(left))
    }
}

impl ExactSizeIterator for PopulationSample<'_> {}

/// The voter as seen by its party's closed primary: shifted toward the party
/// extreme by `primary_skew`. Independents do not vote in primaries.
pub fn primary_voter(voter: &Voter, primary_skew: f64) -> Option<Voter> {
    if !voter.party.is_major() {
        return None;
    }
    Some(Voter {
        ideology: voter.ideology + voter.party.extreme_direction() * primary_skew,
        ..*voter
    })
}

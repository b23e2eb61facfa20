// crates/es_algo/src/candidates.rs
//
// Candidate field generation. The strategy set is closed, so dispatch is a
// match on `CandidateStrategy`. Field order is Democrats, centrist entrants,
// Republicans; the position in that order becomes the `CandidateId`.

use es_core::rng::{GaussianSampler, StreamPurpose};
use es_core::{Candidate, CandidateId, CandidateStrategy, DistrictVotingRecord, Party, SimulationConfig};

use crate::errors::GenerateError;
use crate::population::{CombinedPopulation, PopulationGroup};

struct Draft {
    name: String,
    party: Party,
    ideology: f64,
    quality: f64,
}

/// Build the candidate field for one district.
///
/// Draws come from the district's `Candidates` stream; the centrist entrant's
/// median estimate uses the separate `MedianProbe` stream.
pub fn generate(
    strategy: CandidateStrategy,
    record: &DistrictVotingRecord,
    config: &SimulationConfig,
    population: &CombinedPopulation,
) -> Result<Vec<Candidate>, GenerateError> {
    let mut rng = GaussianSampler::for_stream(config.seed, &record.district, StreamPurpose::Candidates);
    let k = usize::from(config.candidates_per_party);

    let dem = group(population, Party::Democratic)?;
    let rep = group(population, Party::Republican)?;

    let drafts = match strategy {
        CandidateStrategy::NormalPartisan => {
            let mut v = normal_party(dem, dem.mean, k, config, &mut rng);
            v.extend(normal_party(rep, rep.mean, k, config, &mut rng));
            v
        }
        CandidateStrategy::PrimarySkewed => {
            let mut v = normal_party(dem, primary_center(dem, config), k, config, &mut rng);
            v.extend(normal_party(rep, primary_center(rep, config), k, config, &mut rng));
            v
        }
        CandidateStrategy::CondorcetSeeded => {
            let mut v = normal_party(dem, dem.mean, k, config, &mut rng);
            let n = usize::from(config.n_condorcet);
            v.extend(centrists(record, config, population, n, &mut rng));
            v.extend(normal_party(rep, rep.mean, k, config, &mut rng));
            v
        }
        CandidateStrategy::Partisan => {
            let mut dems = spread_party(dem, k, config, &mut rng);
            let mut reps = spread_party(rep, k, config, &mut rng);
            let median = centrists(record, config, population, 1, &mut rng);
            // the median entrant takes the first slot of its own party
            match median.first().map(|m| m.party) {
                Some(Party::Democratic) if !dems.is_empty() => {
                    dems.remove(0);
                }
                Some(Party::Republican) if !reps.is_empty() => {
                    reps.remove(0);
                }
                _ => {}
            }
            let mut v = dems;
            v.extend(median);
            v.extend(reps);
            v
        }
    };

    finish(drafts)
}

fn group(population: &CombinedPopulation, party: Party) -> Result<&PopulationGroup, GenerateError> {
    population.group(party).ok_or(GenerateError::MissingGroup(party))
}

/// Party mean pushed toward its primary electorate.
fn primary_center(g: &PopulationGroup, config: &SimulationConfig) -> f64 {
    g.mean + g.party.extreme_direction() * config.primary_skew
}

fn normal_party(
    g: &PopulationGroup,
    center: f64,
    k: usize,
    config: &SimulationConfig,
    rng: &mut GaussianSampler,
) -> Vec<Draft> {
    (0..k)
        .map(|i| {
            let ideology = center + rng.standard_normal() * config.ideology_variance;
            let quality = rng.standard_normal() * config.quality_variance;
            Draft { name: format!("{}-{}", g.party.initial(), i + 1), party: g.party, ideology, quality }
        })
        .collect()
}

/// Evenly stepped positions across `base ± spread * stddev`.
fn spread_positions(base: f64, offset: f64, k: usize) -> Vec<f64> {
    match k {
        0 => Vec::new(),
        1 => vec![base],
        2 => vec![base - offset, base + offset],
        _ => {
            let step = 2.0 * offset / (k - 1) as f64;
            (0..k).map(|i| base - offset + i as f64 * step).collect()
        }
    }
}

fn spread_party(g: &PopulationGroup, k: usize, config: &SimulationConfig, rng: &mut GaussianSampler) -> Vec<Draft> {
    let direction = g.party.extreme_direction();
    let base = primary_center(g, config);
    let offset = config.spread * g.stddev * direction;
    spread_positions(base, offset, k)
        .into_iter()
        .enumerate()
        .map(|(i, x)| {
            let ideology = x + rng.standard_normal() * config.ideology_variance;
            let quality = rng.standard_normal() * config.quality_variance;
            Draft { name: format!("{}-{}", g.party.initial(), i + 1), party: g.party, ideology, quality }
        })
        .collect()
}

/// Entrants placed at the median voter, which is the pairwise-optimal
/// position on a single axis. They carry the dominant party's tag.
fn centrists(
    record: &DistrictVotingRecord,
    config: &SimulationConfig,
    population: &CombinedPopulation,
    n: usize,
    rng: &mut GaussianSampler,
) -> Vec<Draft> {
    if n == 0 {
        return Vec::new();
    }
    let mut probe = GaussianSampler::for_stream(config.seed, &record.district, StreamPurpose::MedianProbe);
    let median = population.median_ideology(config.n_voters as usize, &mut probe);
    let party = population.dominant_party();

    (0..n)
        .map(|j| {
            let ideology = median + rng.standard_normal() * config.condorcet_variance;
            let quality = rng.standard_normal() * config.quality_variance;
            let name = if n == 1 {
                format!("{}-V", party.initial())
            } else {
                format!("{}-V{}", party.initial(), j + 1)
            };
            Draft { name, party, ideology, quality }
        })
        .collect()
}

fn finish(drafts: Vec<Draft>) -> Result<Vec<Candidate>, GenerateError> {
    for party in Party::MAJOR {
        if !drafts.iter().any(|d| d.party == party) {
            return Err(GenerateError::EmptyParty(party));
        }
    }
    let n = drafts.len();
    drafts
        .into_iter()
        .enumerate()
        .map(|(i, d)| {
            let id = u16::try_from(i).map_err(|_| GenerateError::FieldTooLarge(n))?;
            Ok(Candidate::new(CandidateId(id), d.name, d.party, d.ideology, d.quality))
        })
        .collect()
}

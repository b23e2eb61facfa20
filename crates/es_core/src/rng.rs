// crates/es_core/src/rng.rs
//
// Seeded Gaussian streams. Every stochastic component owns its own sampler,
// derived from (master seed, district id, purpose salt), so parallel districts
// and unrelated draw sites never share or reorder a stream.
//
// Seeding is explicit and platform-stable: FNV-1a over the district id bytes
// plus splitmix64 expansion into the 32-byte ChaCha20 seed. The process-local
// `std` hasher is never used.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;
use rand_distr::{Distribution, Standard, StandardNormal};

use crate::ids::DistrictId;

/// Logical stream a sampler is dedicated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StreamPurpose {
    /// Voter ideology and group membership.
    Population,
    /// Candidate ideology and quality.
    Candidates,
    /// Sample used to locate the median voter for centrist entrants.
    MedianProbe,
    /// Per-(voter, candidate) utility noise, shared by general and primary ballots.
    BallotNoise,
}

impl StreamPurpose {
    pub const ALL: [StreamPurpose; 4] = [
        StreamPurpose::Population,
        StreamPurpose::Candidates,
        StreamPurpose::MedianProbe,
        StreamPurpose::BallotNoise,
    ];

    /// Fixed salt mixed into the stream seed. Never renumber these.
    #[inline]
    pub const fn salt(self) -> u64 {
        match self {
            StreamPurpose::Population => 0x706f_7075_6c61_7469,
            StreamPurpose::Candidates => 0x6361_6e64_6964_6174,
            StreamPurpose::MedianProbe => 0x6d65_6469_616e_7072,
            StreamPurpose::BallotNoise => 0x6261_6c6c_6f74_6e6f,
        }
    }
}

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET, |h, &b| (h ^ u64::from(b)).wrapping_mul(FNV_PRIME))
}

fn splitmix64(state: &mut u64) -> u64 {
    *state = state.wrapping_add(0x9e37_79b9_7f4a_7c15);
    let mut z = *state;
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

/// Derive the 32-byte ChaCha20 seed for one (master, district, purpose) stream.
pub fn derive_stream_seed(master_seed: u64, district: &DistrictId, purpose: StreamPurpose) -> [u8; 32] {
    let mut state = master_seed;
    let mut state = splitmix64(&mut state) ^ fnv1a64(district.as_bytes());
    let mut state = splitmix64(&mut state) ^ purpose.salt();

    let mut seed32 = [0u8; 32];
    for chunk in seed32.chunks_exact_mut(8) {
        chunk.copy_from_slice(&splitmix64(&mut state).to_le_bytes());
    }
    seed32
}

/// Deterministic normal-variate generator over ChaCha20.
#[derive(Debug, Clone)]
pub struct GaussianSampler {
    rng: ChaCha20Rng,
    draws: u64,
}

impl GaussianSampler {
    /// `seed.to_le_bytes()` into the first 8 bytes of the ChaCha20 seed; the rest 0.
    #[inline]
    pub fn from_seed_u64(seed: u64) -> Self {
        let mut seed32 = [0u8; 32];
        seed32[..8].copy_from_slice(&seed.to_le_bytes());
        Self { rng: ChaCha20Rng::from_seed(seed32), draws: 0 }
    }

    /// Independent stream for one district and purpose.
    #[inline]
    pub fn for_stream(master_seed: u64, district: &DistrictId, purpose: StreamPurpose) -> Self {
        let seed32 = derive_stream_seed(master_seed, district, purpose);
        Self { rng: ChaCha20Rng::from_seed(seed32), draws: 0 }
    }

    /// Number of variates drawn so far (normal and uniform alike).
    #[inline]
    pub fn draws(&self) -> u64 {
        self.draws
    }

    #[inline]
    pub fn standard_normal(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        StandardNormal.sample(&mut self.rng)
    }

    /// `mean + stddev * z`.
    #[inline]
    pub fn normal(&mut self, mean: f64, stddev: f64) -> f64 {
        mean + stddev * self.standard_normal()
    }

    /// Uniform in `[0, 1)`.
    #[inline]
    pub fn uniform(&mut self) -> f64 {
        self.draws = self.draws.saturating_add(1);
        Standard.sample(&mut self.rng)
    }

    #[inline]
    pub fn coin_flip(&mut self) -> bool {
        self.uniform() < 0.5
    }

    /// Infinite lazy sequence of standard-normal variates drawn from this stream.
    pub fn iter(&mut self) -> NormalIter<'_> {
        NormalIter { sampler: self }
    }
}

/// Borrowing iterator returned by [`GaussianSampler::iter`]. Never ends.
pub struct NormalIter<'a> {
    sampler: &'a mut GaussianSampler,
}

impl Iterator for NormalIter<'_> {
    type Item = f64;

    #[inline]
    fn next(&mut self) -> Option<f64> {
        Some(self.sampler.standard_normal())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    fn district(s: &str) -> DistrictId {
        DistrictId::from_str(s).unwrap()
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = GaussianSampler::from_seed_u64(123_456_789);
        let mut b = GaussianSampler::from_seed_u64(123_456_789);
        let xs: Vec<f64> = a.iter().take(32).collect();
        let ys: Vec<f64> = b.iter().take(32).collect();
        assert_eq!(xs, ys);
        assert_eq!(a.draws(), 32);
    }

    #[test]
    fn streams_do_not_depend_on_sibling_call_order() {
        let d = district("CA-15");
        let mut pop = GaussianSampler::for_stream(7, &d, StreamPurpose::Population);
        let first: Vec<f64> = pop.iter().take(8).collect();

        // Drain a sibling stream heavily, then rebuild the population stream.
        let mut noise = GaussianSampler::for_stream(7, &d, StreamPurpose::BallotNoise);
        for _ in 0..1000 {
            noise.standard_normal();
        }
        let mut pop_again = GaussianSampler::for_stream(7, &d, StreamPurpose::Population);
        let second: Vec<f64> = pop_again.iter().take(8).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn purposes_and_districts_get_distinct_seeds() {
        let d = district("TX-07");
        let mut seeds: Vec<[u8; 32]> = StreamPurpose::ALL
            .iter()
            .map(|&p| derive_stream_seed(42, &d, p))
            .collect();
        seeds.push(derive_stream_seed(42, &district("TX-08"), StreamPurpose::Population));
        seeds.push(derive_stream_seed(43, &d, StreamPurpose::Population));
        let n = seeds.len();
        seeds.sort();
        seeds.dedup();
        assert_eq!(seeds.len(), n);
    }

    #[test]
    fn normal_scales_and_shifts() {
        let mut s = GaussianSampler::from_seed_u64(99);
        let n = 20_000;
        let xs: Vec<f64> = (0..n).map(|_| s.normal(3.0, 0.5)).collect();
        let mean = xs.iter().sum::<f64>() / n as f64;
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 3.0).abs() < 0.02, "mean {mean}");
        assert!((var.sqrt() - 0.5).abs() < 0.02, "sd {}", var.sqrt());
    }

    #[test]
    fn uniform_stays_in_unit_interval() {
        let mut s = GaussianSampler::from_seed_u64(5);
        for _ in 0..1000 {
            let u = s.uniform();
            assert!((0.0..1.0).contains(&u));
        }
    }
}

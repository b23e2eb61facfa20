//! Domain entities: party tags, candidates, voters, ballots, district records.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::ids::{CandidateId, DistrictId};

/* ---------------------------------- Party --------------------------------- */

/// Party identification shared by voters (via their population group) and candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Party {
    #[cfg_attr(feature = "serde", serde(rename = "Dem"))]
    Democratic,
    #[cfg_attr(feature = "serde", serde(rename = "Rep"))]
    Republican,
    #[cfg_attr(feature = "serde", serde(rename = "Ind"))]
    Independent,
}

impl Party {
    pub const ALL: [Party; 3] = [Party::Democratic, Party::Republican, Party::Independent];

    /// Parties that hold closed primaries.
    pub const MAJOR: [Party; 2] = [Party::Democratic, Party::Republican];

    pub const fn short_name(self) -> &'static str {
        match self {
            Party::Democratic => "Dem",
            Party::Republican => "Rep",
            Party::Independent => "Ind",
        }
    }

    pub const fn plural_name(self) -> &'static str {
        match self {
            Party::Democratic => "Democrats",
            Party::Republican => "Republicans",
            Party::Independent => "Independents",
        }
    }

    /// First letter used in generated candidate names (`D-1`, `R-V`).
    pub const fn initial(self) -> char {
        match self {
            Party::Democratic => 'D',
            Party::Republican => 'R',
            Party::Independent => 'I',
        }
    }

    /// Direction of the party's ideological extreme: -1 left, +1 right, 0 none.
    pub const fn extreme_direction(self) -> f64 {
        match self {
            Party::Democratic => -1.0,
            Party::Republican => 1.0,
            Party::Independent => 0.0,
        }
    }

    pub const fn is_major(self) -> bool {
        matches!(self, Party::Democratic | Party::Republican)
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_name())
    }
}

impl FromStr for Party {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "d" | "dem" | "democrat" | "democratic" | "democrats" => Ok(Party::Democratic),
            "r" | "rep" | "gop" | "republican" | "republicans" => Ok(Party::Republican),
            "i" | "ind" | "independent" | "independents" => Ok(Party::Independent),
            _ => Err(CoreError::UnknownParty(s.to_string())),
        }
    }
}

/* -------------------------------- Candidate ------------------------------- */

/// One entrant in a district's field. Immutable once generated.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Candidate {
    pub id: CandidateId,
    pub name: String,
    pub party: Party,
    pub ideology: f64,
    pub quality: f64,
    /// Competes in its party's primary rather than going straight to the general.
    pub primary_eligible: bool,
}

impl Candidate {
    /// Major-party candidates are primary-eligible; independents are not.
    pub fn new(id: CandidateId, name: impl Into<String>, party: Party, ideology: f64, quality: f64) -> Self {
        Self {
            id,
            name: name.into(),
            party,
            ideology,
            quality,
            primary_eligible: party.is_major(),
        }
    }
}

/* ---------------------------------- Voter --------------------------------- */

/// A sampled voter. Lives only long enough to cast ballots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Voter {
    pub ideology: f64,
    /// Derived from the population group the voter was drawn from.
    pub party: Party,
    /// Scale applied to each per-candidate noise draw.
    pub uncertainty: f64,
}

/* ---------------------------------- Ballot -------------------------------- */

/// Strict preference order, most preferred first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Ballot {
    ranking: Vec<CandidateId>,
}

impl Ballot {
    pub fn new(ranking: Vec<CandidateId>) -> Self {
        Self { ranking }
    }

    #[inline]
    pub fn ranking(&self) -> &[CandidateId] {
        &self.ranking
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranking.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranking.is_empty()
    }

    #[inline]
    pub fn top(&self) -> Option<CandidateId> {
        self.ranking.first().copied()
    }

    /// Highest-ranked candidate accepted by `active`, or `None` if exhausted.
    #[inline]
    pub fn first_where<F: Fn(CandidateId) -> bool>(&self, active: F) -> Option<CandidateId> {
        self.ranking.iter().copied().find(|&c| active(c))
    }

    pub fn rank_of(&self, c: CandidateId) -> Option<usize> {
        self.ranking.iter().position(|&x| x == c)
    }

    /// `Some(true)` if `a` is ranked above `b`. A ranked candidate beats an
    /// unranked one; `None` when neither is ranked.
    pub fn prefers(&self, a: CandidateId, b: CandidateId) -> Option<bool> {
        match (self.rank_of(a), self.rank_of(b)) {
            (Some(ra), Some(rb)) => Some(ra < rb),
            (Some(_), None) => Some(true),
            (None, Some(_)) => Some(false),
            (None, None) => None,
        }
    }

    /// Same relative order, keeping only candidates in `keep`.
    pub fn restricted_to(&self, keep: &[CandidateId]) -> Ballot {
        Ballot {
            ranking: self.ranking.iter().copied().filter(|c| keep.contains(c)).collect(),
        }
    }
}

impl From<Vec<CandidateId>> for Ballot {
    fn from(ranking: Vec<CandidateId>) -> Self {
        Ballot::new(ranking)
    }
}

/* --------------------------- District voting record ----------------------- */

/// One district's historical partisan profile.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct DistrictVotingRecord {
    pub district: DistrictId,
    pub state: String,
    pub incumbent: String,
    pub incumbent_party: Option<Party>,
    /// Signed lean in points; positive is Republican.
    pub lean: f64,
    pub d_pct: f64,
    pub r_pct: f64,
}

impl DistrictVotingRecord {
    /// Record with vote shares approximated from the lean.
    pub fn new(district: DistrictId, lean: f64) -> Self {
        let state = district.state().to_string();
        Self {
            district,
            state,
            incumbent: String::new(),
            incumbent_party: None,
            lean,
            d_pct: 50.0 - lean / 2.0,
            r_pct: 50.0 + lean / 2.0,
        }
    }

    pub fn with_incumbent(mut self, name: impl Into<String>, party: Option<Party>) -> Self {
        self.incumbent = name.into();
        self.incumbent_party = party;
        self
    }
}

/// Parse a Cook-style partisan lean. `R+n` is `+n`, `D+n` is `-n`,
/// `EVEN` or blank is 0, and a bare signed number is taken as-is.
pub fn parse_lean(raw: &str) -> Result<f64, CoreError> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("even") {
        return Ok(0.0);
    }
    let bad = || CoreError::BadLean(raw.to_string());
    let (sign, digits) = if let Some(rest) = strip_prefix_ci(s, "R+") {
        (1.0, rest)
    } else if let Some(rest) = strip_prefix_ci(s, "D+") {
        (-1.0, rest)
    } else {
        (1.0, s)
    };
    let v: f64 = digits.trim().parse().map_err(|_| bad())?;
    if !v.is_finite() {
        return Err(bad());
    }
    Ok(sign * v)
}

fn strip_prefix_ci<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    if s.len() >= prefix.len() && s.is_char_boundary(prefix.len()) && s[..prefix.len()].eq_ignore_ascii_case(prefix) {
        Some(&s[prefix.len()..])
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(xs: &[u16]) -> Vec<CandidateId> {
        xs.iter().map(|&x| CandidateId(x)).collect()
    }

    #[test]
    fn lean_parsing() {
        assert_eq!(parse_lean("R+27").unwrap(), 27.0);
        assert_eq!(parse_lean("D+5").unwrap(), -5.0);
        assert_eq!(parse_lean(" d+3.5 ").unwrap(), -3.5);
        assert_eq!(parse_lean("EVEN").unwrap(), 0.0);
        assert_eq!(parse_lean("").unwrap(), 0.0);
        assert_eq!(parse_lean("-4").unwrap(), -4.0);
        assert!(parse_lean("R+abc").is_err());
        assert!(parse_lean("Toss-up").is_err());
        assert!(parse_lean("R+inf").is_err());
    }

    #[test]
    fn party_tags_parse_loosely() {
        assert_eq!("Dem".parse::<Party>().unwrap(), Party::Democratic);
        assert_eq!("republican".parse::<Party>().unwrap(), Party::Republican);
        assert_eq!("I".parse::<Party>().unwrap(), Party::Independent);
        assert!("Whig".parse::<Party>().is_err());
    }

    #[test]
    fn only_major_parties_are_primary_eligible() {
        let d = Candidate::new(CandidateId(0), "D-1", Party::Democratic, -1.0, 0.0);
        let i = Candidate::new(CandidateId(1), "I-1", Party::Independent, 0.0, 0.0);
        assert!(d.primary_eligible);
        assert!(!i.primary_eligible);
    }

    #[test]
    fn ballot_preferences_and_restriction() {
        let b = Ballot::new(ids(&[2, 0, 3]));
        assert_eq!(b.top(), Some(CandidateId(2)));
        assert_eq!(b.prefers(CandidateId(0), CandidateId(3)), Some(true));
        assert_eq!(b.prefers(CandidateId(3), CandidateId(2)), Some(false));
        // ranked beats unranked
        assert_eq!(b.prefers(CandidateId(3), CandidateId(1)), Some(true));
        assert_eq!(b.prefers(CandidateId(1), CandidateId(4)), None);
        assert_eq!(b.restricted_to(&ids(&[3, 2])).ranking(), ids(&[2, 3]).as_slice());
        assert_eq!(b.first_where(|c| c != CandidateId(2)), Some(CandidateId(0)));
        assert_eq!(b.first_where(|_| false), None);
    }

    #[test]
    fn record_defaults_shares_from_lean() {
        let r = DistrictVotingRecord::new("OH-09".parse().unwrap(), 4.0);
        assert_eq!(r.state, "OH");
        assert_eq!(r.d_pct, 48.0);
        assert_eq!(r.r_pct, 52.0);
    }
}

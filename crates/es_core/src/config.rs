//! `SimulationConfig` and its wire-token enums.
//!
//! The config is assembled once (defaults, then an optional JSON file, then
//! CLI flags), validated, and then only ever borrowed. There is no global
//! state: seed plus config reproduces every ballot and result.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;

/// Wire-token enum: stable lowercase tokens for JSON and CLI.
macro_rules! wire_enum {
    ($(#[$meta:meta])* $name:ident, $err:path => { $($(#[$vmeta:meta])* $variant:ident = $token:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[cfg_attr(feature = "serde", serde(rename = $token))]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $token,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ConfigError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($token => Ok($name::$variant),)+
                    other => Err($err(other.to_string())),
                }
            }
        }
    };
}

wire_enum!(
    /// Tabulation rule applied to a district.
    ElectionMethod, ConfigError::UnsupportedMethod => {
        /// Closed party primaries (plurality) feeding a plurality general.
        PrimaryGeneral = "primary",
        /// Nonpartisan plurality round, then a head-to-head runoff.
        TopTwo = "top-2",
        InstantRunoff = "irv",
        Condorcet = "condorcet",
    }
);

impl ElectionMethod {
    /// Whether the runner must build per-party primary ballots.
    pub const fn needs_primary_ballots(self) -> bool {
        matches!(self, ElectionMethod::PrimaryGeneral)
    }
}

wire_enum!(
    /// How a district's candidate field is drawn.
    CandidateStrategy, ConfigError::UnsupportedStrategy => {
        NormalPartisan = "normal-partisan",
        PrimarySkewed = "primary-skewed",
        CondorcetSeeded = "condorcet-seeded",
        /// Fixed spread offsets around each party base plus one median entrant.
        Partisan = "partisan",
    }
);

/// Shape of the three-group electorate built from a district's lean.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct PopulationParams {
    /// Distance of each party's mean from the centre.
    pub partisanship: f64,
    pub stddev: f64,
    /// Population skew: how strongly the lean moves every group's mean.
    pub partisan_shift: f64,
}

impl Default for PopulationParams {
    fn default() -> Self {
        Self { partisanship: 1.0, stddev: 1.0, partisan_shift: 0.01 }
    }
}

/// Upper bound on the generated field size.
pub const MAX_FIELD: u64 = 1024;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default, deny_unknown_fields))]
pub struct SimulationConfig {
    pub seed: u64,
    pub n_voters: u32,
    pub candidates_per_party: u16,
    /// Scale of per-(voter, candidate) utility noise.
    pub uncertainty: f64,
    pub party_loyalty: f64,
    pub quality_scale: f64,
    pub party_bonus_scale: f64,
    pub wasted_vote_factor: f64,
    pub population: PopulationParams,
    pub primary_skew: f64,
    pub ideology_variance: f64,
    pub quality_variance: f64,
    pub condorcet_variance: f64,
    /// Centrist entrants added by `condorcet-seeded`.
    pub n_condorcet: u16,
    /// Offset width used by the `partisan` strategy, in group standard deviations.
    pub spread: f64,
    pub candidate_strategy: CandidateStrategy,
    pub methods: Vec<ElectionMethod>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            n_voters: 1000,
            candidates_per_party: 3,
            uncertainty: 0.5,
            party_loyalty: 1.0,
            quality_scale: 1.0,
            party_bonus_scale: 0.0,
            wasted_vote_factor: 0.0,
            population: PopulationParams::default(),
            primary_skew: 0.0,
            ideology_variance: 0.20,
            quality_variance: 0.0,
            condorcet_variance: 0.1,
            n_condorcet: 1,
            spread: 0.4,
            candidate_strategy: CandidateStrategy::NormalPartisan,
            methods: vec![ElectionMethod::PrimaryGeneral],
        }
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidWeight { field, value })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::NotFinite { field, value })
    }
}

impl SimulationConfig {
    /// Number of candidates the configured strategy produces per district.
    pub fn field_size(&self) -> u64 {
        let partisans = 2 * u64::from(self.candidates_per_party);
        match self.candidate_strategy {
            CandidateStrategy::NormalPartisan | CandidateStrategy::PrimarySkewed => partisans,
            CandidateStrategy::CondorcetSeeded => partisans + u64::from(self.n_condorcet),
            // the median entrant replaces one partisan slot
            CandidateStrategy::Partisan => partisans,
        }
    }

    /// Reject anything that would make a district unrunnable. Called once,
    /// before any simulation work starts.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("uncertainty", self.uncertainty)?;
        non_negative("party_loyalty", self.party_loyalty)?;
        non_negative("quality_scale", self.quality_scale)?;
        non_negative("party_bonus_scale", self.party_bonus_scale)?;
        non_negative("wasted_vote_factor", self.wasted_vote_factor)?;
        non_negative("population.stddev", self.population.stddev)?;
        non_negative("ideology_variance", self.ideology_variance)?;
        non_negative("quality_variance", self.quality_variance)?;
        non_negative("condorcet_variance", self.condorcet_variance)?;
        non_negative("spread", self.spread)?;
        finite("population.partisanship", self.population.partisanship)?;
        finite("population.partisan_shift", self.population.partisan_shift)?;
        finite("primary_skew", self.primary_skew)?;

        if self.n_voters == 0 {
            return Err(ConfigError::TooSmall { field: "n_voters", min: 1, value: 0 });
        }
        if self.candidates_per_party == 0 {
            return Err(ConfigError::TooSmall { field: "candidates_per_party", min: 1, value: 0 });
        }
        if self.candidate_strategy == CandidateStrategy::CondorcetSeeded && self.n_condorcet == 0 {
            return Err(ConfigError::TooSmall { field: "n_condorcet", min: 1, value: 0 });
        }
        let field = self.field_size();
        if field > MAX_FIELD {
            return Err(ConfigError::TooLarge { field: "candidate field", max: MAX_FIELD, value: field });
        }

        if self.methods.is_empty() {
            return Err(ConfigError::NoMethods);
        }
        for (i, m) in self.methods.iter().enumerate() {
            if self.methods[..i].contains(m) {
                return Err(ConfigError::DuplicateMethod(m.as_str()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(SimulationConfig::default().validate().is_ok());
    }

    #[test]
    fn wire_tokens_round_trip_through_from_str() {
        for m in ElectionMethod::ALL {
            assert_eq!(m.as_str().parse::<ElectionMethod>().unwrap(), *m);
        }
        for s in CandidateStrategy::ALL {
            assert_eq!(s.as_str().parse::<CandidateStrategy>().unwrap(), *s);
        }
        assert_eq!(
            "approval".parse::<ElectionMethod>(),
            Err(ConfigError::UnsupportedMethod("approval".into()))
        );
        assert!(matches!(
            "random".parse::<CandidateStrategy>(),
            Err(ConfigError::UnsupportedStrategy(_))
        ));
    }

    #[test]
    fn rejects_bad_weights() {
        let c = SimulationConfig { uncertainty: -0.1, ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::InvalidWeight { field: "uncertainty", .. })));

        let c = SimulationConfig { quality_scale: f64::NAN, ..Default::default() };
        assert!(c.validate().is_err());

        let c = SimulationConfig { primary_skew: f64::INFINITY, ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::NotFinite { .. })));
    }

    #[test]
    fn rejects_empty_fields_and_electorates() {
        let c = SimulationConfig { candidates_per_party: 0, ..Default::default() };
        assert!(matches!(c.validate(), Err(ConfigError::TooSmall { field: "candidates_per_party", .. })));

        let c = SimulationConfig { n_voters: 0, ..Default::default() };
        assert!(c.validate().is_err());

        let c = SimulationConfig {
            candidate_strategy: CandidateStrategy::CondorcetSeeded,
            n_condorcet: 0,
            ..Default::default()
        };
        assert!(matches!(c.validate(), Err(ConfigError::TooSmall { field: "n_condorcet", .. })));
    }

    #[test]
    fn rejects_missing_or_repeated_methods() {
        let c = SimulationConfig { methods: vec![], ..Default::default() };
        assert_eq!(c.validate(), Err(ConfigError::NoMethods));

        let c = SimulationConfig {
            methods: vec![ElectionMethod::InstantRunoff, ElectionMethod::Condorcet, ElectionMethod::InstantRunoff],
            ..Default::default()
        };
        assert_eq!(c.validate(), Err(ConfigError::DuplicateMethod("irv")));
    }

    #[test]
    fn field_size_per_strategy() {
        let mut c = SimulationConfig { candidates_per_party: 2, n_condorcet: 3, ..Default::default() };
        assert_eq!(c.field_size(), 4);
        c.candidate_strategy = CandidateStrategy::CondorcetSeeded;
        assert_eq!(c.field_size(), 7);
        c.candidate_strategy = CandidateStrategy::Partisan;
        assert_eq!(c.field_size(), 4);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn partial_json_fills_defaults() {
        let c: SimulationConfig =
            serde_json::from_str(r#"{"seed":9,"methods":["irv","top-2"],"population":{"stddev":0.5}}"#).unwrap();
        assert_eq!(c.seed, 9);
        assert_eq!(c.methods, vec![ElectionMethod::InstantRunoff, ElectionMethod::TopTwo]);
        assert_eq!(c.population.stddev, 0.5);
        assert_eq!(c.population.partisanship, 1.0);
        assert_eq!(c.n_voters, 1000);
        assert!(serde_json::from_str::<SimulationConfig>(r#"{"sed":1}"#).is_err());
    }
}

//! es_core: core types, configuration, ordering helpers and seeded Gaussian streams.
//!
//! This crate is **I/O-free**. It defines the stable types shared across the
//! simulator (`es_algo`, `es_io`, `es_pipeline`, `es_report`, `es_cli`).
//!
//! - Tokens: `DistrictId`, `CandidateId`
//! - Entities: `Party`, `Candidate`, `Voter`, `Ballot`, `DistrictVotingRecord`
//! - `SimulationConfig` and its wire enums (`ElectionMethod`, `CandidateStrategy`)
//! - Deterministic ordering helpers
//! - Per-purpose ChaCha20 Gaussian streams
//!
//! Serialization derives are gated behind the `serde` feature.

#![forbid(unsafe_code)]

pub mod errors {
    use thiserror::Error;

    /// Token and tag parsing failures.
    #[derive(Clone, Debug, Eq, PartialEq, Error)]
    pub enum CoreError {
        #[error("invalid token: {0:?}")]
        InvalidToken(String),
        #[error("unknown party tag: {0:?}")]
        UnknownParty(String),
        #[error("unparsable partisan lean: {0:?}")]
        BadLean(String),
    }

    /// Invalid or missing configuration. Fatal: raised before any district runs.
    #[derive(Clone, Debug, PartialEq, Error)]
    pub enum ConfigError {
        #[error("{field} must be finite and non-negative (got {value})")]
        InvalidWeight { field: &'static str, value: f64 },
        #[error("{field} must be finite (got {value})")]
        NotFinite { field: &'static str, value: f64 },
        #[error("{field} must be at least {min} (got {value})")]
        TooSmall { field: &'static str, min: u64, value: u64 },
        #[error("{field} must be at most {max} (got {value})")]
        TooLarge { field: &'static str, max: u64, value: u64 },
        #[error("no election methods requested")]
        NoMethods,
        #[error("election method {0} requested more than once")]
        DuplicateMethod(&'static str),
        #[error("unsupported election type: {0:?}")]
        UnsupportedMethod(String),
        #[error("unsupported candidate generator: {0:?}")]
        UnsupportedStrategy(String),
    }

    /// A malformed district record. The district is skipped, the batch continues.
    #[derive(Clone, Debug, Eq, PartialEq, Error)]
    pub enum DataError {
        #[error("row {row}: missing field {field}")]
        MissingField { row: usize, field: &'static str },
        #[error("row {row} ({district}): unparsable partisan lean {value:?}")]
        BadLean { row: usize, district: String, value: String },
        #[error("row {row}: invalid district number {value:?}")]
        BadDistrictNumber { row: usize, value: String },
        #[error("row {row}: {msg}")]
        Malformed { row: usize, msg: String },
    }
}

pub mod ids {
    //! District tokens and candidate indices.

    use crate::errors::CoreError;
    use core::fmt;
    use core::str::FromStr;

    #[cfg(feature = "serde")]
    use serde::{Deserialize, Serialize};

    fn is_token(s: &str) -> bool {
        let len = s.len();
        if !(1..=64).contains(&len) {
            return false;
        }
        s.bytes().all(|b| matches!(b,
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' |
            b'_' | b'-' | b':' | b'.'
        ))
    }

    macro_rules! def_token {
        ($name:ident) => {
            #[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
            #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
            #[cfg_attr(feature = "serde", serde(transparent))]
            pub struct $name(String);

            impl $name {
                pub fn as_str(&self) -> &str { &self.0 }
                pub fn as_bytes(&self) -> &[u8] { self.0.as_bytes() }
            }

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
            }

            impl FromStr for $name {
                type Err = CoreError;
                fn from_str(s: &str) -> Result<Self, Self::Err> {
                    if is_token(s) { Ok(Self(s.to_string())) } else { Err(CoreError::InvalidToken(s.to_string())) }
                }
            }
        }
    }

    def_token!(DistrictId);

    impl DistrictId {
        /// State prefix: everything before the first `-` (the whole id if none).
        pub fn state(&self) -> &str {
            self.0.split('-').next().unwrap_or(&self.0)
        }
    }

    /// Position of a candidate in its generated field. This is also the
    /// stable order every deterministic tie-break falls back to.
    #[derive(Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
    #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
    #[cfg_attr(feature = "serde", serde(transparent))]
    pub struct CandidateId(pub u16);

    impl CandidateId {
        #[inline]
        pub fn index(self) -> usize { self.0 as usize }
    }

    impl fmt::Display for CandidateId {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "#{}", self.0) }
    }
}

pub mod config;
pub mod determinism;
pub mod entities;
pub mod rng;

pub use config::{CandidateStrategy, ElectionMethod, PopulationParams, SimulationConfig};
pub use entities::{Ballot, Candidate, DistrictVotingRecord, Party, Voter};
pub use errors::{ConfigError, CoreError, DataError};
pub use ids::{CandidateId, DistrictId};
pub use rng::{GaussianSampler, StreamPurpose};

#[cfg(test)]
mod tests {
    use super::*;
    use core::str::FromStr;

    #[test]
    fn district_token_charset() {
        assert!(DistrictId::from_str("CA-15").is_ok());
        assert!(DistrictId::from_str("").is_err());
        assert!(DistrictId::from_str("CA 15").is_err());
    }

    #[test]
    fn district_state_prefix() {
        let d = DistrictId::from_str("NY-03").unwrap();
        assert_eq!(d.state(), "NY");
        let bare = DistrictId::from_str("DC").unwrap();
        assert_eq!(bare.state(), "DC");
    }

    #[test]
    fn candidate_ids_order_by_index() {
        assert!(CandidateId(0) < CandidateId(1));
        assert_eq!(CandidateId(7).index(), 7);
    }
}

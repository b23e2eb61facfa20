//! crates/es_io/src/lib.rs
//! File-facing side of electsim.
//!
//! - Shared error type (`IoError`) with `From` conversions used across modules.
//! - District CSV ingestion, JSON config loading, canonical JSON artifacts and
//!   SHA-256 digests live in submodules.

#![forbid(unsafe_code)]

use es_core::ConfigError;
use thiserror::Error;

/// Unified error for es_io.
#[derive(Debug, Error)]
pub enum IoError {
    /// Filesystem / path errors (open, create_dir_all, rename, fsync, ...).
    #[error("io/path error: {0}")]
    Path(String),

    /// JSON serialization/deserialization errors with a location hint.
    #[error("json error at {pointer}: {msg}")]
    Json { pointer: String, msg: String },

    /// The CSV file itself could not be opened or its header read.
    #[error("csv error: {0}")]
    Csv(String),

    /// A config file parsed but carried an invalid value.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// Generic validation / invariants.
    #[error("invalid: {0}")]
    Invalid(String),
}

pub type IoResult<T> = Result<T, IoError>;

/* ---------------- From conversions (used by file modules) ---------------- */

impl From<std::io::Error> for IoError {
    fn from(e: std::io::Error) -> Self {
        IoError::Path(e.to_string())
    }
}

impl From<serde_json::Error> for IoError {
    fn from(e: serde_json::Error) -> Self {
        let pointer = if e.line() == 0 {
            "/".to_string()
        } else {
            format!("line {} column {}", e.line(), e.column())
        };
        IoError::Json { pointer, msg: e.to_string() }
    }
}

impl From<csv::Error> for IoError {
    fn from(e: csv::Error) -> Self {
        IoError::Csv(e.to_string())
    }
}

/* ---------------- Public modules ---------------- */

pub mod canonical_json;
pub mod config_file;
pub mod digest;
pub mod loader;

/// Returns true if `s` looks like a URL (any `<scheme>://`, including `file://`).
#[inline]
pub fn looks_like_url_strict(s: &str) -> bool {
    s.trim().contains("://")
}

/* ---------------- Public prelude ----------------
   use es_io::prelude::*;
------------------------------------------------- */

pub mod prelude {
    pub use crate::{looks_like_url_strict, IoError, IoResult};

    pub use crate::canonical_json;
    pub use crate::config_file;
    pub use crate::digest;
    pub use crate::loader;

    pub use crate::canonical_json::{to_canonical_json_bytes, write_canonical_file, write_pretty_file};
    pub use crate::config_file::load_config;
    pub use crate::digest::sha256_hex;
    pub use crate::loader::{load_districts, DistrictLoad};
}

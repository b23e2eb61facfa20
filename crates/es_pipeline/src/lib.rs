//! es_pipeline: district simulation orchestration (load → electorate → field →
//! ballots → tabulate → summarize).
//! Math lives in `es_algo` and file handling in `es_io`; this crate wires them
//! together per district and fans districts out over a rayon pool.

#![forbid(unsafe_code)]

use es_algo::{GenerateError, TabError};
use es_core::{CandidateId, ConfigError, DataError, DistrictId, ElectionMethod};
use thiserror::Error;

pub mod aggregate;
pub mod load;
pub mod runner;
pub mod summary;

pub use aggregate::{
    run_batch, run_batch_observed, run_batch_observed_with_threads, run_batch_with_threads, BatchOutcome, CancelToken,
    DistrictFailure,
};
pub use load::{load_batch, BatchInput};
pub use runner::{simulate_district, DistrictElectorate, ElectionResult, WinnerInfo};
pub use summary::{summarize, summarize_all, MethodSummary};

/// Batch-level failure. Anything here stops the run before (or instead of)
/// simulating districts.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("config: {0}")]
    Config(#[from] ConfigError),
    #[error("io: {0}")]
    Io(String),
    #[error("input: {0}")]
    Input(String),
    #[error("unknown district {0:?}")]
    UnknownDistrict(String),
    #[error("no districts to simulate")]
    NoDistricts,
    #[error("worker pool: {0}")]
    Pool(String),
}

impl From<es_io::IoError> for PipelineError {
    fn from(e: es_io::IoError) -> Self {
        use es_io::IoError;
        match e {
            IoError::Path(m) => PipelineError::Io(m),
            IoError::Json { pointer, msg } => PipelineError::Input(format!("json {pointer}: {msg}")),
            IoError::Csv(m) => PipelineError::Input(format!("csv: {m}")),
            IoError::Config(c) => PipelineError::Config(c),
            IoError::Invalid(m) => PipelineError::Input(m),
        }
    }
}

/// One district's failure. The district gets no result; the batch goes on.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistrictError {
    #[error(transparent)]
    Data(#[from] DataError),
    #[error("{district}: {source}")]
    Generate {
        district: DistrictId,
        #[source]
        source: GenerateError,
    },
    #[error("{district} ({method}): {source}")]
    Tabulate {
        district: DistrictId,
        method: ElectionMethod,
        #[source]
        source: TabError,
    },
    #[error("{district} ({method}): winner {winner} is not in the field")]
    MissingWinner {
        district: DistrictId,
        method: ElectionMethod,
        winner: CandidateId,
    },
}

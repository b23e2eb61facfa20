//! es_report/src/lib.rs: report model + renderers (JSON value, console text).
//!
//! Determinism rules:
//! - No file I/O here. Callers hand over a finished batch.
//! - Runs follow the configured method order; districts sort by id.
//! - A district without a result has no record; its failure is listed instead.

#![deny(unsafe_code)]

use thiserror::Error;

pub mod render_json;
pub mod render_text;
pub mod structure;

pub use render_json::{attach_digest, render_json, report_digest};
pub use render_text::render_text;
pub use structure::{
    build_report, DistrictRecord, DistrictTrace, EngineMeta, MethodRun, ReportOptions, SimulationReport,
};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("json: {0}")]
    Json(String),
    #[error("digest: {0}")]
    Digest(String),
}

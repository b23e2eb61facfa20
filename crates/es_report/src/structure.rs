//! crates/es_report/src/structure.rs
//! Report data model and the mapper from a finished batch. No I/O and no
//! recomputation: every number comes from the pipeline as-is.

use es_algo::TabulationTrace;
use es_core::{Candidate, DataError, DistrictId, ElectionMethod, Party, SimulationConfig};
use es_pipeline::{summarize, BatchOutcome, DistrictFailure, ElectionResult, MethodSummary};
use serde::Serialize;

pub const ENGINE_NAME: &str = "electsim";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

// -------------------- Model root & sections --------------------

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SimulationReport {
    pub engine: EngineMeta,
    pub seed: u64,
    pub config: SimulationConfig,
    /// Loader rejections, one message per skipped row.
    pub rejected_rows: Vec<String>,
    pub cancelled: bool,
    pub runs: Vec<MethodRun>,
    /// SHA-256 of the canonical report with this field absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_digest: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct EngineMeta {
    pub name: String,
    pub version: String,
}

impl Default for EngineMeta {
    fn default() -> Self {
        Self { name: ENGINE_NAME.to_string(), version: ENGINE_VERSION.to_string() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MethodRun {
    pub method: ElectionMethod,
    pub summary: MethodSummary,
    /// One record per district that produced a result, by district id.
    pub districts: Vec<DistrictRecord>,
    pub failures: Vec<DistrictFailure>,
}

/// Flat per-district row consumed by maps and plots.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistrictRecord {
    pub district: DistrictId,
    pub state: String,
    pub incumbent: String,
    pub incumbent_party: Option<Party>,
    pub expected_lean: f64,
    pub winner_name: String,
    pub winner_party: Party,
    pub winner_ideology: f64,
    pub winner_quality: f64,
    pub margin: i64,
    pub total_votes: u64,
    pub voter_satisfaction: f64,
    pub median_satisfaction: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<DistrictTrace>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct DistrictTrace {
    pub field: Vec<Candidate>,
    pub tabulation: TabulationTrace,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportOptions {
    /// Attach the candidate field and tabulation rounds to each district.
    pub trace: bool,
}

// -------------------- Mapping --------------------

impl DistrictRecord {
    pub fn from_result(r: &ElectionResult, with_trace: bool) -> Self {
        Self {
            district: r.district.clone(),
            state: r.state.clone(),
            incumbent: r.incumbent.clone(),
            incumbent_party: r.incumbent_party,
            expected_lean: r.expected_lean,
            winner_name: r.winner.name.clone(),
            winner_party: r.winner.party,
            winner_ideology: r.winner.ideology,
            winner_quality: r.winner.quality,
            margin: r.margin,
            total_votes: r.total_votes,
            voter_satisfaction: r.voter_satisfaction,
            median_satisfaction: r.median_satisfaction,
            trace: with_trace.then(|| DistrictTrace { field: r.field.clone(), tabulation: r.trace.clone() }),
        }
    }
}

/// Build the report for one batch. Runs follow `config.methods` order.
pub fn build_report(
    config: &SimulationConfig,
    outcome: &BatchOutcome,
    rejected: &[DataError],
    opts: ReportOptions,
) -> SimulationReport {
    let runs = config
        .methods
        .iter()
        .map(|&method| {
            let mut districts: Vec<DistrictRecord> = outcome
                .results_for(method)
                .map(|r| DistrictRecord::from_result(r, opts.trace))
                .collect();
            districts.sort_by(|a, b| a.district.cmp(&b.district));
            MethodRun {
                method,
                summary: summarize(method, &outcome.results),
                districts,
                failures: outcome.failures_for(method).cloned().collect(),
            }
        })
        .collect();

    SimulationReport {
        engine: EngineMeta::default(),
        seed: config.seed,
        config: config.clone(),
        rejected_rows: rejected.iter().map(ToString::to_string).collect(),
        cancelled: outcome.cancelled,
        runs,
        report_digest: None,
    }
}

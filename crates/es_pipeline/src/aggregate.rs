//! Batch fan-out: every district runs every configured method on a rayon pool.
//! Districts share nothing, so results are collected in any order and then
//! sorted by (method, district). Failures stay per district.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use es_core::{DistrictId, DistrictVotingRecord, ElectionMethod, SimulationConfig};
use rayon::prelude::*;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::runner::{DistrictElectorate, ElectionResult};
use crate::{DistrictError, PipelineError};

/// Coarse cancellation, checked before each district starts.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// A (district, method) pair that produced no result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictFailure {
    pub district: DistrictId,
    pub method: ElectionMethod,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BatchOutcome {
    pub results: Vec<ElectionResult>,
    pub failures: Vec<DistrictFailure>,
    /// Set when cancellation skipped at least one district.
    pub cancelled: bool,
}

impl BatchOutcome {
    pub fn results_for(&self, method: ElectionMethod) -> impl Iterator<Item = &ElectionResult> + '_ {
        self.results.iter().filter(move |r| r.method == method)
    }

    pub fn failures_for(&self, method: ElectionMethod) -> impl Iterator<Item = &DistrictFailure> + '_ {
        self.failures.iter().filter(move |f| f.method == method)
    }
}

/// Run every district under every method in `config.methods` on the current
/// rayon pool. Districts already finished when `cancel` fires keep their results.
pub fn run_batch(records: &[DistrictVotingRecord], config: &SimulationConfig, cancel: &CancelToken) -> BatchOutcome {
    run_batch_observed(records, config, cancel, &|_| {})
}

/// [`run_batch`], calling `on_district` from the worker as each district finishes.
pub fn run_batch_observed(
    records: &[DistrictVotingRecord],
    config: &SimulationConfig,
    cancel: &CancelToken,
    on_district: &(dyn Fn(&DistrictId) + Sync),
) -> BatchOutcome {
    let per_district: Vec<Option<Vec<Result<ElectionResult, DistrictFailure>>>> = records
        .par_iter()
        .map(|record| {
            if cancel.is_cancelled() {
                return None;
            }
            let runs = simulate_all_methods(record, config);
            on_district(&record.district);
            Some(runs)
        })
        .collect();

    let mut outcome = BatchOutcome::default();
    for district in per_district {
        let Some(runs) = district else {
            outcome.cancelled = true;
            continue;
        };
        for run in runs {
            match run {
                Ok(r) => outcome.results.push(r),
                Err(f) => outcome.failures.push(f),
            }
        }
    }

    let rank = |m: ElectionMethod| config.methods.iter().position(|&x| x == m).unwrap_or(usize::MAX);
    outcome
        .results
        .sort_by(|a, b| rank(a.method).cmp(&rank(b.method)).then_with(|| a.district.cmp(&b.district)));
    outcome
        .failures
        .sort_by(|a, b| rank(a.method).cmp(&rank(b.method)).then_with(|| a.district.cmp(&b.district)));

    if outcome.cancelled {
        warn!(completed = outcome.results.len(), "batch cancelled");
    }
    info!(
        districts = records.len(),
        results = outcome.results.len(),
        failures = outcome.failures.len(),
        "batch complete"
    );
    outcome
}

/// [`run_batch`] on a dedicated pool of `threads` workers (all cores when `None`).
pub fn run_batch_with_threads(
    records: &[DistrictVotingRecord],
    config: &SimulationConfig,
    cancel: &CancelToken,
    threads: Option<usize>,
) -> Result<BatchOutcome, PipelineError> {
    run_batch_observed_with_threads(records, config, cancel, threads, &|_| {})
}

/// [`run_batch_observed`] on a dedicated pool of `threads` workers.
pub fn run_batch_observed_with_threads(
    records: &[DistrictVotingRecord],
    config: &SimulationConfig,
    cancel: &CancelToken,
    threads: Option<usize>,
    on_district: &(dyn Fn(&DistrictId) + Sync),
) -> Result<BatchOutcome, PipelineError> {
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    let pool = builder.build().map_err(|e| PipelineError::Pool(e.to_string()))?;
    Ok(pool.install(|| run_batch_observed(records, config, cancel, on_district)))
}

fn simulate_all_methods(
    record: &DistrictVotingRecord,
    config: &SimulationConfig,
) -> Vec<Result<ElectionResult, DistrictFailure>> {
    let electorate = match DistrictElectorate::build(record, config, &config.methods) {
        Ok(e) => e,
        Err(e) => {
            error!(district = %record.district, error = %e, "field generation failed");
            return config.methods.iter().map(|&m| Err(failure(&record.district, m, &e))).collect();
        }
    };
    config
        .methods
        .iter()
        .map(|&m| {
            electorate.run(config, m).map_err(|e| {
                error!(district = %record.district, method = %m, error = %e, "tabulation failed");
                failure(&record.district, m, &e)
            })
        })
        .collect()
}

fn failure(district: &DistrictId, method: ElectionMethod, e: &DistrictError) -> DistrictFailure {
    DistrictFailure { district: district.clone(), method, reason: e.to_string() }
}

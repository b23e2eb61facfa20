//! JSON rendering. Object keys follow struct field order (serde_json is built
//! with `preserve_order`), so the pretty artifact reads top-down: engine,
//! seed, config, then one run per method.

use es_io::digest::sha256_canonical;
use serde_json::Value;

use crate::structure::SimulationReport;
use crate::ReportError;

pub fn render_json(report: &SimulationReport) -> Result<Value, ReportError> {
    serde_json::to_value(report).map_err(|e| ReportError::Json(e.to_string()))
}

/// Digest of the canonical report, computed with `report_digest` unset so the
/// value never depends on itself.
pub fn report_digest(report: &SimulationReport) -> Result<String, ReportError> {
    let mut bare = report.clone();
    bare.report_digest = None;
    let v = render_json(&bare)?;
    sha256_canonical(&v).map_err(|e| ReportError::Digest(e.to_string()))
}

/// Fill `report_digest` in place.
pub fn attach_digest(report: &mut SimulationReport) -> Result<(), ReportError> {
    report.report_digest = Some(report_digest(report)?);
    Ok(())
}

//! LOAD stage: validate the config, read the district file, apply the
//! district filter. Everything fatal surfaces here, before any simulation.

use std::path::Path;

use es_core::{DataError, DistrictVotingRecord, SimulationConfig};
use es_io::loader::load_districts;
use tracing::info;

use crate::PipelineError;

/// Districts ready to simulate plus the rows the loader skipped.
#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub records: Vec<DistrictVotingRecord>,
    pub rejected: Vec<DataError>,
}

/// Validate `config` and load `data_file`. A non-empty `only` keeps just the
/// named districts; naming one the file does not have is an error.
pub fn load_batch(data_file: &Path, config: &SimulationConfig, only: &[String]) -> Result<BatchInput, PipelineError> {
    config.validate()?;

    let load = load_districts(data_file)?;

    let mut records = load.records;
    if !only.is_empty() {
        if let Some(missing) = only.iter().find(|d| !records.iter().any(|r| r.district.as_str() == d.as_str())) {
            return Err(PipelineError::UnknownDistrict(missing.clone()));
        }
        records.retain(|r| only.iter().any(|d| d.as_str() == r.district.as_str()));
    }
    if records.is_empty() {
        return Err(PipelineError::NoDistricts);
    }

    info!(districts = records.len(), rejected = load.rejected.len(), "districts loaded");
    Ok(BatchInput { records, rejected: load.rejected })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(rows: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "State,Number,Member,Party,2025 Cook PVI").unwrap();
        for r in rows {
            writeln!(f, "{r}").unwrap();
        }
        f.flush().unwrap();
        f
    }

    #[test]
    fn invalid_config_fails_before_reading() {
        let cfg = SimulationConfig { n_voters: 0, ..SimulationConfig::default() };
        let err = load_batch(Path::new("/no/such/file.csv"), &cfg, &[]).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn filter_keeps_named_districts() {
        let f = csv_file(&["Vermont,AL,Becca Balint,D,D+16", "Maine,2,Jared Golden,D,R+4", "Maine,1,Chellie Pingree,D,D+9"]);
        let cfg = SimulationConfig::default();

        let all = load_batch(f.path(), &cfg, &[]).unwrap();
        assert_eq!(all.records.len(), 3);

        let some = load_batch(f.path(), &cfg, &["ME-02".to_string()]).unwrap();
        assert_eq!(some.records.len(), 1);
        assert_eq!(some.records[0].district.as_str(), "ME-02");

        let err = load_batch(f.path(), &cfg, &["ME-03".to_string()]).unwrap_err();
        assert!(matches!(err, PipelineError::UnknownDistrict(d) if d == "ME-03"));
    }

    #[test]
    fn all_rows_rejected_means_nothing_to_run() {
        let f = csv_file(&["Maine,1,Chellie Pingree,D,D+?"]);
        let err = load_batch(f.path(), &SimulationConfig::default(), &[]).unwrap_err();
        assert!(matches!(err, PipelineError::NoDistricts));
    }
}

//! JSON config files. Keys mirror `SimulationConfig` field names; anything
//! omitted keeps its default and unknown keys are rejected.

use std::fs;
use std::path::Path;

use es_core::SimulationConfig;
use tracing::debug;

use crate::{looks_like_url_strict, IoError, IoResult};

/// Read and parse a config file. Validation is left to the caller, which
/// layers CLI flags on top first.
pub fn load_config(path: &Path) -> IoResult<SimulationConfig> {
    if looks_like_url_strict(&path.to_string_lossy()) {
        return Err(IoError::Invalid(format!("config must be a local file: {}", path.display())));
    }
    let bytes = fs::read(path).map_err(|e| IoError::Path(format!("{}: {e}", path.display())))?;
    let cfg = parse_config(&bytes)?;
    debug!(path = %path.display(), seed = cfg.seed, "loaded config file");
    Ok(cfg)
}

pub fn parse_config(bytes: &[u8]) -> IoResult<SimulationConfig> {
    Ok(serde_json::from_slice(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use es_core::{CandidateStrategy, ElectionMethod};
    use std::io::Write;

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg = parse_config(br#"{"seed": 9, "methods": ["irv", "condorcet"], "candidate_strategy": "partisan"}"#)
            .unwrap();
        assert_eq!(cfg.seed, 9);
        assert_eq!(cfg.methods, vec![ElectionMethod::InstantRunoff, ElectionMethod::Condorcet]);
        assert_eq!(cfg.candidate_strategy, CandidateStrategy::Partisan);
        assert_eq!(cfg.n_voters, SimulationConfig::default().n_voters);
    }

    #[test]
    fn unknown_keys_and_tokens_are_rejected() {
        assert!(matches!(parse_config(br#"{"sead": 1}"#), Err(IoError::Json { .. })));
        assert!(matches!(parse_config(br#"{"methods": ["borda"]}"#), Err(IoError::Json { .. })));
    }

    #[test]
    fn reads_from_disk() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(f, r#"{{"uncertainty": 0.25}}"#).unwrap();
        assert_eq!(load_config(f.path()).unwrap().uncertainty, 0.25);
        assert!(matches!(load_config(Path::new("/definitely/not/here.json")), Err(IoError::Path(_))));
    }
}

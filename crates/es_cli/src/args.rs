// crates/es_cli/src/args.rs
//
// Offline CLI argument surface.
// - Paths must be local (no scheme://); inputs must exist
// - Seed: u64 decimal or 0x-hex up to 16 nybbles
// - Simulation flags override the config file, which overrides defaults
// - --validate-only loads and checks inputs without simulating

use std::fs;
use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser};
use es_core::{CandidateStrategy, ElectionMethod, SimulationConfig};
use thiserror::Error;

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "electsim",
    version,
    disable_help_subcommand = true,
    about = "Simulate US House elections district by district under several election methods"
)]
pub struct Args {
    // --- Inputs & outputs ---
    /// District CSV (State, Number, Member, Party, 2025 Cook PVI).
    #[arg(long)]
    pub data_file: PathBuf,
    /// Where the JSON report goes.
    #[arg(long, default_value = "results.json")]
    pub output: PathBuf,
    /// JSON config file; flags given on the command line override it.
    #[arg(long)]
    pub config: Option<PathBuf>,

    // --- Run shape ---
    /// Master seed. Accepts decimal u64 or 0x-hex (≤16 hex digits).
    #[arg(long, value_parser = parse_seed)]
    pub seed: Option<u64>,
    /// Candidates per major party.
    #[arg(long)]
    pub candidates: Option<u16>,
    /// Election method(s): primary, top-2, irv, condorcet. Repeat or comma-separate.
    #[arg(long = "election-type", value_delimiter = ',')]
    pub election_type: Vec<ElectionMethod>,
    /// normal-partisan, primary-skewed, condorcet-seeded or partisan.
    #[arg(long)]
    pub candidate_generator: Option<CandidateStrategy>,
    /// Voters sampled per district.
    #[arg(long)]
    pub nvoters: Option<u32>,

    // --- Voter model ---
    #[arg(long)]
    pub uncertainty: Option<f64>,
    #[arg(long)]
    pub party_loyalty: Option<f64>,
    #[arg(long)]
    pub quality_scale: Option<f64>,
    #[arg(long)]
    pub party_bonus_scale: Option<f64>,
    #[arg(long)]
    pub wasted_vote_factor: Option<f64>,

    // --- Electorate ---
    #[arg(long)]
    pub partisanship: Option<f64>,
    #[arg(long)]
    pub population_stddev: Option<f64>,
    /// Population skew per point of partisan lean.
    #[arg(long)]
    pub partisan_shift: Option<f64>,
    #[arg(long)]
    pub primary_skew: Option<f64>,

    // --- Candidate generators ---
    #[arg(long)]
    pub ideology_variance: Option<f64>,
    #[arg(long)]
    pub quality_variance: Option<f64>,
    #[arg(long)]
    pub condorcet_variance: Option<f64>,
    #[arg(long)]
    pub n_condorcet: Option<u16>,
    #[arg(long)]
    pub spread: Option<f64>,

    // --- Control ---
    /// Only simulate these districts (e.g. CA-12). Repeatable.
    #[arg(long = "district")]
    pub districts: Vec<String>,
    /// Worker threads (default: all cores).
    #[arg(long)]
    pub threads: Option<usize>,
    /// Include candidate fields and tabulation rounds per district.
    #[arg(long)]
    pub trace: bool,
    /// Write compact canonical JSON (sorted keys) instead of indented output.
    #[arg(long)]
    pub canonical: bool,
    /// Load and validate inputs only; do not simulate.
    #[arg(long)]
    pub validate_only: bool,
    /// Only warnings and errors.
    #[arg(long, short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,
    /// Debug logging.
    #[arg(short = 'v', long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Errors surfaced by argument validation.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("path must be a local file (no scheme): {0}")]
    NonLocalPath(String),
    #[error("file not found: {0}")]
    NotFound(String),
    #[error("--threads must be at least 1")]
    ZeroThreads,
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    validate(Args::parse())
}

pub fn validate(args: Args) -> Result<Args, CliError> {
    for p in iter_all_paths(&args) {
        ensure_local_path(p)?;
    }
    ensure_local_exists(&args.data_file, "--data-file")?;
    if let Some(c) = &args.config {
        ensure_local_exists(c, "--config")?;
    }
    if args.threads == Some(0) {
        return Err(CliError::ZeroThreads);
    }
    Ok(args)
}

impl Args {
    /// Layer command-line values over `cfg` (defaults or a loaded file).
    pub fn apply_overrides(&self, cfg: &mut SimulationConfig) {
        fn set<T: Copy>(slot: &mut T, v: Option<T>) {
            if let Some(v) = v {
                *slot = v;
            }
        }
        set(&mut cfg.seed, self.seed);
        set(&mut cfg.candidates_per_party, self.candidates);
        set(&mut cfg.candidate_strategy, self.candidate_generator);
        set(&mut cfg.n_voters, self.nvoters);
        set(&mut cfg.uncertainty, self.uncertainty);
        set(&mut cfg.party_loyalty, self.party_loyalty);
        set(&mut cfg.quality_scale, self.quality_scale);
        set(&mut cfg.party_bonus_scale, self.party_bonus_scale);
        set(&mut cfg.wasted_vote_factor, self.wasted_vote_factor);
        set(&mut cfg.population.partisanship, self.partisanship);
        set(&mut cfg.population.stddev, self.population_stddev);
        set(&mut cfg.population.partisan_shift, self.partisan_shift);
        set(&mut cfg.primary_skew, self.primary_skew);
        set(&mut cfg.ideology_variance, self.ideology_variance);
        set(&mut cfg.quality_variance, self.quality_variance);
        set(&mut cfg.condorcet_variance, self.condorcet_variance);
        set(&mut cfg.n_condorcet, self.n_condorcet);
        set(&mut cfg.spread, self.spread);
        if !self.election_type.is_empty() {
            cfg.methods = self.election_type.clone();
        }
    }
}

/// Seed parser: decimal u64 or 0x-hex (1..=16 nybbles).
pub fn parse_seed(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("empty seed".into());
    }
    if let Some(rest) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        if rest.is_empty() || rest.len() > 16 || !rest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err("hex seed must be 1..16 hex digits".into());
        }
        u64::from_str_radix(rest, 16).map_err(|_| "hex seed out of range".into())
    } else {
        s.parse::<u64>().map_err(|_| "decimal seed must be a valid u64".into())
    }
}

/// Reject any explicit URI scheme (e.g., http://, https://, file://).
#[inline]
fn has_scheme(s: &str) -> bool {
    let lower = s.trim().to_ascii_lowercase();
    lower.contains("://") || lower.starts_with("http:") || lower.starts_with("https:") || lower.starts_with("file:")
}

#[inline]
fn ensure_local_path(p: &Path) -> Result<(), CliError> {
    if let Some(s) = p.to_str() {
        if has_scheme(s) {
            return Err(CliError::NonLocalPath(s.to_string()));
        }
    }
    Ok(())
}

fn iter_all_paths(args: &Args) -> impl Iterator<Item = &Path> {
    [Some(args.data_file.as_path()), args.config.as_deref(), Some(args.output.as_path())]
        .into_iter()
        .flatten()
}

/// Local (no scheme) and an existing regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(extra: &[&str]) -> Args {
        let mut argv = vec!["electsim", "--data-file", "districts.csv"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn seed_parser_decimal_and_hex() {
        assert_eq!(parse_seed("42").unwrap(), 42u64);
        assert_eq!(parse_seed("0x2A").unwrap(), 42u64);
        assert!(parse_seed("0x").is_err());
        assert!(parse_seed("0xFFFFFFFFFFFFFFFFF").is_err()); // 17 nybbles
        assert!(parse_seed("-1").is_err());
    }

    #[test]
    fn election_types_accept_lists_and_repeats() {
        let a = parse(&["--election-type", "irv,condorcet", "--election-type", "top-2"]);
        assert_eq!(
            a.election_type,
            vec![ElectionMethod::InstantRunoff, ElectionMethod::Condorcet, ElectionMethod::TopTwo]
        );
        assert!(Args::try_parse_from(["electsim", "--data-file", "x.csv", "--election-type", "borda"]).is_err());
    }

    #[test]
    fn flags_override_only_what_they_name() {
        let a = parse(&["--seed", "0x10", "--nvoters", "50", "--primary-skew", "0.3", "--candidate-generator", "partisan"]);
        let mut cfg = SimulationConfig { uncertainty: 0.9, ..SimulationConfig::default() };
        a.apply_overrides(&mut cfg);
        assert_eq!(cfg.seed, 16);
        assert_eq!(cfg.n_voters, 50);
        assert_eq!(cfg.primary_skew, 0.3);
        assert_eq!(cfg.candidate_strategy, CandidateStrategy::Partisan);
        assert_eq!(cfg.uncertainty, 0.9);
        assert_eq!(cfg.methods, SimulationConfig::default().methods);
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        assert!(Args::try_parse_from(["electsim", "--data-file", "x.csv", "-q", "-v"]).is_err());
        assert_eq!(parse(&["-vv"]).verbose, 2);
    }

    #[test]
    fn ensure_local_path_rejects_schemes() {
        assert!(ensure_local_path(Path::new("http://x")).is_err());
        assert!(ensure_local_path(Path::new("file://C:/x.csv")).is_err());
        assert!(ensure_local_path(Path::new("/tmp/districts.csv")).is_ok());
    }

    #[test]
    fn validation_checks_inputs_and_threads() {
        let f = tempfile::NamedTempFile::new().unwrap();
        let path = f.path().to_str().unwrap();
        let ok = Args::try_parse_from(["electsim", "--data-file", path]).unwrap();
        assert!(validate(ok).is_ok());

        let zero = Args::try_parse_from(["electsim", "--data-file", path, "--threads", "0"]).unwrap();
        assert!(matches!(validate(zero), Err(CliError::ZeroThreads)));

        let missing = parse(&[]);
        assert!(matches!(validate(missing), Err(CliError::NotFound(_))));
    }
}

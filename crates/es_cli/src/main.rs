// crates/es_cli/src/main.rs
//
// electsim: config layering → district load → batch simulation → report
// artifact + console summary. Exit codes are stable for scripts.

mod args;

mod exitcodes {
    pub const OK: i32 = 0;
    pub const VALIDATION: i32 = 2;
    pub const IO: i32 = 4;
    pub const SIMULATION: i32 = 5;
}

use std::io::IsTerminal;
use std::process::ExitCode;

use args::{parse_and_validate as parse_cli, Args, CliError};
use es_core::SimulationConfig;
use es_io::prelude::{load_config, write_canonical_file, write_pretty_file, IoError};
use es_pipeline::{load_batch, run_batch_observed_with_threads, CancelToken, PipelineError};
use es_report::{attach_digest, build_report, render_json, render_text, ReportError, ReportOptions};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug, Error)]
enum MainError {
    /// Bad config values, unparsable inputs, unknown districts
    #[error("{0}")]
    Validation(String),
    /// Missing or unreadable files, failed writes
    #[error("{0}")]
    Io(String),
    /// Nothing simulated, or the worker pool could not start
    #[error("{0}")]
    Simulation(String),
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("electsim: error: {e}");
            let rc = match e {
                CliError::NotFound(_) => exitcodes::IO,
                _ => exitcodes::VALIDATION,
            };
            return ExitCode::from(rc as u8);
        }
    };
    init_tracing(&args);

    let rc = match run(&args) {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            error!(error = %e, "electsim failed");
            map_error(&e)
        }
    };
    ExitCode::from(rc as u8)
}

/// `RUST_LOG` wins; otherwise info, warn with --quiet, debug with -v.
fn init_tracing(args: &Args) {
    let level = if args.quiet {
        "warn"
    } else if args.verbose > 0 {
        "debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("electsim: tracing subscriber already set");
    }
}

/// Defaults, then the config file, then command-line flags.
fn resolve_config(args: &Args) -> Result<SimulationConfig, MainError> {
    let mut cfg = match &args.config {
        Some(path) => load_config(path).map_err(map_io_err)?,
        None => SimulationConfig::default(),
    };
    args.apply_overrides(&mut cfg);
    Ok(cfg)
}

fn run(args: &Args) -> Result<(), MainError> {
    let cfg = resolve_config(args)?;
    let methods: Vec<&str> = cfg.methods.iter().map(|m| m.as_str()).collect();
    info!(seed = cfg.seed, methods = ?methods, strategy = %cfg.candidate_strategy, "configuration resolved");

    let input = load_batch(&args.data_file, &cfg, &args.districts).map_err(map_pipeline_err)?;

    if args.validate_only {
        info!(
            districts = input.records.len(),
            rejected = input.rejected.len(),
            "validate-only: inputs OK"
        );
        return Ok(());
    }

    let cancel = CancelToken::new();
    let on_signal = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || on_signal.cancel()) {
        warn!(error = %e, "Ctrl-C handler not installed; the batch cannot be interrupted");
    }
    let outcome = run_batch_observed_with_threads(&input.records, &cfg, &cancel, args.threads, &|d| {
        debug!(district = %d, "district finished")
    })
    .map_err(map_pipeline_err)?;
    if outcome.results.is_empty() {
        return Err(MainError::Simulation(format!(
            "no district produced a result ({} failures)",
            outcome.failures.len()
        )));
    }

    let mut report = build_report(&cfg, &outcome, &input.rejected, ReportOptions { trace: args.trace });
    attach_digest(&mut report).map_err(map_report_err)?;
    let value = render_json(&report).map_err(map_report_err)?;
    if args.canonical {
        write_canonical_file(&args.output, &value).map_err(map_io_err)?;
    } else {
        write_pretty_file(&args.output, &value).map_err(map_io_err)?;
    }
    info!(
        path = %args.output.display(),
        digest = report.report_digest.as_deref().unwrap_or(""),
        "report written"
    );
    if outcome.cancelled {
        warn!(results = outcome.results.len(), "interrupted: report covers finished districts only");
    }

    if !args.quiet {
        print!("{}", render_text(&report));
    }
    Ok(())
}

/// Map our typed errors to the exit-code table.
fn map_error(e: &MainError) -> i32 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::Io(_) => IO,
        MainError::Simulation(_) => SIMULATION,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Path(m) => MainError::Io(format!("path: {m}")),
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Csv(m) => MainError::Validation(format!("csv: {m}")),
        IoError::Config(c) => MainError::Validation(format!("config: {c}")),
        IoError::Invalid(m) => MainError::Validation(m),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        PipelineError::Io(m) => MainError::Io(m),
        PipelineError::Pool(m) => MainError::Simulation(m),
        other @ (PipelineError::Config(_)
        | PipelineError::Input(_)
        | PipelineError::UnknownDistrict(_)
        | PipelineError::NoDistricts) => MainError::Validation(other.to_string()),
    }
}

fn map_report_err(e: ReportError) -> MainError {
    MainError::Io(format!("report: {e}"))
}

// crates/sa_cli/src/main.rs
//
// load → validate → allocate (one district) or aggregate (national) → canonical artifacts.
// Exit codes: 0 ok, 2 validation/arguments, 3 not found, 4 I/O, 5 allocation.

mod args;

mod exitcodes {
    pub const OK: u8 = 0;
    pub const VALIDATION: u8 = 2;
    pub const NOT_FOUND: u8 = 3;
    pub const IO: u8 = 4;
    pub const ALLOCATION: u8 = 5;
}

use std::fmt;
use std::path::Path;
use std::process::ExitCode;

use serde::Serialize;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use args::{parse_and_validate as parse_cli, Args};

use sa_core::{
    ids::{DistrictId, ElectionYear},
    repository::Repository,
    variables::{validate_domains, Params},
};
use sa_io::{canonical_json, hasher, IoError, SnapshotStore};
use sa_pipeline::{aggregate_repo, allocate_one, validate, Diagnostic, PipelineError, ValidationReport};

/// Central error type for CLI → exit-code mapping.
#[derive(Debug)]
enum MainError {
    /// Malformed documents, parameter domains, failed audits
    Validation(String),
    /// Missing result/district, or no qualifying party in district mode
    NotFound(String),
    /// Read/write/path errors
    Io(String),
    /// Degenerate district, over-allocation, rejected tie
    Allocation(String),
}

impl fmt::Display for MainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MainError::Validation(m) => write!(f, "validation: {m}"),
            MainError::NotFound(m) => write!(f, "not found: {m}"),
            MainError::Io(m) => write!(f, "io: {m}"),
            MainError::Allocation(m) => write!(f, "allocation: {m}"),
        }
    }
}

fn main() -> ExitCode {
    let args = match parse_cli() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("seats: error: {e}");
            return ExitCode::from(exitcodes::VALIDATION);
        }
    };

    init_tracing(args.quiet);

    let outcome = if args.validate_only { validate_only(&args) } else { run_once(&args) };
    let rc = match outcome {
        Ok(()) => exitcodes::OK,
        Err(e) => {
            error!("{e}");
            map_error(&e)
        }
    };
    ExitCode::from(rc)
}

/// stderr only; stdout stays clean for scripts.
fn init_tracing(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn map_error(e: &MainError) -> u8 {
    use exitcodes::*;
    match e {
        MainError::Validation(_) => VALIDATION,
        MainError::NotFound(_) => NOT_FOUND,
        MainError::Io(_) => IO,
        MainError::Allocation(_) => ALLOCATION,
    }
}

fn map_io_err(e: IoError) -> MainError {
    match e {
        IoError::Json { pointer, msg } => MainError::Validation(format!("json {pointer}: {msg}")),
        IoError::Invalid(m) => MainError::Validation(m),
        e @ (IoError::Read { .. } | IoError::Path(_) | IoError::Hash(_)) => MainError::Io(e.to_string()),
    }
}

fn map_pipeline_err(e: PipelineError) -> MainError {
    match e {
        e @ PipelineError::NotFound { .. } => MainError::NotFound(e.to_string()),
        PipelineError::Allocate { source, .. } => MainError::Allocation(format!("{}: {source}", source.code())),
        PipelineError::Params(e) => MainError::Validation(format!("parameter domain error: {e}")),
    }
}

/// Everything read from disk, with the digests recorded in the run record.
struct Inputs {
    store: SnapshotStore,
    params: Params,
    data_sha256: String,
    params_sha256: String,
}

fn load_inputs(args: &Args) -> Result<Inputs, MainError> {
    let bytes = sa_io::read_input(&args.data).map_err(map_io_err)?;
    let data_sha256 = hasher::sha256_hex(&bytes);
    let store = sa_io::parse_snapshot(&bytes).map_err(map_io_err)?;

    let base = match &args.params {
        Some(p) => sa_io::load_params(p).map_err(map_io_err)?,
        None => Params::default(),
    };
    let params = args.apply_overrides(base).map_err(|e| MainError::Validation(e.to_string()))?;
    validate_domains(&params).map_err(|e| MainError::Validation(format!("parameter domain error: {e}")))?;
    let params_sha256 = hasher::sha256_canonical(&params).map_err(map_io_err)?;

    info!(
        districts = store.districts().len(),
        parties = store.parties().len(),
        results = store.election_results().len(),
        sha256 = %data_sha256,
        "snapshot loaded"
    );
    Ok(Inputs { store, params, data_sha256, params_sha256 })
}

/// Audit plus the duplicate result keys the loader collapsed.
fn audit(store: &SnapshotStore, year: Option<ElectionYear>) -> ValidationReport {
    let mut report = validate(store, year);
    report.extend(
        store
            .duplicate_keys()
            .iter()
            .filter(|(y, _)| year.map_or(true, |want| *y == want))
            .map(|&(y, d)| Diagnostic::duplicate_key(y, d)),
    );
    report
}

fn validate_only(args: &Args) -> Result<(), MainError> {
    let inputs = load_inputs(args)?;
    let report = audit(&inputs.store, args.year);
    info!(pass = report.pass, errors = report.errors(), warnings = report.warnings(), "validation finished");
    if report.pass {
        Ok(())
    } else {
        Err(MainError::Validation(format!("{} error(s) in snapshot", report.errors())))
    }
}

#[derive(Serialize)]
struct EngineMeta {
    name: &'static str,
    version: &'static str,
    build: &'static str,
}

impl EngineMeta {
    fn current() -> Self {
        Self {
            name: option_env!("SEATS_ENGINE_NAME").unwrap_or(env!("CARGO_PKG_NAME")),
            version: env!("CARGO_PKG_VERSION"),
            build: option_env!("SEATS_ENGINE_BUILD").unwrap_or("dev"),
        }
    }
}

#[derive(Serialize)]
struct InputDigests<'a> {
    data_sha256: &'a str,
    params_sha256: &'a str,
}

#[derive(Serialize)]
struct OutputRef {
    file: String,
    sha256: String,
}

#[derive(Serialize)]
struct RunRecord<'a> {
    engine: EngineMeta,
    inputs: InputDigests<'a>,
    params: &'a Params,
    mode: &'static str,
    year: ElectionYear,
    #[serde(skip_serializing_if = "Option::is_none")]
    district_id: Option<DistrictId>,
    validation: &'a ValidationReport,
    partial: bool,
    outputs: Vec<OutputRef>,
}

fn run_once(args: &Args) -> Result<(), MainError> {
    let year = args.year.ok_or_else(|| MainError::Validation("--year is required".into()))?;
    let inputs = load_inputs(args)?;
    let report = audit(&inputs.store, Some(year));
    if !report.pass {
        warn!(errors = report.errors(), "snapshot has validation errors; continuing");
    }

    let (mode, output, partial) = match args.district {
        Some(district_id) => ("district", run_district(args, &inputs, year, district_id)?, false),
        None => {
            let (output, partial) = run_national(args, &inputs, year)?;
            ("national", output, partial)
        }
    };

    let record = RunRecord {
        engine: EngineMeta::current(),
        inputs: InputDigests { data_sha256: &inputs.data_sha256, params_sha256: &inputs.params_sha256 },
        params: &inputs.params,
        mode,
        year,
        district_id: args.district,
        validation: &report,
        partial,
        outputs: vec![output],
    };
    write_artifact(&args.out, "run_record.json", &record)?;

    info!(out = %args.out.display(), partial, "artifacts written");
    Ok(())
}

fn run_district(args: &Args, inputs: &Inputs, year: ElectionYear, district_id: DistrictId) -> Result<OutputRef, MainError> {
    let calc = allocate_one(&inputs.store, year, district_id, &inputs.params)
        .map_err(map_pipeline_err)?
        .ok_or_else(|| MainError::NotFound(format!("no party qualifies in district {district_id} ({year})")))?;

    info!(
        district = %district_id,
        seats = calc.seats_total(),
        quota = calc.quota,
        "district allocated"
    );
    write_artifact(&args.out, &format!("district_{district_id}_{year}.json"), &calc)
}

fn run_national(args: &Args, inputs: &Inputs, year: ElectionYear) -> Result<(OutputRef, bool), MainError> {
    if inputs.store.results_for_year(year).is_empty() {
        return Err(MainError::NotFound(format!("no results for {year}")));
    }

    let report = aggregate_repo(&inputs.store, year, &inputs.params);
    if report.partial {
        warn!(diagnostics = report.diagnostics.len(), "national result is partial");
    }
    let output = write_artifact(&args.out, &format!("national_{year}.json"), &report)?;
    Ok((output, report.partial))
}

fn write_artifact<T: Serialize + ?Sized>(out_dir: &Path, name: &str, value: &T) -> Result<OutputRef, MainError> {
    let sha256 = hasher::sha256_canonical(value).map_err(map_io_err)?;
    canonical_json::write_canonical_file(&out_dir.join(name), value)
        .map_err(|e| MainError::Io(format!("write {name}: {e}")))?;
    Ok(OutputRef { file: name.to_string(), sha256 })
}

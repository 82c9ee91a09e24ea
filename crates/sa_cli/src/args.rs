// crates/sa_cli/src/args.rs
//
// Offline CLI argument surface for the seat engine.
// - No networked paths (reject any scheme:// like http/https/file)
// - --year selects the election; --district switches to single-district mode
// - --threshold-pct / --invalid-pct / --tie-policy override the params document
// - --validate-only audits the snapshot without allocating

use std::{
    env, fs,
    path::{Path, PathBuf},
};

use clap::Parser;

use sa_core::{
    ids::{DistrictId, ElectionYear},
    variables::{Params, Pct, TiePolicy},
};

/// Parsed CLI arguments (raw).
#[derive(Debug, Parser, Clone)]
#[command(
    name = "seats",
    disable_help_subcommand = true,
    about = "Offline, deterministic seat allocation for districts and national totals"
)]
pub struct Args {
    /// Snapshot JSON: provinces, districts, parties, election_results.
    #[arg(long)]
    pub data: PathBuf,

    /// Params JSON (invalid_share_pct, threshold_pct, tie_policy). Defaults apply when omitted.
    #[arg(long)]
    pub params: Option<PathBuf>,

    /// Election year.
    #[arg(long, required_unless_present = "validate_only")]
    pub year: Option<ElectionYear>,

    /// Allocate a single district instead of the national aggregate.
    #[arg(long, requires = "year")]
    pub district: Option<DistrictId>,

    /// Override the qualifying threshold (percent of valid votes).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub threshold_pct: Option<u8>,

    /// Override the invalid-vote share (percent of cast votes).
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=99))]
    pub invalid_pct: Option<u8>,

    /// deterministic_order | reject
    #[arg(long)]
    pub tie_policy: Option<TiePolicy>,

    /// Output directory (default: current directory).
    #[arg(long, default_value = ".")]
    pub out: PathBuf,

    /// Audit the snapshot only; exit 2 when the audit finds errors.
    #[arg(long)]
    pub validate_only: bool,

    /// Only warnings and errors on stderr.
    #[arg(long)]
    pub quiet: bool,
}

/// Errors surfaced by argument validation.
#[derive(Debug)]
pub enum CliError {
    NonLocalPath(String),
    NotFound(String),
    BadValue(String),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use CliError::*;
        match self {
            NonLocalPath(p) => write!(f, "path must be local file (no scheme): {p}"),
            NotFound(p) => write!(f, "file not found: {p}"),
            BadValue(s) => write!(f, "invalid value: {s}"),
        }
    }
}
impl std::error::Error for CliError {}

impl Args {
    /// Apply flag overrides on top of `base`.
    pub fn apply_overrides(&self, mut base: Params) -> Result<Params, CliError> {
        if let Some(v) = self.threshold_pct {
            base.threshold_pct = Pct::new(v).map_err(|e| CliError::BadValue(format!("--threshold-pct: {e}")))?;
        }
        if let Some(v) = self.invalid_pct {
            base.invalid_share_pct = Pct::new(v).map_err(|e| CliError::BadValue(format!("--invalid-pct: {e}")))?;
        }
        if let Some(t) = self.tie_policy {
            base.tie_policy = t;
        }
        Ok(base)
    }
}

/// Entry point used by main.rs
pub fn parse_and_validate() -> Result<Args, CliError> {
    check(Args::parse())
}

fn check(mut args: Args) -> Result<Args, CliError> {
    ensure_local_path(&args.out)?;
    ensure_local_exists(&args.data, "--data")?;
    if let Some(p) = &args.params {
        ensure_local_exists(p, "--params")?;
    }

    args.data = normalize_path(&args.data);
    args.params = args.params.take().map(|p| normalize_path(&p));
    args.out = normalize_path(&args.out);
    Ok(args)
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

/// Ensure a path is local (no scheme) and exists as a regular file.
fn ensure_local_exists(p: &Path, label: &'static str) -> Result<(), CliError> {
    ensure_local_path(p)?;
    let meta = fs::metadata(p).map_err(|_| CliError::NotFound(format!("{label} {}", p.display())))?;
    if !meta.is_file() {
        return Err(CliError::NotFound(format!("{label} {}", p.display())));
    }
    Ok(())
}

/// Best-effort absolute path; falls back to CWD-relative when the path does not exist yet.
fn normalize_path(p: &Path) -> PathBuf {
    fs::canonicalize(p).unwrap_or_else(|_| {
        if p.is_absolute() {
            p.to_path_buf()
        } else {
            env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join(p)
        }
    })
}

//! sa_pipeline: deterministic pipeline surface (validate → allocate → aggregate).
//!
//! This crate is I/O-free: it reads entity snapshots through
//! `sa_core::Repository`, delegates the seat math to `sa_algo`, and reports
//! data-quality findings as `Diagnostic`s (also logged through `tracing`).
//! Loading, hashing and file output live in `sa_io` and `sa_cli`.

#![forbid(unsafe_code)]

use thiserror::Error;

use sa_algo::AllocError;
use sa_core::{
    errors::CoreError,
    ids::{DistrictId, ElectionYear},
};

pub mod aggregate;
pub mod allocate;
pub mod diagnostics;
pub mod validate;

pub use aggregate::{aggregate, aggregate_repo, NationalReport, NationalResult, PartyNationalResult, SeatBreakdown};
pub use allocate::{allocate_keyed, allocate_one, allocate_year, results_for_year, DistrictOutcome, YearAllocation};
pub use diagnostics::{Diagnostic, Severity, Subject};
pub use validate::{validate, ValidationReport};

pub use sa_algo::{PartySeats, SeatCalculation};

/// Errors of the single-district path. The year-wide stages record
/// failures as outcomes instead of returning them.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("no result for district {district_id} in {year}")]
    NotFound { year: ElectionYear, district_id: DistrictId },

    #[error("allocation failed: {source}")]
    Allocate {
        district_id: DistrictId,
        #[source]
        source: AllocError,
    },

    #[error("invalid parameters: {0}")]
    Params(#[from] CoreError),
}

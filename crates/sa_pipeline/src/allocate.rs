//! ALLOCATE stage: run the district allocator for one district, or for every
//! district holding a result in a year.
//!
//! A failing district never stops the stage. Its outcome is recorded, a
//! diagnostic is raised and the remaining districts are still allocated.

use std::collections::BTreeMap;

use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;

use sa_algo::{allocate_district, AllocError, SeatCalculation};
use sa_core::{
    entities::{District, ElectionResult},
    ids::{DistrictId, ElectionYear},
    repository::Repository,
    variables::{validate_domains, Params},
};

use crate::diagnostics::{Diagnostic, Subject, RESULT_UNKNOWN_DISTRICT};
use crate::PipelineError;

/// What happened to one district's result.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DistrictOutcome {
    Allocated(SeatCalculation),
    /// Nobody cleared the threshold; no seats are handed out.
    NoQualifyingParty,
    Failed(AllocError),
    /// The result references a district absent from the snapshot.
    MissingDistrict,
}

impl DistrictOutcome {
    pub fn calculation(&self) -> Option<&SeatCalculation> {
        match self {
            DistrictOutcome::Allocated(c) => Some(c),
            _ => None,
        }
    }

    pub fn status(&self) -> &'static str {
        match self {
            DistrictOutcome::Allocated(_) => "allocated",
            DistrictOutcome::NoQualifyingParty => "no_qualifying_party",
            DistrictOutcome::Failed(_) => "failed",
            DistrictOutcome::MissingDistrict => "missing_district",
        }
    }

    /// Failed or missing; the district's seats are not in the national total.
    pub fn is_partial(&self) -> bool {
        matches!(self, DistrictOutcome::Failed(_) | DistrictOutcome::MissingDistrict)
    }
}

impl Serialize for DistrictOutcome {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        match self {
            DistrictOutcome::Allocated(calc) => {
                let mut st = s.serialize_struct("DistrictOutcome", 2)?;
                st.serialize_field("status", self.status())?;
                st.serialize_field("calculation", calc)?;
                st.end()
            }
            DistrictOutcome::Failed(err) => {
                let mut st = s.serialize_struct("DistrictOutcome", 3)?;
                st.serialize_field("status", self.status())?;
                st.serialize_field("code", err.code())?;
                st.serialize_field("message", &err.to_string())?;
                st.end()
            }
            DistrictOutcome::NoQualifyingParty | DistrictOutcome::MissingDistrict => {
                let mut st = s.serialize_struct("DistrictOutcome", 1)?;
                st.serialize_field("status", self.status())?;
                st.end()
            }
        }
    }
}

/// Per-district outcomes for one year plus the findings raised on the way.
#[derive(Clone, Debug, Default)]
pub struct YearAllocation {
    pub outcomes: BTreeMap<DistrictId, DistrictOutcome>,
    pub diagnostics: Vec<Diagnostic>,
}

/// The `(year, district)` lookup: `Ok(None)` when no party qualifies.
pub fn allocate_one<R: Repository + ?Sized>(
    repo: &R,
    year: ElectionYear,
    district_id: DistrictId,
    params: &Params,
) -> Result<Option<SeatCalculation>, PipelineError> {
    validate_domains(params)?;
    let result = repo.result(year, district_id).ok_or(PipelineError::NotFound { year, district_id })?;
    let district = repo.district(district_id).ok_or(PipelineError::NotFound { year, district_id })?;

    let calc = allocate_district(result, district, params)
        .map_err(|source| PipelineError::Allocate { district_id, source })?;
    if let Some(c) = &calc {
        trace_tie_breaks(c);
    }
    Ok(calc)
}

/// Results of `year`, one per district. A repeated key keeps the last entry
/// and raises `Result.DuplicateKey`.
pub fn results_for_year<'a>(
    year: ElectionYear,
    results: &'a [ElectionResult],
    diagnostics: &mut Vec<Diagnostic>,
) -> BTreeMap<DistrictId, &'a ElectionResult> {
    let mut by_district = BTreeMap::new();
    for r in results.iter().filter(|r| r.year == year) {
        if by_district.insert(r.district_id, r).is_some() {
            diagnostics.push(Diagnostic::duplicate_key(year, r.district_id));
        }
    }
    by_district
}

/// Allocate every district with a result in `year`, in ascending district id.
pub fn allocate_year(
    year: ElectionYear,
    results: &[ElectionResult],
    districts: &[District],
    params: &Params,
) -> YearAllocation {
    let mut diagnostics = Vec::new();
    let by_district = results_for_year(year, results, &mut diagnostics);
    let mut out = allocate_keyed(year, &by_district, districts, params);
    diagnostics.append(&mut out.diagnostics);
    out.diagnostics = diagnostics;
    out
}

/// Allocate results already keyed by district (see `results_for_year`).
pub fn allocate_keyed(
    year: ElectionYear,
    by_district: &BTreeMap<DistrictId, &ElectionResult>,
    districts: &[District],
    params: &Params,
) -> YearAllocation {
    let mut out = YearAllocation::default();
    let district_index: BTreeMap<DistrictId, &District> = districts.iter().map(|d| (d.id, d)).collect();

    for (&district_id, &result) in by_district {
        let subject = Subject::Result { year, district_id };
        let outcome = match district_index.get(&district_id) {
            None => {
                out.diagnostics.push(Diagnostic::warning(
                    RESULT_UNKNOWN_DISTRICT,
                    subject,
                    format!("district {district_id} is not in the snapshot; its result contributes no seats"),
                ));
                DistrictOutcome::MissingDistrict
            }
            Some(district) => match allocate_district(result, district, params) {
                Ok(Some(calc)) => {
                    trace_tie_breaks(&calc);
                    DistrictOutcome::Allocated(calc)
                }
                Ok(None) => {
                    tracing::info!(%district_id, %year, "no party reached the threshold");
                    DistrictOutcome::NoQualifyingParty
                }
                Err(err) => {
                    out.diagnostics.push(Diagnostic::error(err.code(), subject, err.to_string()));
                    DistrictOutcome::Failed(err)
                }
            },
        };
        out.outcomes.insert(district_id, outcome);
    }

    out
}

fn trace_tie_breaks(calc: &SeatCalculation) {
    if calc.bonus_tie {
        tracing::debug!(
            district_id = %calc.district_id,
            winner = ?calc.bonus_party(),
            "bonus seat decided by lowest party id among tied parties"
        );
    }
    if calc.last_seat_tie {
        tracing::debug!(
            district_id = %calc.district_id,
            "last remainder seat decided by lowest party id among equal remainders"
        );
    }
}

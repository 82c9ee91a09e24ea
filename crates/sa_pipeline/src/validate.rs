//! crates/sa_pipeline/src/validate.rs
//! Data-quality audit over the repository snapshots. Runs before allocation
//! and never blocks it; `pass` only reports whether an Error was found.
//!
//! Errors: duplicate `(year, district)` keys, results for unknown districts.
//! Warnings: declared total vs per-party sum, unknown parties, votes for a
//! party that did not register in the district, districts with no
//! proportional seats.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use sa_core::{
    entities::ElectionResult,
    ids::{DistrictId, ElectionYear},
    repository::Repository,
};

use crate::diagnostics::{
    sort_stably, Diagnostic, Subject, DISTRICT_NO_PROPORTIONAL_SEATS, RESULT_DECLARED_TOTAL_MISMATCH,
    RESULT_PARTY_NOT_CONTESTING, RESULT_UNKNOWN_DISTRICT, RESULT_UNKNOWN_PARTY,
};

/// Deterministic report: `pass` = no Error; issues in stable order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub pass: bool,
    pub issues: Vec<Diagnostic>,
}

impl ValidationReport {
    fn from_issues(mut issues: Vec<Diagnostic>) -> Self {
        sort_stably(&mut issues);
        Self { pass: !issues.iter().any(Diagnostic::is_error), issues }
    }

    /// Merge findings raised outside `validate` (e.g. by the loader).
    pub fn extend(&mut self, more: impl IntoIterator<Item = Diagnostic>) {
        let mut issues = core::mem::take(&mut self.issues);
        issues.extend(more);
        *self = Self::from_issues(issues);
    }

    pub fn errors(&self) -> usize {
        self.issues.iter().filter(|d| d.is_error()).count()
    }

    pub fn warnings(&self) -> usize {
        self.issues.len() - self.errors()
    }
}

/// Audit every result (or only those of `year`) plus all districts.
pub fn validate<R: Repository + ?Sized>(repo: &R, year: Option<ElectionYear>) -> ValidationReport {
    let mut issues = Vec::new();

    issues.extend(check_district_magnitudes(repo));

    let results: Vec<&ElectionResult> = repo
        .election_results()
        .iter()
        .filter(|r| year.map_or(true, |y| r.year == y))
        .collect();

    issues.extend(check_duplicate_keys(&results));
    for r in &results {
        issues.extend(check_result(repo, r));
    }

    ValidationReport::from_issues(issues)
}

fn check_district_magnitudes<R: Repository + ?Sized>(repo: &R) -> Vec<Diagnostic> {
    repo.districts()
        .iter()
        .filter(|d| d.proportional_seats() == 0)
        .map(|d| {
            Diagnostic::warning(
                DISTRICT_NO_PROPORTIONAL_SEATS,
                Subject::District { district_id: d.id },
                format!(
                    "district '{}' has {} seat(s); nothing is left after the bonus seat",
                    d.name, d.seats_allocated
                ),
            )
        })
        .collect()
}

fn check_duplicate_keys(results: &[&ElectionResult]) -> Vec<Diagnostic> {
    let mut seen: BTreeMap<(ElectionYear, DistrictId), usize> = BTreeMap::new();
    for r in results {
        *seen.entry(r.key()).or_default() += 1;
    }
    seen.into_iter()
        .filter(|&(_, n)| n > 1)
        .map(|((year, district_id), _)| Diagnostic::duplicate_key(year, district_id))
        .collect()
}

fn check_result<R: Repository + ?Sized>(repo: &R, r: &ElectionResult) -> Vec<Diagnostic> {
    let mut out = Vec::new();
    let subject = Subject::Result { year: r.year, district_id: r.district_id };

    if repo.district(r.district_id).is_none() {
        out.push(Diagnostic::error(
            RESULT_UNKNOWN_DISTRICT,
            subject,
            format!("result references unknown district {}", r.district_id),
        ));
    }

    if !r.declared_total_matches() {
        out.push(Diagnostic::warning(
            RESULT_DECLARED_TOTAL_MISMATCH,
            subject,
            format!(
                "declared total {} differs from per-party sum {}; the sum is used",
                r.total_votes,
                r.party_votes.sum()
            ),
        ));
    }

    let mut unknown = BTreeSet::new();
    for (party_id, votes) in r.party_votes.iter() {
        match repo.party(party_id) {
            None => {
                unknown.insert(party_id);
            }
            Some(p) if votes > 0 && !p.contests(r.district_id) => out.push(Diagnostic::warning(
                RESULT_PARTY_NOT_CONTESTING,
                subject,
                format!("party {party_id} has {votes} votes but did not register in district {}", r.district_id),
            )),
            Some(_) => {}
        }
    }
    for party_id in unknown {
        out.push(Diagnostic::warning(
            RESULT_UNKNOWN_PARTY,
            subject,
            format!("votes recorded for unknown party {party_id}"),
        ));
    }

    out
}

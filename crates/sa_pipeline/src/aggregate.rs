//! AGGREGATE stage: national party totals for one year.
//!
//! - Votes: per-party sums over every result of the year, qualifying or not.
//! - Seats: per-party sums over the districts that allocated. Failed,
//!   missing and no-qualifier districts contribute nothing.
//! - National total/invalid/valid use the declared per-result totals and are
//!   informational only.
//!
//! Invariant (when `partial` is false): `seats_total() == allocated_magnitude()`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use sa_core::{
    entities::{District, ElectionResult, Party},
    ids::{DistrictId, ElectionYear, PartyId},
    repository::Repository,
    rounding::split_invalid,
    variables::Params,
};

use crate::allocate::{allocate_keyed, results_for_year, DistrictOutcome};
use crate::diagnostics::{Diagnostic, Subject, RESULT_UNKNOWN_PARTY};

/// Where a party's national seats came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SeatBreakdown {
    /// Quota seats.
    pub first_round: u64,
    /// Largest-remainder seats.
    pub second_round: u64,
    pub bonus: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PartyNationalResult {
    pub party_id: PartyId,
    pub votes: u64,
    pub seats: u64,
    pub seat_breakdown: SeatBreakdown,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct NationalResult {
    pub year: ElectionYear,
    pub total_votes: u64,
    pub invalid_votes: u64,
    pub valid_votes: u64,
    /// In the order of the parties snapshot.
    pub party_results: Vec<PartyNationalResult>,
}

#[derive(Clone, Debug, Serialize)]
pub struct NationalReport {
    pub result: NationalResult,
    pub districts: BTreeMap<DistrictId, DistrictOutcome>,
    pub diagnostics: Vec<Diagnostic>,
    /// Some district failed or was missing, or seats were won by a party
    /// absent from the snapshot.
    pub partial: bool,
}

impl NationalReport {
    pub fn seats_total(&self) -> u64 {
        self.result.party_results.iter().map(|p| p.seats).sum()
    }

    /// Sum of `seats_allocated` over the districts that allocated.
    pub fn allocated_magnitude(&self) -> u64 {
        self.districts
            .values()
            .filter_map(DistrictOutcome::calculation)
            .map(|c| c.seats_allocated as u64)
            .sum()
    }

    pub fn party(&self, party_id: PartyId) -> Option<&PartyNationalResult> {
        self.result.party_results.iter().find(|p| p.party_id == party_id)
    }
}

pub fn aggregate(
    year: ElectionYear,
    results: &[ElectionResult],
    districts: &[District],
    parties: &[Party],
    params: &Params,
) -> NationalReport {
    let mut diagnostics = Vec::new();
    let year_results = results_for_year(year, results, &mut diagnostics);
    let alloc = allocate_keyed(year, &year_results, districts, params);
    diagnostics.extend(alloc.diagnostics);

    let total_votes = year_results.values().fold(0u64, |acc, r| acc.saturating_add(r.total_votes));
    let (invalid, valid) = split_invalid(total_votes as u128, params.invalid_share_pct);

    let mut seats: BTreeMap<PartyId, SeatBreakdown> = BTreeMap::new();
    let mut partial = alloc.outcomes.values().any(DistrictOutcome::is_partial);
    let known: BTreeSet<PartyId> = parties.iter().map(|p| p.id).collect();

    // Every tally entry for a party outside the snapshot is reported; lost
    // seats additionally make the report partial.
    for (&district_id, r) in &year_results {
        for (party_id, votes) in r.party_votes.iter().filter(|(p, _)| !known.contains(p)) {
            let won = alloc
                .outcomes
                .get(&district_id)
                .and_then(DistrictOutcome::calculation)
                .and_then(|c| c.find(party_id))
                .map_or(0, |row| row.total_seats);
            let message = if won > 0 {
                partial = true;
                format!(
                    "party {party_id} has {votes} vote(s) and won {won} seat(s) but is not in the snapshot; \
                     they are left out of the national total"
                )
            } else {
                format!("party {party_id} has {votes} vote(s) but is not in the snapshot; they are left out of the national total")
            };
            diagnostics.push(Diagnostic::warning(RESULT_UNKNOWN_PARTY, Subject::Result { year, district_id }, message));
        }
    }

    for outcome in alloc.outcomes.values() {
        let Some(calc) = outcome.calculation() else { continue };
        for row in &calc.parties {
            let b = seats.entry(row.party_id).or_default();
            b.first_round += row.initial_seats as u64;
            b.second_round += row.remainder_seats as u64;
            b.bonus += row.bonus_seat as u64;
        }
    }

    let party_results = parties
        .iter()
        .map(|p| {
            let votes = year_results
                .values()
                .fold(0u64, |acc, r| acc.saturating_add(r.party_votes.get(p.id)));
            let seat_breakdown = seats.get(&p.id).copied().unwrap_or_default();
            PartyNationalResult {
                party_id: p.id,
                votes,
                seats: seat_breakdown.first_round + seat_breakdown.second_round + seat_breakdown.bonus,
                seat_breakdown,
            }
        })
        .collect();

    tracing::info!(
        %year,
        districts = alloc.outcomes.len(),
        partial,
        "national aggregation complete"
    );

    NationalReport {
        result: NationalResult {
            year,
            total_votes,
            invalid_votes: invalid as u64,
            valid_votes: valid as u64,
            party_results,
        },
        districts: alloc.outcomes,
        diagnostics,
        partial,
    }
}

/// `aggregate` over the repository's snapshots.
pub fn aggregate_repo<R: Repository + ?Sized>(repo: &R, year: ElectionYear, params: &Params) -> NationalReport {
    aggregate(year, repo.election_results(), repo.districts(), repo.parties(), params)
}

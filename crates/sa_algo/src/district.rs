// crates/sa_algo/src/district.rs
//
// One district end to end:
//   degenerate guard → vote split → threshold → quota round → bonus seat → leftovers.
//
// Order of checks:
// - `seats_allocated <= 1` is rejected before anything else, even for an empty tally.
// - No qualifying party is `Ok(None)`, not an error.
// - A zero quota is rejected after qualification (only a district with
//   qualifiers can get that far).
// - Ties are always resolved by ascending `PartyId`; under `TiePolicy::Reject`
//   any tie that decides a seat is returned as an error instead.

use core::fmt;
use std::collections::BTreeMap;

use sa_core::{
    entities::{District, ElectionResult},
    ids::{DistrictId, PartyId},
    variables::{Params, TiePolicy},
};

use crate::allocation::{distribute_leftovers, floors_and_remainders, hare_quota, top_by_votes};
use crate::threshold::{min_qualifying_votes, qualifying_parties, split_votes};
use crate::{PartySeats, SeatCalculation};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DegenerateReason {
    /// Magnitude leaves nothing after the bonus seat.
    NoProportionalSeats { seats_allocated: u32 },
    /// Fewer valid votes than proportional seats.
    ZeroQuota { valid_votes: u64, proportional_seats: u32 },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TieStage {
    Bonus,
    Remainder,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AllocError {
    DegenerateDistrict { district_id: DistrictId, reason: DegenerateReason },
    /// Quota seats exceed the proportional seats.
    FirstRoundOverAllocation { district_id: DistrictId, allocated: u64, available: u32 },
    /// A tie decided a seat and the policy is `Reject`.
    UnresolvedTie { district_id: DistrictId, stage: TieStage, parties: Vec<PartyId> },
    /// Per-party votes sum past `u64::MAX`.
    TallyOverflow { district_id: DistrictId },
}

impl AllocError {
    pub fn district_id(&self) -> DistrictId {
        match self {
            AllocError::DegenerateDistrict { district_id, .. }
            | AllocError::FirstRoundOverAllocation { district_id, .. }
            | AllocError::UnresolvedTie { district_id, .. }
            | AllocError::TallyOverflow { district_id } => *district_id,
        }
    }

    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            AllocError::DegenerateDistrict { .. } => "Allocate.DegenerateDistrict",
            AllocError::FirstRoundOverAllocation { .. } => "Allocate.FirstRoundOverAllocation",
            AllocError::UnresolvedTie { .. } => "Allocate.UnresolvedTie",
            AllocError::TallyOverflow { .. } => "Allocate.TallyOverflow",
        }
    }
}

impl fmt::Display for TieStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TieStage::Bonus => "bonus seat",
            TieStage::Remainder => "last remainder seat",
        })
    }
}

impl fmt::Display for AllocError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AllocError::DegenerateDistrict { district_id, reason } => match reason {
                DegenerateReason::NoProportionalSeats { seats_allocated } => write!(
                    f,
                    "district {district_id}: {seats_allocated} seat(s) leaves no proportional seats after the bonus seat"
                ),
                DegenerateReason::ZeroQuota { valid_votes, proportional_seats } => write!(
                    f,
                    "district {district_id}: quota is zero ({valid_votes} valid votes for {proportional_seats} seats)"
                ),
            },
            AllocError::FirstRoundOverAllocation { district_id, allocated, available } => write!(
                f,
                "district {district_id}: quota round allocated {allocated} seats but only {available} are available"
            ),
            AllocError::UnresolvedTie { district_id, stage, parties } => {
                write!(f, "district {district_id}: unresolved tie for the {stage} between parties ")?;
                for (i, p) in parties.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{p}")?;
                }
                Ok(())
            }
            AllocError::TallyOverflow { district_id } => {
                write!(f, "district {district_id}: vote tally overflows u64")
            }
        }
    }
}

impl std::error::Error for AllocError {}

/// Allocate `district.seats_allocated` seats from `result.party_votes`.
///
/// `result.district_id` is expected to match `district.id`; errors carry the
/// district's id.
pub fn allocate_district(
    result: &ElectionResult,
    district: &District,
    params: &Params,
) -> Result<Option<SeatCalculation>, AllocError> {
    let district_id = district.id;
    let proportional = district.proportional_seats();
    if proportional == 0 {
        return Err(AllocError::DegenerateDistrict {
            district_id,
            reason: DegenerateReason::NoProportionalSeats { seats_allocated: district.seats_allocated },
        });
    }

    let split = split_votes(&result.party_votes, params.invalid_share_pct)
        .ok_or(AllocError::TallyOverflow { district_id })?;

    let qualified = qualifying_parties(&result.party_votes, split.valid, params.threshold_pct);
    let Some(bonus) = top_by_votes(&qualified) else {
        return Ok(None);
    };

    let quota = hare_quota(split.valid, proportional).ok_or(AllocError::DegenerateDistrict {
        district_id,
        reason: DegenerateReason::ZeroQuota { valid_votes: split.valid, proportional_seats: proportional },
    })?;

    let (floors, remainders) = floors_and_remainders(&qualified, quota);
    let first_round: u64 = floors.values().map(|&s| s as u64).sum();
    if first_round > proportional as u64 {
        return Err(AllocError::FirstRoundOverAllocation {
            district_id,
            allocated: first_round,
            available: proportional,
        });
    }

    if bonus.is_tie() && params.tie_policy == TiePolicy::Reject {
        return Err(AllocError::UnresolvedTie { district_id, stage: TieStage::Bonus, parties: bonus.tied });
    }

    // Bounded by `proportional` above.
    let remaining = proportional - first_round as u32;
    let leftovers = distribute_leftovers(remaining, &remainders);
    if !leftovers.cutoff_tie.is_empty() && params.tie_policy == TiePolicy::Reject {
        return Err(AllocError::UnresolvedTie {
            district_id,
            stage: TieStage::Remainder,
            parties: leftovers.cutoff_tie,
        });
    }

    let parties = qualified
        .iter()
        .map(|(&party_id, &votes)| {
            let initial_seats = floors.get(&party_id).copied().unwrap_or(0);
            let bonus_seat = u32::from(party_id == bonus.winner);
            let remainder_seats = leftovers.awarded.get(&party_id).copied().unwrap_or(0);
            PartySeats {
                party_id,
                votes,
                initial_seats,
                remainder: remainders.get(&party_id).copied().unwrap_or(0),
                bonus_seat,
                remainder_seats,
                total_seats: initial_seats + bonus_seat + remainder_seats,
            }
        })
        .collect();

    Ok(Some(SeatCalculation {
        district_id,
        seats_allocated: district.seats_allocated,
        proportional_seats: proportional,
        total_votes: split.total,
        invalid_votes: split.invalid,
        valid_votes: split.valid,
        min_qualifying_votes: min_qualifying_votes(split.valid, params.threshold_pct),
        quota,
        remaining_seats: remaining,
        bonus_tie: bonus.is_tie(),
        last_seat_tie: !leftovers.cutoff_tie.is_empty(),
        parties,
    }))
}

/// Convenience for callers holding only ids and votes.
pub fn allocate_tally(
    district: &District,
    votes: BTreeMap<PartyId, u64>,
    params: &Params,
) -> Result<Option<SeatCalculation>, AllocError> {
    let result = ElectionResult {
        year: sa_core::ids::ElectionYear::new(0),
        district_id: district.id,
        total_votes: votes.values().copied().fold(0u64, u64::saturating_add),
        party_votes: votes.into_iter().collect(),
    };
    allocate_district(&result, district, params)
}

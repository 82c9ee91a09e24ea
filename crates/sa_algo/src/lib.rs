// crates/sa_algo/src/lib.rs
#![forbid(unsafe_code)]

//! Seat allocation for one district: invalid/valid split, qualifying
//! threshold, quota seats, one bonus seat for the plurality party, and
//! largest-remainder seats for whatever the quota leaves over.
//!
//! Everything here is pure integer arithmetic over borrowed snapshots.

#[cfg(feature = "serde")]
use serde::Serialize;

pub use sa_core::{
    ids::{DistrictId, PartyId},
    variables::{Params, TiePolicy},
};

// ----------------------------- Per-district output -----------------------------------

/// Seat record for one qualifying party.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct PartySeats {
    pub party_id: PartyId,
    pub votes: u64,
    /// `floor(votes / quota)`.
    pub initial_seats: u32,
    /// `votes mod quota`.
    pub remainder: u64,
    /// 1 for the plurality party, else 0.
    pub bonus_seat: u32,
    /// Largest-remainder seats. At most 1 unless the quota round left more
    /// seats than there are qualifying parties.
    pub remainder_seats: u32,
    pub total_seats: u32,
}

/// Full allocation trace for one `(ElectionResult, District)` pair.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize))]
pub struct SeatCalculation {
    pub district_id: DistrictId,
    pub seats_allocated: u32,
    pub proportional_seats: u32,
    /// Sum of the per-party breakdown (the declared total is not used here).
    pub total_votes: u64,
    pub invalid_votes: u64,
    pub valid_votes: u64,
    /// Smallest vote count that clears the threshold.
    pub min_qualifying_votes: u64,
    pub quota: u64,
    /// Seats left after the quota round, handed out by largest remainder.
    pub remaining_seats: u32,
    /// A tie on votes decided the bonus seat.
    pub bonus_tie: bool,
    /// A tie on remainders decided the last remainder seat.
    pub last_seat_tie: bool,
    /// Qualifying parties in ascending `PartyId`.
    pub parties: Vec<PartySeats>,
}

impl SeatCalculation {
    pub fn find(&self, party: PartyId) -> Option<&PartySeats> {
        self.parties.iter().find(|p| p.party_id == party)
    }

    pub fn seats_total(&self) -> u64 {
        self.parties.iter().map(|p| p.total_seats as u64).sum()
    }

    pub fn bonus_party(&self) -> Option<PartyId> {
        self.parties.iter().find(|p| p.bonus_seat > 0).map(|p| p.party_id)
    }
}

// ----------------------------- Stages ------------------------------------------------

pub mod threshold;

pub mod allocation {
    pub mod bonus;
    pub mod largest_remainder;

    pub use bonus::{top_by_votes, BonusPick};
    pub use largest_remainder::{distribute_leftovers, floors_and_remainders, hare_quota, LeftoverAward};
}

pub mod district;

pub use district::{allocate_district, allocate_tally, AllocError, DegenerateReason, TieStage};
pub use threshold::{qualifying_parties, split_votes, VoteSplit};

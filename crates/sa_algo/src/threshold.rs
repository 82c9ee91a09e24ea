//! Vote split and qualifying threshold.
//!
//! - `invalid = floor(total * invalid_pct / 100)`, `valid = total - invalid`.
//! - A party qualifies iff `votes >= valid * threshold_pct / 100` (non-strict),
//!   evaluated as `100 * votes >= threshold_pct * valid`, and it has at least
//!   one vote. An all-zero tally therefore has no qualifying party.

use std::collections::BTreeMap;

use sa_core::{
    entities::VoteTally,
    ids::PartyId,
    rounding::{meets_share, split_invalid},
    variables::Pct,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoteSplit {
    pub total: u64,
    pub invalid: u64,
    pub valid: u64,
}

/// Split the per-party sum into invalid/valid. `None` if the sum exceeds `u64`.
pub fn split_votes(tally: &VoteTally, invalid_pct: Pct) -> Option<VoteSplit> {
    let total = u64::try_from(tally.sum()).ok()?;
    let (invalid, valid) = split_invalid(total as u128, invalid_pct);
    // Both are bounded by `total`.
    Some(VoteSplit { total, invalid: invalid as u64, valid: valid as u64 })
}

#[inline]
pub fn qualifies(votes: u64, valid: u64, threshold_pct: Pct) -> bool {
    votes > 0 && meets_share(votes as u128, valid as u128, threshold_pct)
}

/// Parties clearing the threshold, keyed (and therefore ordered) by `PartyId`.
pub fn qualifying_parties(tally: &VoteTally, valid: u64, threshold_pct: Pct) -> BTreeMap<PartyId, u64> {
    tally
        .iter()
        .filter(|&(_, v)| qualifies(v, valid, threshold_pct))
        .collect()
}

/// Smallest vote count for which `qualifies` holds: `max(1, ceil(valid * pct / 100))`.
pub fn min_qualifying_votes(valid: u64, threshold_pct: Pct) -> u64 {
    let num = (valid as u128) * (threshold_pct.as_u8() as u128);
    (num.div_ceil(100) as u64).max(1)
}

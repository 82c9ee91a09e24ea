//! Bonus seat: one extra seat for the qualifying party with the most votes.
//!
//! Scans in ascending `PartyId`; the first party at the maximum is the
//! deterministic winner and every party sharing that maximum is reported so
//! the caller can apply its tie policy.

use std::collections::BTreeMap;

use sa_core::ids::PartyId;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BonusPick {
    pub winner: PartyId,
    pub votes: u64,
    /// All parties at the maximum, ascending. Length 1 when there is no tie.
    pub tied: Vec<PartyId>,
}

impl BonusPick {
    #[inline]
    pub fn is_tie(&self) -> bool {
        self.tied.len() > 1
    }
}

/// Plurality pick among `qualified`; `None` for an empty map.
pub fn top_by_votes(qualified: &BTreeMap<PartyId, u64>) -> Option<BonusPick> {
    let mut max_val: u64 = 0;
    let mut tied: Vec<PartyId> = Vec::new();

    for (&id, &v) in qualified {
        if tied.is_empty() || v > max_val {
            max_val = v;
            tied.clear();
            tied.push(id);
        } else if v == max_val {
            tied.push(id);
        }
    }

    let winner = *tied.first()?;
    Some(BonusPick { winner, votes: max_val, tied })
}

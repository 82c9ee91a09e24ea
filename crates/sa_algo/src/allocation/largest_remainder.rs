//! Quota seats and largest-remainder leftovers for the proportional part of a
//! district (magnitude minus the bonus seat).
//!
//! Contract:
//! - Thresholding happens upstream; `scores` holds qualifying parties only.
//! - Quota is Hare on valid votes: `floor(valid / proportional_seats)`. A zero
//!   seat count or a zero quota is reported as `None`; callers treat it as a
//!   degenerate district instead of dividing.
//! - Floors are `v / q`; remainders are `v % q`.
//! - Leftover seats go by ranking `remainder ↓, PartyId ↑`. If there are more
//!   leftovers than parties the ranking is reused cyclically.

use std::collections::BTreeMap;

use sa_core::ids::PartyId;

/// `floor(valid / seats)`, or `None` when `seats == 0` or the quota would be 0.
pub fn hare_quota(valid: u64, seats: u32) -> Option<u64> {
    if seats == 0 {
        return None;
    }
    match valid / seats as u64 {
        0 => None,
        q => Some(q),
    }
}

/// Floors and remainders per party for a non-zero quota.
pub fn floors_and_remainders(
    scores: &BTreeMap<PartyId, u64>,
    quota: u64,
) -> (BTreeMap<PartyId, u32>, BTreeMap<PartyId, u64>) {
    debug_assert!(quota > 0, "quota must be positive");
    let mut floors = BTreeMap::new();
    let mut rems = BTreeMap::new();

    for (&id, &v) in scores {
        let f = v / quota;
        // Saturate; the caller's over-allocation check catches anything this large.
        floors.insert(id, u32::try_from(f).unwrap_or(u32::MAX));
        rems.insert(id, v % quota);
    }

    (floors, rems)
}

/// Leftover seats per party plus the contenders of a tie at the cut-off.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LeftoverAward {
    pub awarded: BTreeMap<PartyId, u32>,
    /// Parties sharing the remainder of the last awarded seat with at least
    /// one party that missed out. Empty when the cut-off was clean.
    pub cutoff_tie: Vec<PartyId>,
}

/// Hand out `extra` seats by largest remainder.
pub fn distribute_leftovers(extra: u32, remainders: &BTreeMap<PartyId, u64>) -> LeftoverAward {
    let mut out = LeftoverAward::default();
    if extra == 0 || remainders.is_empty() {
        return out;
    }

    let mut ranking: Vec<(PartyId, u64)> = remainders.iter().map(|(&id, &r)| (id, r)).collect();
    // r desc, then PartyId asc
    ranking.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let n = ranking.len();
    let full_rounds = extra as usize / n;
    let partial = extra as usize % n;

    for (i, &(id, _)) in ranking.iter().enumerate() {
        let seats = full_rounds + usize::from(i < partial);
        if seats > 0 {
            out.awarded.insert(id, seats as u32);
        }
    }

    // Only a partial last pass can split a group of equal remainders.
    if partial > 0 {
        let cut = ranking[partial - 1].1;
        if ranking[partial].1 == cut {
            out.cutoff_tie = ranking.iter().filter(|&&(_, r)| r == cut).map(|&(id, _)| id).collect();
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pid(n: u32) -> PartyId {
        PartyId::new(n)
    }

    fn map(xs: &[(u32, u64)]) -> BTreeMap<PartyId, u64> {
        xs.iter().map(|&(p, v)| (pid(p), v)).collect()
    }

    #[test]
    fn quota_guards_zero_divisor_and_zero_quota() {
        assert_eq!(hare_quota(9_500, 4), Some(2_375));
        assert_eq!(hare_quota(9_500, 0), None);
        assert_eq!(hare_quota(3, 4), None);
        assert_eq!(hare_quota(4, 4), Some(1));
    }

    #[test]
    fn floors_and_remainders_example() {
        let (f, r) = floors_and_remainders(&map(&[(1, 6000), (2, 3000), (3, 1000)]), 2_375);
        assert_eq!(f[&pid(1)], 2);
        assert_eq!(f[&pid(2)], 1);
        assert_eq!(f[&pid(3)], 0);
        assert_eq!(r[&pid(1)], 1_250);
        assert_eq!(r[&pid(2)], 625);
        assert_eq!(r[&pid(3)], 1_000);
    }

    #[test]
    fn largest_remainder_wins_leftover() {
        let a = distribute_leftovers(1, &map(&[(1, 1_250), (2, 625), (3, 1_000)]));
        assert_eq!(a.awarded.get(&pid(1)), Some(&1));
        assert_eq!(a.awarded.len(), 1);
        assert!(a.cutoff_tie.is_empty());
    }

    #[test]
    fn equal_remainders_at_cutoff_go_to_lowest_id_and_are_reported() {
        let a = distribute_leftovers(1, &map(&[(4, 300), (2, 300), (9, 10)]));
        assert_eq!(a.awarded.get(&pid(2)), Some(&1));
        assert!(a.awarded.get(&pid(4)).is_none());
        assert_eq!(a.cutoff_tie, vec![pid(2), pid(4)]);
    }

    #[test]
    fn equal_remainders_fully_inside_the_cut_are_not_a_tie() {
        let a = distribute_leftovers(2, &map(&[(4, 300), (2, 300), (9, 10)]));
        assert_eq!(a.awarded.values().sum::<u32>(), 2);
        assert!(a.cutoff_tie.is_empty());
    }

    #[test]
    fn more_leftovers_than_parties_cycle_through_the_ranking() {
        let a = distribute_leftovers(5, &map(&[(1, 50), (2, 70)]));
        assert_eq!(a.awarded[&pid(2)], 3);
        assert_eq!(a.awarded[&pid(1)], 2);
        assert!(a.cutoff_tie.is_empty());
    }

    #[test]
    fn nothing_to_distribute() {
        assert_eq!(distribute_leftovers(0, &map(&[(1, 5)])), LeftoverAward::default());
        assert_eq!(distribute_leftovers(3, &BTreeMap::new()), LeftoverAward::default());
    }
}

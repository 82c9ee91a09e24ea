//! crates/sa_core/src/entities.rs
//! Entity snapshots read by the engine. The engine never mutates these; the
//! owning store (see `sa_io::store`) is the only writer.

use std::collections::{btree_map, BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::ids::{DistrictId, ElectionYear, PartyId, ProvinceId};

/// Province with its declared number of districts (informational).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Province {
    pub id: ProvinceId,
    pub name: String,
    #[cfg_attr(feature = "serde", serde(default))]
    pub district_count: u32,
}

/// Electoral district. `seats_allocated` is the district magnitude and
/// includes the bonus seat.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct District {
    pub id: DistrictId,
    pub province_id: ProvinceId,
    pub name: String,
    pub seats_allocated: u32,
}

impl District {
    /// Seats left for quota/remainder distribution once the bonus seat is reserved.
    #[inline]
    pub fn proportional_seats(&self) -> u32 {
        self.seats_allocated.saturating_sub(1)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Party {
    pub id: PartyId,
    pub name: String,
    pub color: String,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub logo: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub selected_districts: BTreeSet<DistrictId>,
}

impl Party {
    /// True if the party registered a list in `district`.
    #[inline]
    pub fn contests(&self, district: DistrictId) -> bool {
        self.selected_districts.contains(&district)
    }
}

/// Votes per party in one district. Keys are unique and always iterate in
/// ascending `PartyId`, independent of how the source stored them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct VoteTally(BTreeMap<PartyId, u64>);

impl VoteTally {
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Set the count for `party`, returning the previous one.
    pub fn insert(&mut self, party: PartyId, votes: u64) -> Option<u64> {
        self.0.insert(party, votes)
    }

    /// Votes for `party`; absent parties count as zero.
    #[inline]
    pub fn get(&self, party: PartyId) -> u64 {
        self.0.get(&party).copied().unwrap_or(0)
    }

    #[inline]
    pub fn contains(&self, party: PartyId) -> bool {
        self.0.contains_key(&party)
    }

    pub fn iter(&self) -> impl Iterator<Item = (PartyId, u64)> + '_ {
        self.0.iter().map(|(&p, &v)| (p, v))
    }

    pub fn parties(&self) -> impl Iterator<Item = PartyId> + '_ {
        self.0.keys().copied()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sum of all per-party counts (u128 so no tally can overflow it).
    pub fn sum(&self) -> u128 {
        self.0.values().map(|&v| v as u128).sum()
    }
}

impl FromIterator<(PartyId, u64)> for VoteTally {
    fn from_iter<I: IntoIterator<Item = (PartyId, u64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a VoteTally {
    type Item = (&'a PartyId, &'a u64);
    type IntoIter = btree_map::Iter<'a, PartyId, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// One district's result for one year. `total_votes` is the independently
/// declared figure; allocation always works from `party_votes.sum()`.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ElectionResult {
    pub year: ElectionYear,
    pub district_id: DistrictId,
    pub total_votes: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub party_votes: VoteTally,
}

impl ElectionResult {
    /// Store key; at most one result exists per key.
    #[inline]
    pub fn key(&self) -> (ElectionYear, DistrictId) {
        (self.year, self.district_id)
    }

    /// Whether the declared total agrees with the per-party breakdown.
    pub fn declared_total_matches(&self) -> bool {
        self.total_votes as u128 == self.party_votes.sum()
    }
}

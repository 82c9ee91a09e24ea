//! In-memory entity store. Implements `Repository` for the engine and offers
//! the write side the administration collaborator needs.
//!
//! Keys: provinces, districts and parties by id; results by `(year, district)`.
//! A write with an existing key replaces the entry in place, so a reader never
//! sees two entries under one key.

use sa_core::{
    entities::{District, ElectionResult, Party, Province},
    ids::{DistrictId, ElectionYear},
    repository::Repository,
};

#[derive(Clone, Debug, Default)]
pub struct SnapshotStore {
    provinces: Vec<Province>,
    districts: Vec<District>,
    parties: Vec<Party>,
    results: Vec<ElectionResult>,
    /// Result keys seen more than once while building from a document.
    duplicates: Vec<(ElectionYear, DistrictId)>,
}

fn upsert_by<T>(items: &mut Vec<T>, item: T, same: impl Fn(&T, &T) -> bool) -> Option<T> {
    match items.iter().position(|x| same(x, &item)) {
        Some(i) => Some(core::mem::replace(&mut items[i], item)),
        None => {
            items.push(item);
            None
        }
    }
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from loaded collections. Repeated keys collapse last-write-wins;
    /// repeated result keys are remembered for `duplicate_keys`.
    pub fn from_parts(
        provinces: Vec<Province>,
        districts: Vec<District>,
        parties: Vec<Party>,
        results: Vec<ElectionResult>,
    ) -> Self {
        let mut store = Self::new();
        for p in provinces {
            store.upsert_province(p);
        }
        for d in districts {
            store.upsert_district(d);
        }
        for p in parties {
            store.upsert_party(p);
        }
        for r in results {
            let key = r.key();
            if store.upsert_result(r).is_some() && !store.duplicates.contains(&key) {
                store.duplicates.push(key);
            }
        }
        store.duplicates.sort_unstable();
        store
    }

    /// Insert or replace the result under `(year, district_id)`; returns the replaced one.
    pub fn upsert_result(&mut self, result: ElectionResult) -> Option<ElectionResult> {
        upsert_by(&mut self.results, result, |a, b| a.key() == b.key())
    }

    pub fn remove_result(&mut self, year: ElectionYear, district_id: DistrictId) -> Option<ElectionResult> {
        let i = self.results.iter().position(|r| r.key() == (year, district_id))?;
        Some(self.results.remove(i))
    }

    pub fn upsert_district(&mut self, district: District) -> Option<District> {
        upsert_by(&mut self.districts, district, |a, b| a.id == b.id)
    }

    pub fn upsert_party(&mut self, party: Party) -> Option<Party> {
        upsert_by(&mut self.parties, party, |a, b| a.id == b.id)
    }

    pub fn upsert_province(&mut self, province: Province) -> Option<Province> {
        upsert_by(&mut self.provinces, province, |a, b| a.id == b.id)
    }

    /// Result keys that appeared more than once in the source, ascending.
    pub fn duplicate_keys(&self) -> &[(ElectionYear, DistrictId)] {
        &self.duplicates
    }
}

impl Repository for SnapshotStore {
    fn provinces(&self) -> &[Province] {
        &self.provinces
    }

    fn districts(&self) -> &[District] {
        &self.districts
    }

    fn parties(&self) -> &[Party] {
        &self.parties
    }

    fn election_results(&self) -> &[ElectionResult] {
        &self.results
    }
}

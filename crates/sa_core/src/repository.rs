//! Read contract between the engine and whatever store owns the entities.
//!
//! Implementors hand out borrowed snapshots; the engine never retains them
//! across calls and never writes through this trait.

use crate::entities::{District, ElectionResult, Party, Province};
use crate::ids::{DistrictId, ElectionYear, PartyId};

pub trait Repository {
    fn provinces(&self) -> &[Province];
    fn districts(&self) -> &[District];
    fn parties(&self) -> &[Party];
    fn election_results(&self) -> &[ElectionResult];

    fn district(&self, id: DistrictId) -> Option<&District> {
        self.districts().iter().find(|d| d.id == id)
    }

    fn party(&self, id: PartyId) -> Option<&Party> {
        self.parties().iter().find(|p| p.id == id)
    }

    /// The result under `(year, district)`. A store that holds the key more
    /// than once answers with the last entry (last write wins).
    fn result(&self, year: ElectionYear, district: DistrictId) -> Option<&ElectionResult> {
        self.election_results()
            .iter()
            .rev()
            .find(|r| r.year == year && r.district_id == district)
    }

    fn results_for_year(&self, year: ElectionYear) -> Vec<&ElectionResult> {
        self.election_results().iter().filter(|r| r.year == year).collect()
    }

    /// Years with at least one result, ascending and deduplicated.
    fn years(&self) -> Vec<ElectionYear> {
        let mut ys: Vec<ElectionYear> = self.election_results().iter().map(|r| r.year).collect();
        ys.sort_unstable();
        ys.dedup();
        ys
    }
}

//! Loader: read the local snapshot and params JSON documents into typed
//! values. No network I/O; URL-like paths are rejected and inputs are capped
//! at `MAX_INPUT_BYTES`.
//!
//! Snapshot document:
//! `{ "provinces": [..], "districts": [..], "parties": [..], "election_results": [..] }`
//! Every array is optional and defaults to empty.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};

use sa_core::{
    entities::{District, ElectionResult, Party, Province},
    variables::{validate_domains, Params},
};

use crate::{looks_like_url_strict, store::SnapshotStore, IoError};

pub const MAX_INPUT_BYTES: u64 = 64 * 1024 * 1024;

/// On-wire snapshot shape.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SnapshotDoc {
    pub provinces: Vec<Province>,
    pub districts: Vec<District>,
    pub parties: Vec<Party>,
    pub election_results: Vec<ElectionResult>,
}

impl From<SnapshotDoc> for SnapshotStore {
    fn from(doc: SnapshotDoc) -> Self {
        SnapshotStore::from_parts(doc.provinces, doc.districts, doc.parties, doc.election_results)
    }
}

/// Read a local file, refusing URLs and anything larger than `MAX_INPUT_BYTES`.
pub fn read_input(path: &Path) -> Result<Vec<u8>, IoError> {
    let shown = path.display().to_string();
    if looks_like_url_strict(&shown) {
        return Err(IoError::Invalid(format!("{shown}: only local files are accepted")));
    }

    let f = File::open(path).map_err(|source| IoError::Read { path: shown.clone(), source })?;
    let mut buf = Vec::new();
    f.take(MAX_INPUT_BYTES + 1)
        .read_to_end(&mut buf)
        .map_err(|source| IoError::Read { path: shown.clone(), source })?;

    if buf.len() as u64 > MAX_INPUT_BYTES {
        return Err(IoError::Invalid(format!("{shown}: larger than {MAX_INPUT_BYTES} bytes")));
    }
    Ok(buf)
}

pub fn parse_snapshot(bytes: &[u8]) -> Result<SnapshotStore, IoError> {
    let doc: SnapshotDoc = serde_json::from_slice(bytes)?;
    Ok(doc.into())
}

pub fn load_snapshot(path: &Path) -> Result<SnapshotStore, IoError> {
    parse_snapshot(&read_input(path)?)
}

/// Parse a params document; missing fields take the defaults.
pub fn parse_params(bytes: &[u8]) -> Result<Params, IoError> {
    let params: Params = serde_json::from_slice(bytes)?;
    validate_domains(&params).map_err(|e| IoError::Invalid(format!("parameter domain error: {e}")))?;
    Ok(params)
}

pub fn load_params(path: &Path) -> Result<Params, IoError> {
    parse_params(&read_input(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_json_diff::assert_json_eq;
    use sa_core::ids::{DistrictId, ElectionYear, PartyId};
    use sa_core::repository::Repository;
    use sa_core::variables::TiePolicy;
    use serde_json::json;

    const SNAPSHOT: &str = r##"{
        "provinces": [{ "id": 1, "name": "Coast", "district_count": 2 }],
        "districts": [
            { "id": 10, "province_id": 1, "name": "North", "seats_allocated": 5 },
            { "id": 11, "province_id": 1, "name": "South", "seats_allocated": 3 }
        ],
        "parties": [
            { "id": 1, "name": "Alpha", "color": "#ff0000", "selected_districts": [10, 11] },
            { "id": 2, "name": "Beta", "color": "#00ff00", "logo": "beta.png", "selected_districts": [10] }
        ],
        "election_results": [
            { "year": 2024, "district_id": 10, "total_votes": 10000, "party_votes": { "1": 6000, "2": 4000 } },
            { "year": 2024, "district_id": 11, "total_votes": 900, "party_votes": { "1": 900 } }
        ]
    }"##;

    #[test]
    fn parses_full_snapshot() {
        let store = parse_snapshot(SNAPSHOT.as_bytes()).unwrap();
        assert_eq!(store.provinces().len(), 1);
        assert_eq!(store.districts().len(), 2);
        let beta = store.party(PartyId::new(2)).unwrap();
        assert_eq!(beta.logo.as_deref(), Some("beta.png"));
        assert!(beta.contests(DistrictId::new(10)));
        let r = store.result(ElectionYear::new(2024), DistrictId::new(10)).unwrap();
        assert_eq!(r.party_votes.get(PartyId::new(1)), 6000);
        assert!(r.declared_total_matches());
    }

    #[test]
    fn missing_arrays_default_to_empty() {
        let store = parse_snapshot(br#"{"districts": []}"#).unwrap();
        assert!(store.election_results().is_empty());
        assert!(store.parties().is_empty());
    }

    #[test]
    fn malformed_snapshot_is_a_json_error() {
        let err = parse_snapshot(br#"{"districts": [{"id": "x"}]}"#).unwrap_err();
        assert!(matches!(err, IoError::Json { .. }));
        let err = parse_snapshot(br#"{"ballots": []}"#).unwrap_err();
        assert!(matches!(err, IoError::Json { .. }));
    }

    #[test]
    fn round_trips_through_canonical_json() {
        let doc: SnapshotDoc = serde_json::from_str(SNAPSHOT).unwrap();
        let bytes = crate::canonical_json::to_canonical_bytes(&doc).unwrap();
        let back: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let orig: serde_json::Value = serde_json::from_str(SNAPSHOT).unwrap();
        assert_json_eq!(back["election_results"], orig["election_results"]);
        assert_json_eq!(back["districts"], orig["districts"]);
    }

    #[test]
    fn params_defaults_and_domains() {
        let p = parse_params(br#"{"threshold_pct": 3}"#).unwrap();
        assert_eq!(p.threshold_pct.as_u8(), 3);
        assert_eq!(p.invalid_share_pct.as_u8(), 5);
        assert_eq!(p.tie_policy, TiePolicy::DeterministicOrder);

        let p = parse_params(br#"{"tie_policy": "reject"}"#).unwrap();
        assert_eq!(p.tie_policy, TiePolicy::Reject);

        assert!(matches!(parse_params(br#"{"threshold_pct": 101}"#), Err(IoError::Json { .. })));
        assert!(matches!(parse_params(br#"{"invalid_share_pct": 100}"#), Err(IoError::Invalid(_))));
        assert_json_eq!(
            serde_json::to_value(Params::default()).unwrap(),
            json!({"invalid_share_pct": 5, "threshold_pct": 5, "tie_policy": "deterministic_order"})
        );
    }

    #[test]
    fn reads_local_files_and_rejects_urls() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("snapshot.json");
        std::fs::write(&p, SNAPSHOT).unwrap();
        assert_eq!(load_snapshot(&p).unwrap().districts().len(), 2);

        assert!(matches!(read_input(Path::new("https://example.org/s.json")), Err(IoError::Invalid(_))));
        assert!(matches!(read_input(&dir.path().join("missing.json")), Err(IoError::Read { .. })));
    }
}

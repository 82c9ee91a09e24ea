//! Snapshot document → store → national aggregation, through the library crates.

use sa_core::{
    entities::{ElectionResult, VoteTally},
    ids::{DistrictId, ElectionYear, PartyId},
    repository::Repository,
    variables::Params,
};
use sa_io::{canonical_json::to_canonical_bytes, parse_snapshot, SnapshotStore};
use sa_pipeline::{aggregate_repo, allocate_one, DistrictOutcome, PipelineError};

const SNAPSHOT: &str = r##"{
    "provinces": [{ "id": 1, "name": "Coast", "district_count": 3 }],
    "districts": [
        { "id": 1, "province_id": 1, "name": "Harbor", "seats_allocated": 5 },
        { "id": 2, "province_id": 1, "name": "Island", "seats_allocated": 1 },
        { "id": 3, "province_id": 1, "name": "Ridge", "seats_allocated": 3 }
    ],
    "parties": [
        { "id": 1, "name": "A", "color": "#aa0000", "selected_districts": [1, 2, 3] },
        { "id": 2, "name": "B", "color": "#00aa00", "selected_districts": [1, 3] },
        { "id": 3, "name": "C", "color": "#0000aa", "selected_districts": [1] }
    ],
    "election_results": [
        { "year": 2024, "district_id": 1, "total_votes": 10000, "party_votes": { "3": 1000, "1": 6000, "2": 3000 } },
        { "year": 2024, "district_id": 2, "total_votes": 100, "party_votes": { "1": 100 } },
        { "year": 2024, "district_id": 3, "total_votes": 15, "party_votes": { "1": 10, "2": 5 } },
        { "year": 2024, "district_id": 99, "total_votes": 50, "party_votes": { "1": 50 } }
    ]
}"##;

const Y: ElectionYear = ElectionYear::new(2024);

fn store() -> SnapshotStore {
    parse_snapshot(SNAPSHOT.as_bytes()).unwrap()
}

fn seats_of(store: &SnapshotStore, party: u32) -> u64 {
    aggregate_repo(store, Y, &Params::default()).party(PartyId::new(party)).unwrap().seats
}

#[test]
fn worked_district_through_the_store() {
    let calc = allocate_one(&store(), Y, DistrictId::new(1), &Params::default()).unwrap().unwrap();
    assert_eq!((calc.invalid_votes, calc.valid_votes, calc.quota), (500, 9500, 2375));
    let seats: Vec<u32> = calc.parties.iter().map(|p| p.total_seats).collect();
    assert_eq!(seats, vec![4, 1, 0]);
    assert_eq!(calc.bonus_party(), Some(PartyId::new(1)));
}

#[test]
fn single_seat_district_is_an_allocation_error() {
    let err = allocate_one(&store(), Y, DistrictId::new(2), &Params::default()).unwrap_err();
    assert!(matches!(err, PipelineError::Allocate { .. }));
    assert!(matches!(
        allocate_one(&store(), Y, DistrictId::new(99), &Params::default()),
        Err(PipelineError::NotFound { .. })
    ));
}

#[test]
fn national_totals_skip_failed_and_missing_districts() {
    let report = aggregate_repo(&store(), Y, &Params::default());

    assert!(report.partial);
    assert!(matches!(report.districts[&DistrictId::new(2)], DistrictOutcome::Failed(_)));
    assert!(matches!(report.districts[&DistrictId::new(99)], DistrictOutcome::MissingDistrict));

    // 10000 + 100 + 15 + 50 declared; 5% of 10165 floors to 508.
    assert_eq!(report.result.total_votes, 10_165);
    assert_eq!(report.result.invalid_votes, 508);
    assert_eq!(report.result.valid_votes, 9_657);

    let seats: Vec<u64> = report.result.party_results.iter().map(|p| p.seats).collect();
    assert_eq!(seats, vec![6, 2, 0]);
    assert_eq!(report.seats_total(), report.allocated_magnitude());
    assert_eq!(report.allocated_magnitude(), 8);

    assert_eq!(report.party(PartyId::new(2)).unwrap().votes, 3_005);
    assert_eq!(report.party(PartyId::new(3)).unwrap().votes, 1_000);

    let codes: Vec<&str> = report.diagnostics.iter().map(|d| d.code).collect();
    assert!(codes.contains(&"Allocate.DegenerateDistrict"));
    assert!(codes.contains(&"Result.UnknownDistrict"));
}

#[test]
fn result_writes_are_seen_by_the_next_aggregation() {
    let mut s = store();
    assert_eq!(seats_of(&s, 2), 2);

    let party_votes: VoteTally = [(1, 3000u64), (2, 6000), (3, 1000)]
        .into_iter()
        .map(|(p, v)| (PartyId::new(p), v))
        .collect();
    let replaced = s.upsert_result(ElectionResult {
        year: Y,
        district_id: DistrictId::new(1),
        total_votes: 10_000,
        party_votes,
    });
    assert!(replaced.is_some());
    assert_eq!(s.results_for_year(Y).len(), 4);
    assert_eq!(seats_of(&s, 2), 5);

    s.remove_result(Y, DistrictId::new(3));
    assert_eq!(seats_of(&s, 2), 4);
}

#[test]
fn output_bytes_do_not_depend_on_input_key_order() {
    let reordered = SNAPSHOT.replace(
        r#"{ "3": 1000, "1": 6000, "2": 3000 }"#,
        r#"{ "1": 6000, "2": 3000, "3": 1000 }"#,
    );
    let a = aggregate_repo(&store(), Y, &Params::default());
    let b = aggregate_repo(&parse_snapshot(reordered.as_bytes()).unwrap(), Y, &Params::default());
    assert_eq!(to_canonical_bytes(&a).unwrap(), to_canonical_bytes(&b).unwrap());
}

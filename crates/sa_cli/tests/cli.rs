use std::fs;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

const SNAPSHOT: &str = r##"{
    "provinces": [{ "id": 1, "name": "Coast", "district_count": 3 }],
    "districts": [
        { "id": 10, "province_id": 1, "name": "North", "seats_allocated": 5 },
        { "id": 11, "province_id": 1, "name": "South", "seats_allocated": 3 },
        { "id": 12, "province_id": 1, "name": "Delta", "seats_allocated": 3 }
    ],
    "parties": [
        { "id": 1, "name": "Alpha", "color": "#ff0000", "selected_districts": [10, 11, 12] },
        { "id": 2, "name": "Beta", "color": "#00ff00", "selected_districts": [10, 12] }
    ],
    "election_results": [
        { "year": 2024, "district_id": 10, "total_votes": 10000, "party_votes": { "1": 6000, "2": 4000 } },
        { "year": 2024, "district_id": 11, "total_votes": 900, "party_votes": { "1": 900 } },
        { "year": 2020, "district_id": 12, "total_votes": 1000, "party_votes": { "1": 500, "2": 500 } }
    ]
}"##;

fn seats() -> Command {
    let mut cmd = Command::cargo_bin("seats").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

fn write_snapshot(dir: &Path, body: &str) -> PathBuf {
    let p = dir.join("snapshot.json");
    fs::write(&p, body).unwrap();
    p
}

fn read_json(p: &Path) -> Value {
    serde_json::from_slice(&fs::read(p).unwrap()).unwrap()
}

#[test]
fn district_mode_writes_calculation_and_run_record() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), SNAPSHOT);
    let out = dir.path().join("out");

    seats()
        .args(["--data", data.to_str().unwrap(), "--year", "2024", "--district", "10"])
        .args(["--out", out.to_str().unwrap(), "--quiet"])
        .assert()
        .success();

    let calc = read_json(&out.join("district_10_2024.json"));
    assert_eq!(calc["quota"], 2375);
    assert_eq!(calc["valid_votes"], 9500);
    let parties = calc["parties"].as_array().unwrap();
    assert_eq!(parties[0]["party_id"], 1);
    assert_eq!(parties[0]["total_seats"], 3);
    assert_eq!(parties[0]["bonus_seat"], 1);
    assert_eq!(parties[1]["total_seats"], 2);
    assert_eq!(parties[1]["remainder_seats"], 1);

    let rec = read_json(&out.join("run_record.json"));
    assert_eq!(rec["mode"], "district");
    assert_eq!(rec["district_id"], 10);
    assert_eq!(rec["partial"], false);
    assert_eq!(rec["outputs"][0]["file"], "district_10_2024.json");
    assert_eq!(rec["inputs"]["data_sha256"].as_str().unwrap().len(), 64);
    assert_eq!(rec["params"]["threshold_pct"], 5);
}

#[test]
fn national_mode_sums_districts() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), SNAPSHOT);
    let out = dir.path().join("out");

    seats()
        .args(["--data", data.to_str().unwrap(), "--year", "2024", "--out", out.to_str().unwrap()])
        .assert()
        .success();

    let report = read_json(&out.join("national_2024.json"));
    assert_eq!(report["partial"], false);
    let result = &report["result"];
    assert_eq!(result["total_votes"], 10900);
    let alpha = &result["party_results"][0];
    assert_eq!(alpha["party_id"], 1);
    assert_eq!(alpha["seats"], 6);
    assert_eq!(result["party_results"][1]["seats"], 2);
    assert_eq!(report["districts"]["11"]["status"], "allocated");

    let rec = read_json(&out.join("run_record.json"));
    assert_eq!(rec["mode"], "national");
    assert!(rec.get("district_id").is_none());
    assert_eq!(rec["validation"]["pass"], true);
}

#[test]
fn reruns_are_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), SNAPSHOT);
    let (a, b) = (dir.path().join("a"), dir.path().join("b"));
    for out in [&a, &b] {
        seats()
            .args(["--data", data.to_str().unwrap(), "--year", "2024", "--out", out.to_str().unwrap(), "--quiet"])
            .assert()
            .success();
    }
    for name in ["national_2024.json", "run_record.json"] {
        assert_eq!(fs::read(a.join(name)).unwrap(), fs::read(b.join(name)).unwrap());
    }
}

#[test]
fn unknown_district_or_year_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), SNAPSHOT);
    let out = dir.path().join("out");

    seats()
        .args(["--data", data.to_str().unwrap(), "--year", "2024", "--district", "99"])
        .args(["--out", out.to_str().unwrap()])
        .assert()
        .code(3);
    seats()
        .args(["--data", data.to_str().unwrap(), "--year", "1999", "--out", out.to_str().unwrap()])
        .assert()
        .code(3);
    assert!(!out.join("run_record.json").exists());
}

#[test]
fn no_qualifying_party_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    // Declared total without any party votes.
    let body = SNAPSHOT.replace(r#""party_votes": { "1": 900 }"#, r#""party_votes": {}"#);
    let data = write_snapshot(dir.path(), &body);

    seats()
        .args(["--data", data.to_str().unwrap(), "--year", "2024", "--district", "11"])
        .args(["--out", dir.path().to_str().unwrap()])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("no party qualifies"));
}

#[test]
fn rejected_tie_is_an_allocation_error() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), SNAPSHOT);
    let out = dir.path().join("out");

    seats()
        .args(["--data", data.to_str().unwrap(), "--year", "2020", "--district", "12"])
        .args(["--out", out.to_str().unwrap(), "--tie-policy", "reject"])
        .assert()
        .code(5)
        .stderr(predicate::str::contains("Allocate.UnresolvedTie"));

    seats()
        .args(["--data", data.to_str().unwrap(), "--year", "2020", "--district", "12"])
        .args(["--out", out.to_str().unwrap()])
        .assert()
        .success();
    let calc = read_json(&out.join("district_12_2020.json"));
    assert_eq!(calc["bonus_tie"], true);
    assert_eq!(calc["parties"][0]["bonus_seat"], 1);
}

#[test]
fn params_file_and_overrides_are_echoed() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), SNAPSHOT);
    let params = dir.path().join("params.json");
    fs::write(&params, r#"{"threshold_pct": 50}"#).unwrap();
    let out = dir.path().join("out");

    seats()
        .args(["--data", data.to_str().unwrap(), "--params", params.to_str().unwrap()])
        .args(["--year", "2024", "--district", "10", "--invalid-pct", "0"])
        .args(["--out", out.to_str().unwrap()])
        .assert()
        .success();

    let calc = read_json(&out.join("district_10_2024.json"));
    assert_eq!(calc["invalid_votes"], 0);
    assert_eq!(calc["parties"].as_array().unwrap().len(), 1);
    assert_eq!(calc["parties"][0]["total_seats"], 5);

    let rec = read_json(&out.join("run_record.json"));
    assert_eq!(rec["params"]["threshold_pct"], 50);
    assert_eq!(rec["params"]["invalid_share_pct"], 0);
}

#[test]
fn validate_only_reports_duplicate_results() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), SNAPSHOT);
    seats().args(["--data", data.to_str().unwrap(), "--validate-only"]).assert().success();

    let dup = SNAPSHOT.replace(
        r#""election_results": ["#,
        r#""election_results": [
        { "year": 2024, "district_id": 11, "total_votes": 10, "party_votes": { "1": 10 } },"#,
    );
    let data = write_snapshot(dir.path(), &dup);
    seats()
        .args(["--data", data.to_str().unwrap(), "--validate-only"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("Result.DuplicateKey").or(predicate::str::contains("more than one result")));
}

#[test]
fn bad_inputs_exit_with_validation_code() {
    let dir = tempfile::tempdir().unwrap();
    let data = write_snapshot(dir.path(), r#"{"districts": [{"id": "x"}]}"#);

    seats().args(["--data", data.to_str().unwrap(), "--year", "2024"]).assert().code(2);
    seats().args(["--data", "https://example.org/s.json", "--year", "2024"]).assert().code(2);
    seats().args(["--data", dir.path().join("missing.json").to_str().unwrap(), "--year", "2024"]).assert().code(2);
    seats().args(["--data", data.to_str().unwrap(), "--year", "2024", "--invalid-pct", "100"]).assert().code(2);
}

use std::fs;

use pmatch_model::{MatchKey, MatchResult, MatchStatus, PatientRecord, RegistryKind, fields};
use pmatch_store::{CsvDecisionStore, DecisionStore, MemoryDecisionStore, StoreError};
use tempfile::tempdir;

fn result(external_id: &str, internal_id: &str, score: f64) -> MatchResult {
    MatchResult::new(
        PatientRecord::from_pairs(RegistryKind::Internal, [(fields::INTERNAL_ID, internal_id)]),
        PatientRecord::from_pairs(RegistryKind::External, [(fields::EXTERNAL_ID, external_id)]),
        score,
    )
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let store = CsvDecisionStore::in_dir(dir.path());
    assert!(store.is_empty().unwrap());
    assert!(store.read_all().unwrap().is_empty());
    assert!(!store.path().exists());
}

#[test]
fn append_then_review_round_trip() {
    let dir = tempdir().unwrap();
    let mut store = CsvDecisionStore::in_dir(dir.path());

    let added = store
        .append_all(&[result("E2", "I2", 0.9), result("E1", "I1", 0.7)])
        .unwrap();
    assert_eq!(added, 2);
    assert!(!store.is_empty().unwrap());

    assert!(store.set_status_approved(&MatchKey::new("E1", "I1")).unwrap());
    let contents = fs::read_to_string(store.path()).unwrap();
    insta::assert_snapshot!(contents, @r"
    ExternalPatientId,InternalPatientId,Status
    E1,I1,1
    E2,I2,0
    ");

    assert!(store.remove_by_key(&MatchKey::new("E2", "I2")).unwrap());
    assert!(!store.remove_by_key(&MatchKey::new("E2", "I2")).unwrap());

    let decisions = store.read_all().unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].key, MatchKey::new("E1", "I1"));
    assert_eq!(decisions[0].status, MatchStatus::Approved);
}

#[test]
fn append_keeps_existing_decisions() {
    let dir = tempdir().unwrap();
    let mut store = CsvDecisionStore::in_dir(dir.path());
    store.append_all(&[result("E1", "I1", 0.7)]).unwrap();
    store.set_status_approved(&MatchKey::new("E1", "I1")).unwrap();

    let added = store
        .append_all(&[result("E1", "I1", 0.7), result("E3", "I3", 0.6)])
        .unwrap();
    assert_eq!(added, 1);
    let decisions = store.read_all().unwrap();
    assert_eq!(decisions[0].status, MatchStatus::Approved);
    assert_eq!(decisions[1].status, MatchStatus::None);
}

#[test]
fn keys_match_exactly() {
    let dir = tempdir().unwrap();
    let mut store = CsvDecisionStore::in_dir(dir.path());
    store.append_all(&[result("E1", "I1", 0.7)]).unwrap();
    assert!(!store.set_status_approved(&MatchKey::new("e1", "I1")).unwrap());
    assert!(!store.remove_by_key(&MatchKey::new("E1 ", "I1")).unwrap());
    assert_eq!(store.read_all().unwrap().len(), 1);
}

#[test]
fn clear_leaves_a_header_only_file() {
    let dir = tempdir().unwrap();
    let mut store = CsvDecisionStore::in_dir(dir.path());
    store.append_all(&[result("E1", "I1", 0.7)]).unwrap();
    store.clear().unwrap();

    assert!(store.is_empty().unwrap());
    let contents = fs::read_to_string(store.path()).unwrap();
    assert_eq!(contents, "ExternalPatientId,InternalPatientId,Status\n");
}

#[test]
fn reads_tables_written_without_status_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("matches.csv");
    fs::write(&path, "ExternalPatientId,InternalPatientId,Status\nE1,I1\nE2,I2,2\n").unwrap();

    let store = CsvDecisionStore::new(&path);
    let decisions = store.read_all().unwrap();
    assert_eq!(decisions[0].status, MatchStatus::None);
    assert_eq!(decisions[1].status, MatchStatus::Denied);
}

#[test]
fn corrupt_status_is_reported() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("matches.csv");
    fs::write(&path, "ExternalPatientId,InternalPatientId,Status\nE1,I1,approved\n").unwrap();

    let err = CsvDecisionStore::new(&path).read_all().unwrap_err();
    assert!(matches!(err, StoreError::InvalidStatus { line: 2, .. }));
}

#[test]
fn memory_store_behaves_like_the_file_store() {
    let mut store = MemoryDecisionStore::new();
    assert!(store.is_empty().unwrap());
    store
        .append_all(&[result("E1", "I1", 0.7), result("E1", "I1", 0.7)])
        .unwrap();
    assert_eq!(store.read_all().unwrap().len(), 1);
    assert!(store.set_status(&MatchKey::new("E1", "I1"), MatchStatus::Denied).unwrap());
    store.clear().unwrap();
    assert!(store.is_empty().unwrap());
}

#[test]
fn replace_all_swaps_rows_in_one_write() {
    let dir = tempdir().unwrap();
    let mut store = CsvDecisionStore::in_dir(dir.path());
    store
        .append_all(&[result("E1", "I1", 0.7), result("E9", "I9", 0.5)])
        .unwrap();
    store.set_status_approved(&MatchKey::new("E1", "I1")).unwrap();

    let stored = store
        .replace_all(&[result("E1", "I1", 0.8), result("E2", "I2", 0.6)])
        .unwrap();
    assert_eq!(stored, 2);
    let contents = fs::read_to_string(store.path()).unwrap();
    insta::assert_snapshot!(contents, @r"
    ExternalPatientId,InternalPatientId,Status
    E1,I1,0
    E2,I2,0
    ");
}

#[test]
fn failed_replace_keeps_previous_rows() {
    let dir = tempdir().unwrap();
    let mut store = CsvDecisionStore::in_dir(dir.path());
    store.append_all(&[result("E1", "I1", 0.7)]).unwrap();
    store.set_status_approved(&MatchKey::new("E1", "I1")).unwrap();

    // A directory where the temp file goes makes the write fail.
    fs::create_dir(store.path().with_extension("csv.tmp")).unwrap();
    let err = store.replace_all(&[result("E2", "I2", 0.6)]).unwrap_err();
    assert!(matches!(err, StoreError::Io { operation: "create", .. }));

    let decisions = store.read_all().unwrap();
    assert_eq!(decisions.len(), 1);
    assert_eq!(decisions[0].key, MatchKey::new("E1", "I1"));
    assert_eq!(decisions[0].status, MatchStatus::Approved);
}

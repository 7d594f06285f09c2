use pmatch_core::{MatchEngine, calculate_match_score, pending_matches, reconcile_decisions};
use pmatch_ingest::Registries;
use pmatch_model::{
    Decision, MatchKey, MatchOptions, MatchStatus, PatientRecord, RegistryKind, fields,
};

fn patient(kind: RegistryKind, id: &str, first: &str, last: &str, dob: &str) -> PatientRecord {
    PatientRecord::from_pairs(
        kind,
        [
            (kind.id_field(), id),
            (fields::FIRST_NAME, first),
            (fields::LAST_NAME, last),
            (fields::DOB, dob),
        ],
    )
}

fn registries() -> Registries {
    Registries::new(
        vec![
            patient(RegistryKind::Internal, "I1", "Jon", "Smith", "1980-01-01"),
            patient(RegistryKind::Internal, "I2", "Mary", "Jones", "1975-05-05"),
        ],
        vec![
            patient(RegistryKind::External, "E1", "John", "Smith", "01-Jan-1980"),
            patient(RegistryKind::External, "E2", "Mary", "Jones", "5-May-75"),
        ],
    )
}

#[test]
fn scores_are_recomputed_and_sorted() {
    let registries = registries();
    let options = MatchOptions::default();
    let decisions = vec![
        Decision::new(MatchKey::new("E1", "I1"), MatchStatus::Approved),
        Decision::new(MatchKey::new("E2", "I2"), MatchStatus::None),
    ];

    let reconciled = reconcile_decisions(&registries, &decisions, &options);
    assert!(reconciled.missing.is_empty());
    assert_eq!(reconciled.matches.len(), 2);

    let top = &reconciled.matches[0];
    assert_eq!(top.key(), MatchKey::new("E2", "I2"));
    assert_eq!(top.status, MatchStatus::None);

    let second = &reconciled.matches[1];
    assert_eq!(second.status, MatchStatus::Approved);
    let expected = calculate_match_score(&second.internal, &second.external, &options);
    assert_eq!(second.score, expected);
    assert!(top.score >= second.score);
}

#[test]
fn dangling_keys_are_reported_not_joined() {
    let registries = registries();
    let decisions = vec![
        Decision::new(MatchKey::new("E9", "I1"), MatchStatus::Approved),
        Decision::new(MatchKey::new("E1", "I9"), MatchStatus::None),
        Decision::new(MatchKey::new("E1", "I1"), MatchStatus::None),
    ];

    let reconciled = reconcile_decisions(&registries, &decisions, &MatchOptions::default());
    assert_eq!(reconciled.matches.len(), 1);
    assert_eq!(
        reconciled.missing,
        vec![MatchKey::new("E9", "I1"), MatchKey::new("E1", "I9")]
    );
}

#[test]
fn pending_excludes_decided_pairs() {
    let registries = registries();
    let engine = MatchEngine::with_defaults(&registries);
    let computed = engine.find_all_patient_matches();
    assert_eq!(computed.len(), 2);

    let decisions = vec![Decision::new(MatchKey::new("E1", "I1"), MatchStatus::Approved)];
    let pending = pending_matches(computed, &decisions);
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].key(), MatchKey::new("E2", "I2"));
}

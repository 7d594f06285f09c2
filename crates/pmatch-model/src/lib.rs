//! Shared types for reconciling internal and external patient registries.

pub mod error;
pub mod options;
pub mod record;
pub mod result;

pub use error::{ModelError, Result};
pub use options::{BonusTiers, FieldWeights, MatchOptions, QueryOptions};
pub use record::{PatientRecord, RegistryKind, fields};
pub use result::{Decision, MatchKey, MatchResult, MatchStatus};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn match_result_key_uses_both_identifiers() {
        let internal = PatientRecord::from_pairs(
            RegistryKind::Internal,
            [(fields::INTERNAL_ID, "I-1"), (fields::LAST_NAME, "Smith")],
        );
        let external = PatientRecord::from_pairs(
            RegistryKind::External,
            [(fields::EXTERNAL_ID, "E-9"), (fields::LAST_NAME, "Smith")],
        );
        let result = MatchResult::new(internal, external, 0.75);
        assert_eq!(result.key(), MatchKey::new("E-9", "I-1"));
        assert_eq!(result.status, MatchStatus::None);
    }
}

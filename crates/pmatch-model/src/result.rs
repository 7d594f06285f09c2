//! Match results and their review status.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::record::PatientRecord;

/// Natural key of a proposed match: the pair of registry identifiers.
///
/// Identifiers are compared exactly as loaded; no normalization applies.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub external_id: String,
    pub internal_id: String,
}

impl MatchKey {
    pub fn new(external_id: impl Into<String>, internal_id: impl Into<String>) -> Self {
        Self {
            external_id: external_id.into(),
            internal_id: internal_id.into(),
        }
    }
}

impl fmt::Display for MatchKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} <-> {}", self.external_id, self.internal_id)
    }
}

/// Review state of a match. Only the decision store changes it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    None,
    Approved,
    Denied,
}

impl MatchStatus {
    /// Numeric code written to the decision table.
    #[must_use]
    pub const fn code(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Approved => 1,
            Self::Denied => 2,
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::None => "pending",
            Self::Approved => "approved",
            Self::Denied => "denied",
        }
    }

    /// Parse a stored status code. A blank code means no decision yet.
    pub fn from_code(raw: &str) -> Result<Self, ModelError> {
        match raw.trim() {
            "" | "0" => Ok(Self::None),
            "1" => Ok(Self::Approved),
            "2" => Ok(Self::Denied),
            other => Err(ModelError::UnknownStatus(other.to_string())),
        }
    }
}

impl FromStr for MatchStatus {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_code(s)
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A persisted review decision: the key plus its status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    pub key: MatchKey,
    pub status: MatchStatus,
}

impl Decision {
    pub fn new(key: MatchKey, status: MatchStatus) -> Self {
        Self { key, status }
    }
}

/// A proposed pairing of one internal and one external record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub internal: PatientRecord,
    pub external: PatientRecord,
    /// Confidence in [0, 1].
    pub score: f64,
    pub status: MatchStatus,
}

impl MatchResult {
    pub fn new(internal: PatientRecord, external: PatientRecord, score: f64) -> Self {
        Self {
            internal,
            external,
            score,
            status: MatchStatus::None,
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: MatchStatus) -> Self {
        self.status = status;
        self
    }

    pub fn key(&self) -> MatchKey {
        MatchKey::new(self.external.id(), self.internal.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes() {
        assert_eq!(MatchStatus::from_code("1").unwrap(), MatchStatus::Approved);
        assert_eq!(MatchStatus::from_code(" 0 ").unwrap(), MatchStatus::None);
        assert_eq!(MatchStatus::from_code("").unwrap(), MatchStatus::None);
        assert_eq!(MatchStatus::Denied.code(), 2);
        assert!(matches!(
            MatchStatus::from_code("yes"),
            Err(ModelError::UnknownStatus(code)) if code == "yes"
        ));
    }

    #[test]
    fn keys_order_by_external_then_internal() {
        let a = MatchKey::new("E1", "I2");
        let b = MatchKey::new("E1", "I10");
        let c = MatchKey::new("E0", "I9");
        let mut keys = vec![a.clone(), b.clone(), c.clone()];
        keys.sort();
        assert_eq!(keys, vec![c, b, a]);
    }
}

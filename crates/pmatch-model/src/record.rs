//! Patient records as loaded from a registry.
//!
//! Both registries share one schema and differ only in the name of the
//! identifier column, so a single record type carries a [`RegistryKind`]
//! tag instead of two parallel structs. Fields are kept exactly as loaded;
//! any field the source did not provide reads as the empty string.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Well-known column names shared by both registries.
pub mod fields {
    pub const INTERNAL_ID: &str = "InternalPatientId";
    pub const EXTERNAL_ID: &str = "ExternalPatientId";
    pub const FIRST_NAME: &str = "FirstName";
    pub const LAST_NAME: &str = "LastName";
    pub const DOB: &str = "DOB";
    pub const SEX: &str = "Sex";
    pub const PHONE_NUMBER: &str = "PhoneNumber";
    pub const ADDRESS: &str = "Address";
    pub const CITY: &str = "City";
    pub const ZIP_CODE: &str = "ZipCode";
}

/// Which registry a record came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistryKind {
    Internal,
    External,
}

impl RegistryKind {
    /// Name of the identifier column for this registry.
    #[must_use]
    pub const fn id_field(self) -> &'static str {
        match self {
            Self::Internal => fields::INTERNAL_ID,
            Self::External => fields::EXTERNAL_ID,
        }
    }

    /// File stem used by the CSV registry layout (`internal.csv`, `external.csv`).
    #[must_use]
    pub const fn file_stem(self) -> &'static str {
        match self {
            Self::Internal => "internal",
            Self::External => "external",
        }
    }
}

impl fmt::Display for RegistryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.file_stem())
    }
}

/// A single patient row from either registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientRecord {
    pub kind: RegistryKind,
    #[serde(flatten)]
    pub fields: BTreeMap<String, String>,
}

impl PatientRecord {
    pub fn new(kind: RegistryKind) -> Self {
        Self {
            kind,
            fields: BTreeMap::new(),
        }
    }

    /// Build a record from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(kind: RegistryKind, pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            kind,
            fields: pairs
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// Value of a named field, or `""` when the field is absent.
    pub fn field(&self, name: &str) -> &str {
        self.fields.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// The registry-specific identifier (`InternalPatientId` or `ExternalPatientId`).
    pub fn id(&self) -> &str {
        self.field(self.kind.id_field())
    }

    pub fn first_name(&self) -> &str {
        self.field(fields::FIRST_NAME)
    }

    pub fn last_name(&self) -> &str {
        self.field(fields::LAST_NAME)
    }

    pub fn dob(&self) -> &str {
        self.field(fields::DOB)
    }

    pub fn phone_number(&self) -> &str {
        self.field(fields::PHONE_NUMBER)
    }

    pub fn address(&self) -> &str {
        self.field(fields::ADDRESS)
    }

    pub fn city(&self) -> &str {
        self.field(fields::CITY)
    }

    pub fn zip_code(&self) -> &str {
        self.field(fields::ZIP_CODE)
    }

    /// "First Last", skipping whichever part is missing.
    pub fn display_name(&self) -> String {
        [self.first_name().trim(), self.last_name().trim()]
            .into_iter()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_fields_read_as_empty() {
        let record = PatientRecord::new(RegistryKind::External);
        assert_eq!(record.first_name(), "");
        assert_eq!(record.id(), "");
        assert_eq!(record.field("NotAColumn"), "");
    }

    #[test]
    fn id_follows_registry_kind() {
        let record = PatientRecord::from_pairs(
            RegistryKind::Internal,
            [(fields::INTERNAL_ID, "42"), (fields::EXTERNAL_ID, "99")],
        );
        assert_eq!(record.id(), "42");
    }

    #[test]
    fn display_name_skips_missing_parts() {
        let record = PatientRecord::from_pairs(RegistryKind::Internal, [(fields::LAST_NAME, "Doe")]);
        assert_eq!(record.display_name(), "Doe");
    }
}

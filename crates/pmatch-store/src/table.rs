//! In-memory decision table and its CSV encoding.
//!
//! The table maps a match key to its review status. On disk it is a CSV file
//! with the header `ExternalPatientId,InternalPatientId,Status`; the status
//! column is optional when reading and always written.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::warn;

use pmatch_model::{Decision, MatchKey, MatchStatus, fields};

use crate::error::{Result, StoreError};

/// Status column name.
pub const STATUS_COLUMN: &str = "Status";

/// Review decisions keyed by (external id, internal id).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecisionTable {
    rows: BTreeMap<MatchKey, MatchStatus>,
}

impl DecisionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, key: &MatchKey) -> Option<MatchStatus> {
        self.rows.get(key).copied()
    }

    /// Insert `key` unless it is already present. Returns true if inserted.
    pub fn insert_if_absent(&mut self, key: MatchKey, status: MatchStatus) -> bool {
        match self.rows.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(status);
                true
            }
            Entry::Occupied(_) => false,
        }
    }

    /// Change the status of an existing row. Returns false if the key is absent.
    pub fn set_status(&mut self, key: &MatchKey, status: MatchStatus) -> bool {
        match self.rows.get_mut(key) {
            Some(current) => {
                *current = status;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, key: &MatchKey) -> bool {
        self.rows.remove(key).is_some()
    }

    pub fn clear(&mut self) {
        self.rows.clear();
    }

    pub fn decisions(&self) -> Vec<Decision> {
        self.rows
            .iter()
            .map(|(key, status)| Decision::new(key.clone(), *status))
            .collect()
    }

    /// Parse a decision table. `path` is only used in error messages.
    ///
    /// Columns are located by header name. Blank rows are skipped, and when a
    /// key appears twice the first row wins.
    pub fn from_reader<R: Read>(reader: R, path: &Path) -> Result<Self> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);
        let parse_error = |e: csv::Error| StoreError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        };

        let mut rows = reader.records();
        let columns = loop {
            match rows.next() {
                Some(record) => {
                    let record = record.map_err(parse_error)?;
                    if !is_blank(&record) {
                        break Columns::from_header(&record, path)?;
                    }
                }
                None => return Ok(Self::new()),
            }
        };

        let mut table = Self::new();
        for record in rows {
            let record = record.map_err(parse_error)?;
            if is_blank(&record) {
                continue;
            }

            let line = record.position().map_or(0, csv::Position::line);
            let cell = |index: Option<usize>| {
                index
                    .and_then(|i| record.get(i))
                    .map_or("", str::trim)
                    .to_string()
            };
            let key = MatchKey::new(cell(Some(columns.external)), cell(Some(columns.internal)));
            let raw_status = cell(columns.status);
            let status =
                MatchStatus::from_code(&raw_status).map_err(|_| StoreError::InvalidStatus {
                    path: path.to_path_buf(),
                    line,
                    value: raw_status.clone(),
                })?;

            if !table.insert_if_absent(key.clone(), status) {
                warn!(
                    external_id = %key.external_id,
                    internal_id = %key.internal_id,
                    line,
                    "duplicate decision row ignored"
                );
            }
        }
        Ok(table)
    }

    /// Encode the table as CSV, header first, rows in key order.
    pub fn to_csv_bytes(&self, path: &Path) -> Result<Vec<u8>> {
        let encode_error = |source: std::io::Error| StoreError::Io {
            operation: "encode",
            path: path.to_path_buf(),
            source,
        };

        let mut writer = WriterBuilder::new().from_writer(Vec::new());
        writer
            .write_record([fields::EXTERNAL_ID, fields::INTERNAL_ID, STATUS_COLUMN])
            .map_err(|e| encode_error(e.into()))?;
        for (key, status) in &self.rows {
            let code = status.code().to_string();
            writer
                .write_record([key.external_id.as_str(), key.internal_id.as_str(), code.as_str()])
                .map_err(|e| encode_error(e.into()))?;
        }
        writer
            .into_inner()
            .map_err(|e| encode_error(e.into_error()))
    }
}

fn is_blank(record: &StringRecord) -> bool {
    record.iter().all(|value| value.trim().is_empty())
}

/// Column positions resolved from the header row.
struct Columns {
    external: usize,
    internal: usize,
    status: Option<usize>,
}

impl Columns {
    fn from_header(header: &StringRecord, path: &Path) -> Result<Self> {
        let position = |name: &str| {
            header
                .iter()
                .position(|column| column.trim().trim_matches('\u{feff}') == name)
        };
        let required = |name: &str| {
            position(name).ok_or_else(|| StoreError::CsvParse {
                path: path.to_path_buf(),
                message: format!("required column '{name}' not found"),
            })
        };
        Ok(Self {
            external: required(fields::EXTERNAL_ID)?,
            internal: required(fields::INTERNAL_ID)?,
            status: position(STATUS_COLUMN),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<DecisionTable> {
        DecisionTable::from_reader(text.as_bytes(), Path::new("matches.csv"))
    }

    #[test]
    fn missing_status_column_means_pending() {
        let table = parse("ExternalPatientId,InternalPatientId\nE1,I1\n").unwrap();
        assert_eq!(table.get(&MatchKey::new("E1", "I1")), Some(MatchStatus::None));
    }

    #[test]
    fn columns_are_found_by_name() {
        let table = parse("Status,InternalPatientId,ExternalPatientId\n1,I1,E1\n").unwrap();
        assert_eq!(
            table.get(&MatchKey::new("E1", "I1")),
            Some(MatchStatus::Approved)
        );
    }

    #[test]
    fn first_duplicate_wins() {
        let table = parse(
            "ExternalPatientId,InternalPatientId,Status\nE1,I1,1\n\nE1,I1,0\n",
        )
        .unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(
            table.get(&MatchKey::new("E1", "I1")),
            Some(MatchStatus::Approved)
        );
    }

    #[test]
    fn unknown_status_is_an_error() {
        let err = parse("ExternalPatientId,InternalPatientId,Status\nE1,I1,7\n").unwrap_err();
        assert!(matches!(err, StoreError::InvalidStatus { line: 2, ref value, .. } if value == "7"));
    }

    #[test]
    fn header_without_ids_is_rejected() {
        let err = parse("a,b,c\n1,2,3\n").unwrap_err();
        assert!(matches!(err, StoreError::CsvParse { .. }));
    }

    #[test]
    fn set_status_only_touches_existing_rows() {
        let mut table = DecisionTable::new();
        let key = MatchKey::new("E1", "I1");
        assert!(!table.set_status(&key, MatchStatus::Approved));
        assert!(table.insert_if_absent(key.clone(), MatchStatus::None));
        assert!(!table.insert_if_absent(key.clone(), MatchStatus::Denied));
        assert!(table.set_status(&key, MatchStatus::Approved));
        assert_eq!(table.get(&key), Some(MatchStatus::Approved));
    }
}

//! Registry loading.
//!
//! A registry file is a header row naming the columns followed by one row per
//! patient. Values map to headers by position. Rows shorter than the header
//! leave the trailing fields empty; values past the last header are dropped.

use std::collections::HashMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Instant;

use csv::ReaderBuilder;
use tracing::{debug, info, warn};

use pmatch_model::{PatientRecord, RegistryKind};

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    raw.trim().trim_matches('\u{feff}').to_string()
}

fn normalize_cell(raw: &str) -> String {
    raw.trim().to_string()
}

fn open_registry(path: &Path, kind: RegistryKind) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                kind,
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                kind,
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Read one registry file into records of the given kind.
pub fn read_registry(path: &Path, kind: RegistryKind) -> Result<Vec<PatientRecord>> {
    let file = open_registry(path, kind)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut rows = reader.records();
    let headers: Vec<String> = loop {
        match rows.next() {
            Some(record) => {
                let record = record.map_err(|e| IngestError::CsvParse {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                if record.iter().all(|value| value.trim().is_empty()) {
                    continue;
                }
                break record.iter().map(normalize_header).collect();
            }
            None => {
                return Err(IngestError::EmptyCsv {
                    path: path.to_path_buf(),
                });
            }
        }
    };

    let id_field = kind.id_field();
    if !headers.iter().any(|header| header == id_field) {
        return Err(IngestError::MissingColumn {
            column: id_field.to_string(),
            path: path.to_path_buf(),
        });
    }

    let mut records = Vec::new();
    let mut short_rows = 0usize;
    for record in rows {
        let record = record.map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        if record.len() < headers.len() {
            short_rows += 1;
        }
        let mut patient = PatientRecord::new(kind);
        for (idx, header) in headers.iter().enumerate() {
            let value = record.get(idx).unwrap_or("");
            patient.set_field(header.clone(), normalize_cell(value));
        }
        records.push(patient);
    }

    if short_rows > 0 {
        warn!(
            registry = %kind,
            path = %path.display(),
            short_rows,
            "rows with fewer values than headers; missing fields left empty"
        );
    }
    debug!(
        registry = %kind,
        path = %path.display(),
        columns = headers.len(),
        records = records.len(),
        "registry parsed"
    );
    Ok(records)
}

/// Source of patient records for one matching run.
pub trait RegistryReader {
    fn load_records(&self, kind: RegistryKind) -> Result<Vec<PatientRecord>>;
}

/// Registries stored as `internal.csv` and `external.csv` in one directory.
#[derive(Debug, Clone)]
pub struct CsvRegistry {
    data_dir: PathBuf,
}

impl CsvRegistry {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn path_for(&self, kind: RegistryKind) -> PathBuf {
        self.data_dir.join(format!("{}.csv", kind.file_stem()))
    }
}

impl RegistryReader for CsvRegistry {
    fn load_records(&self, kind: RegistryKind) -> Result<Vec<PatientRecord>> {
        read_registry(&self.path_for(kind), kind)
    }
}

/// Both registries, loaded once and passed by reference to the matcher.
#[derive(Debug, Clone, Default)]
pub struct Registries {
    internal: Vec<PatientRecord>,
    external: Vec<PatientRecord>,
    internal_index: HashMap<String, usize>,
    external_index: HashMap<String, usize>,
}

impl Registries {
    /// Build a handle from already loaded records.
    pub fn new(internal: Vec<PatientRecord>, external: Vec<PatientRecord>) -> Self {
        let internal_index = index_by_id(&internal);
        let external_index = index_by_id(&external);
        Self {
            internal,
            external,
            internal_index,
            external_index,
        }
    }

    /// Load both registries. A failure on either side aborts the load.
    pub fn load<R: RegistryReader + ?Sized>(reader: &R) -> Result<Self> {
        let start = Instant::now();
        let internal = reader.load_records(RegistryKind::Internal)?;
        let external = reader.load_records(RegistryKind::External)?;
        info!(
            internal_count = internal.len(),
            external_count = external.len(),
            duration_ms = start.elapsed().as_millis(),
            "registries loaded"
        );
        Ok(Self::new(internal, external))
    }

    pub fn internal(&self) -> &[PatientRecord] {
        &self.internal
    }

    pub fn external(&self) -> &[PatientRecord] {
        &self.external
    }

    pub fn find_internal(&self, id: &str) -> Option<&PatientRecord> {
        self.internal_index.get(id).map(|&idx| &self.internal[idx])
    }

    pub fn find_external(&self, id: &str) -> Option<&PatientRecord> {
        self.external_index.get(id).map(|&idx| &self.external[idx])
    }

    pub fn is_empty(&self) -> bool {
        self.internal.is_empty() && self.external.is_empty()
    }
}

/// First record wins when an identifier repeats.
fn index_by_id(records: &[PatientRecord]) -> HashMap<String, usize> {
    let mut index = HashMap::with_capacity(records.len());
    for (idx, record) in records.iter().enumerate() {
        index.entry(record.id().to_string()).or_insert(idx);
    }
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmatch_model::fields;

    #[test]
    fn lookups_prefer_first_duplicate() {
        let internal = vec![
            PatientRecord::from_pairs(
                RegistryKind::Internal,
                [(fields::INTERNAL_ID, "1"), (fields::FIRST_NAME, "First")],
            ),
            PatientRecord::from_pairs(
                RegistryKind::Internal,
                [(fields::INTERNAL_ID, "1"), (fields::FIRST_NAME, "Second")],
            ),
        ];
        let registries = Registries::new(internal, Vec::new());
        let found = registries.find_internal("1").expect("record");
        assert_eq!(found.first_name(), "First");
        assert!(registries.find_external("1").is_none());
    }
}

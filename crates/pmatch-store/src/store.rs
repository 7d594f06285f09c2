//! Decision store implementations.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tracing::{debug, info};

use pmatch_model::{Decision, MatchKey, MatchResult, MatchStatus};

use crate::error::{Result, StoreError};
use crate::table::DecisionTable;

/// Persistence for review decisions on proposed matches.
///
/// Rows are identified by [`MatchKey`]; identifiers are compared exactly.
/// Scores are never stored: callers rebuild them from the registries.
pub trait DecisionStore {
    /// Add a pending row for each result whose key is not yet stored.
    /// Existing rows keep their status. Returns the number of rows added.
    fn append_all(&mut self, results: &[MatchResult]) -> Result<usize>;

    /// Replace every stored row with a pending row per result in a single
    /// write. On failure the previous rows are left in place. Returns the
    /// number of rows stored.
    fn replace_all(&mut self, results: &[MatchResult]) -> Result<usize>;

    /// Every stored decision, ordered by key.
    fn read_all(&self) -> Result<Vec<Decision>>;

    /// Delete a row. Returns false if the key was not stored.
    fn remove_by_key(&mut self, key: &MatchKey) -> Result<bool>;

    /// Change the status of a stored row. Returns false if the key was not stored.
    fn set_status(&mut self, key: &MatchKey, status: MatchStatus) -> Result<bool>;

    fn set_status_approved(&mut self, key: &MatchKey) -> Result<bool> {
        self.set_status(key, MatchStatus::Approved)
    }

    fn is_empty(&self) -> Result<bool>;

    fn clear(&mut self) -> Result<()>;
}

fn append_results(table: &mut DecisionTable, results: &[MatchResult]) -> usize {
    results
        .iter()
        .filter(|result| table.insert_if_absent(result.key(), result.status))
        .count()
}

/// Decision table kept in a CSV file.
///
/// Every mutation loads the file, applies the change and rewrites the whole
/// table through a temp file that is renamed over the original.
#[derive(Debug, Clone)]
pub struct CsvDecisionStore {
    path: PathBuf,
}

impl CsvDecisionStore {
    /// File name used inside a data directory.
    pub const FILE_NAME: &'static str = "matches.csv";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<data_dir>/matches.csv`.
    pub fn in_dir(data_dir: &Path) -> Self {
        Self::new(data_dir.join(Self::FILE_NAME))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the table. A missing file is an empty table.
    pub fn load(&self) -> Result<DecisionTable> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "decision file absent; starting empty");
                return Ok(DecisionTable::new());
            }
            Err(e) => {
                return Err(StoreError::Io {
                    operation: "open",
                    path: self.path.clone(),
                    source: e,
                });
            }
        };
        let table = DecisionTable::from_reader(file, &self.path)?;
        debug!(
            path = %self.path.display(),
            row_count = table.len(),
            "loaded decision table"
        );
        Ok(table)
    }

    /// Replace the file contents with `table`.
    pub fn save(&self, table: &DecisionTable) -> Result<()> {
        let start = Instant::now();
        let bytes = table.to_csv_bytes(&self.path)?;
        write_atomic(&self.path, &bytes)?;
        info!(
            path = %self.path.display(),
            row_count = table.len(),
            duration_ms = start.elapsed().as_millis(),
            "saved decision table"
        );
        Ok(())
    }

    /// Load, apply `change`, and save only if it reports a modification.
    fn update<T>(&self, change: impl FnOnce(&mut DecisionTable) -> (T, bool)) -> Result<T> {
        let mut table = self.load()?;
        let (outcome, modified) = change(&mut table);
        if modified {
            self.save(&table)?;
        }
        Ok(outcome)
    }
}

impl DecisionStore for CsvDecisionStore {
    fn append_all(&mut self, results: &[MatchResult]) -> Result<usize> {
        self.update(|table| {
            let added = append_results(table, results);
            (added, added > 0)
        })
    }

    fn replace_all(&mut self, results: &[MatchResult]) -> Result<usize> {
        let mut table = DecisionTable::new();
        let stored = append_results(&mut table, results);
        self.save(&table)?;
        Ok(stored)
    }

    fn read_all(&self) -> Result<Vec<Decision>> {
        Ok(self.load()?.decisions())
    }

    fn remove_by_key(&mut self, key: &MatchKey) -> Result<bool> {
        self.update(|table| {
            let removed = table.remove(key);
            (removed, removed)
        })
    }

    fn set_status(&mut self, key: &MatchKey, status: MatchStatus) -> Result<bool> {
        self.update(|table| {
            let changed = table.set_status(key, status);
            (changed, changed)
        })
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.load()?.is_empty())
    }

    fn clear(&mut self) -> Result<()> {
        self.save(&DecisionTable::new())
    }
}

/// Write `bytes` to `path` through a synced temp file and a rename, so a
/// crash leaves either the old table or the new one.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = path.with_extension("csv.tmp");

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| StoreError::Io {
            operation: "create directory",
            path: parent.to_path_buf(),
            source: e,
        })?;
    }

    let mut file = File::create(&temp_path).map_err(|e| StoreError::Io {
        operation: "create",
        path: temp_path.clone(),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| StoreError::Io {
        operation: "write",
        path: temp_path.clone(),
        source: e,
    })?;
    file.sync_all().map_err(|e| StoreError::Io {
        operation: "sync",
        path: temp_path.clone(),
        source: e,
    })?;
    drop(file);

    fs::rename(&temp_path, path).map_err(|e| StoreError::AtomicWriteFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source: e,
    })
}

/// Decision table held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryDecisionStore {
    table: DecisionTable,
}

impl MemoryDecisionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn table(&self) -> &DecisionTable {
        &self.table
    }
}

impl DecisionStore for MemoryDecisionStore {
    fn append_all(&mut self, results: &[MatchResult]) -> Result<usize> {
        Ok(append_results(&mut self.table, results))
    }

    fn replace_all(&mut self, results: &[MatchResult]) -> Result<usize> {
        let mut table = DecisionTable::new();
        let stored = append_results(&mut table, results);
        self.table = table;
        Ok(stored)
    }

    fn read_all(&self) -> Result<Vec<Decision>> {
        Ok(self.table.decisions())
    }

    fn remove_by_key(&mut self, key: &MatchKey) -> Result<bool> {
        Ok(self.table.remove(key))
    }

    fn set_status(&mut self, key: &MatchKey, status: MatchStatus) -> Result<bool> {
        Ok(self.table.set_status(key, status))
    }

    fn is_empty(&self) -> Result<bool> {
        Ok(self.table.is_empty())
    }

    fn clear(&mut self) -> Result<()> {
        self.table.clear();
        Ok(())
    }
}

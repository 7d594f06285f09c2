//! Review workflow stages shared by the subcommands.
//!
//! 1. **Configure**: load and validate matching options
//! 2. **Load**: read both registries from the data directory
//! 3. **Match**: full scan, optionally persisted as pending decisions
//! 4. **Search**: query-filtered top matches
//! 5. **Review**: persisted decisions joined back to fresh records
//! 6. **Decide**: approve, deny or reset one pair

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result, anyhow};
use tracing::{debug, info, warn};

use pmatch_core::{
    MatchEngine, MatchExplanation, pending_matches, reconcile_decisions, run_full_scan,
};
use pmatch_ingest::{CsvRegistry, Registries};
use pmatch_model::{MatchKey, MatchOptions, MatchResult, MatchStatus, PatientRecord};
use pmatch_store::DecisionStore;

use crate::logging::redact_value;

/// Queries shorter than this (in characters, after trimming) match nothing.
pub const MIN_QUERY_CHARS: usize = 3;

// ============================================================================
// Stage 1: Configure
// ============================================================================

/// Read matching options from a TOML file, or the defaults when no file is given.
pub fn load_options(path: Option<&Path>) -> Result<MatchOptions> {
    let Some(path) = path else {
        return Ok(MatchOptions::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    let options: MatchOptions =
        toml::from_str(&text).with_context(|| format!("parse config {}", path.display()))?;
    options
        .validate()
        .with_context(|| format!("validate config {}", path.display()))?;
    debug!(path = %path.display(), ?options, "loaded matching options");
    Ok(options)
}

// ============================================================================
// Stage 2: Load
// ============================================================================

/// Load `internal.csv` and `external.csv` from `data_dir`.
pub fn load_registries(data_dir: &Path) -> Result<Registries> {
    Registries::load(&CsvRegistry::new(data_dir))
        .with_context(|| format!("load registries from {}", data_dir.display()))
}

// ============================================================================
// Stage 3: Match
// ============================================================================

/// Load both registries from `data_dir` and rank every admitted pair.
pub fn compute_matches(data_dir: &Path, options: MatchOptions) -> Result<Vec<MatchResult>> {
    run_full_scan(&CsvRegistry::new(data_dir), options)
        .with_context(|| format!("match registries in {}", data_dir.display()))
}

/// What happened when match results were offered to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// Rows were written to an empty store.
    Written { added: usize },
    /// The store already held decisions and was left untouched.
    /// `undecided` counts results that have no stored decision.
    StoreNotEmpty { undecided: usize },
}

/// Persist `matches` as pending decisions.
///
/// Only an empty store is written to, so earlier review work is never
/// mixed with a new run. `replace` swaps the stored rows for `matches` in
/// one write; if that write fails the earlier decisions are kept.
pub fn persist_matches<S: DecisionStore + ?Sized>(
    store: &mut S,
    matches: &[MatchResult],
    replace: bool,
) -> Result<PersistOutcome> {
    if replace {
        let added = store
            .replace_all(matches)
            .context("replace decision store")?;
        info!(added, "replaced stored decisions with pending matches");
        return Ok(PersistOutcome::Written { added });
    }
    if !store.is_empty().context("inspect decision store")? {
        let decisions = store.read_all().context("read decision store")?;
        let undecided = pending_matches(matches.to_vec(), &decisions).len();
        warn!(
            stored = decisions.len(),
            undecided, "decision store already has rows; not persisting this run"
        );
        return Ok(PersistOutcome::StoreNotEmpty { undecided });
    }
    let added = store
        .append_all(matches)
        .context("append matches to decision store")?;
    info!(added, "persisted pending matches");
    Ok(PersistOutcome::Written { added })
}

// ============================================================================
// Stage 4: Search
// ============================================================================

/// Search-box behavior on top of the engine: short queries return nothing.
pub fn search(engine: &MatchEngine<'_>, query: &str) -> Vec<MatchResult> {
    let query = query.trim();
    if query.chars().count() < MIN_QUERY_CHARS {
        debug!(min_chars = MIN_QUERY_CHARS, "query too short; skipping search");
        return Vec::new();
    }
    let start = Instant::now();
    let results = engine.find_likely_patient_matches(query);
    info!(
        query = %redact_value(query),
        result_count = results.len(),
        duration_ms = start.elapsed().as_millis(),
        "search finished"
    );
    results
}

// ============================================================================
// Stage 5: Review
// ============================================================================

/// Which decisions to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StatusFilter {
    #[default]
    All,
    Only(MatchStatus),
}

impl StatusFilter {
    pub fn accepts(self, status: MatchStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => wanted == status,
        }
    }
}

/// Persisted decisions rebuilt into match results.
#[derive(Debug, Clone, Default)]
pub struct ReviewList {
    pub matches: Vec<MatchResult>,
    /// Stored keys whose records are gone from a registry.
    pub missing: Vec<MatchKey>,
}

/// Read every decision, recompute its score, and keep those passing `filter`.
pub fn review<S: DecisionStore + ?Sized>(
    store: &S,
    registries: &Registries,
    options: &MatchOptions,
    filter: StatusFilter,
) -> Result<ReviewList> {
    let decisions = store.read_all().context("read decision store")?;
    let reconciled = reconcile_decisions(registries, &decisions, options);
    let matches: Vec<MatchResult> = reconciled
        .matches
        .into_iter()
        .filter(|result| filter.accepts(result.status))
        .collect();
    debug!(
        decision_count = decisions.len(),
        listed = matches.len(),
        missing = reconciled.missing.len(),
        "review list built"
    );
    Ok(ReviewList {
        matches,
        missing: reconciled.missing,
    })
}

// ============================================================================
// Stage 6: Decide
// ============================================================================

/// A reviewer's verdict on one proposed pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    /// Mark the pair approved.
    Approve,
    /// Drop the pair from the store.
    Deny,
    /// Put the pair back to pending.
    Reset,
}

impl ReviewAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Deny => "deny",
            Self::Reset => "reset",
        }
    }
}

/// Apply `action` to the stored row for `key`.
///
/// Errors if the key has no stored row.
pub fn apply_decision<S: DecisionStore + ?Sized>(
    store: &mut S,
    key: &MatchKey,
    action: ReviewAction,
) -> Result<()> {
    let changed = match action {
        ReviewAction::Approve => store.set_status_approved(key),
        ReviewAction::Deny => store.remove_by_key(key),
        ReviewAction::Reset => store.set_status(key, MatchStatus::None),
    }
    .with_context(|| format!("{} {key}", action.label()))?;
    if !changed {
        return Err(anyhow!("no stored match for {key}"));
    }
    info!(
        action = action.label(),
        external_id = %key.external_id,
        internal_id = %key.internal_id,
        "decision recorded"
    );
    Ok(())
}

/// Look up both records of `key` and explain how they compare.
pub fn explain_pair<'a>(
    engine: &MatchEngine<'a>,
    key: &MatchKey,
) -> Result<(&'a PatientRecord, &'a PatientRecord, MatchExplanation)> {
    let registries = engine.registries();
    let internal = registries
        .find_internal(&key.internal_id)
        .ok_or_else(|| anyhow!("internal patient '{}' not found", key.internal_id))?;
    let external = registries
        .find_external(&key.external_id)
        .ok_or_else(|| anyhow!("external patient '{}' not found", key.external_id))?;
    Ok((internal, external, engine.explain(internal, external)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_accepts() {
        assert!(StatusFilter::All.accepts(MatchStatus::Denied));
        assert!(StatusFilter::Only(MatchStatus::None).accepts(MatchStatus::None));
        assert!(!StatusFilter::Only(MatchStatus::Approved).accepts(MatchStatus::None));
    }

    #[test]
    fn missing_config_path_uses_defaults() {
        assert_eq!(load_options(None).unwrap(), MatchOptions::default());
    }
}

//! Joining persisted review decisions back to registry records.
//!
//! The decision table stores only identifier pairs and a status. Scores are
//! always recomputed from the current registry contents rather than trusted
//! from disk.

use std::collections::BTreeSet;

use tracing::warn;

use pmatch_ingest::Registries;
use pmatch_model::{Decision, MatchKey, MatchOptions, MatchResult};

use crate::engine::sort_by_score_desc;
use crate::score::calculate_match_score;

/// Decisions rebuilt into full match results.
#[derive(Debug, Clone, Default)]
pub struct ReconciledDecisions {
    pub matches: Vec<MatchResult>,
    /// Keys whose internal or external record no longer exists.
    pub missing: Vec<MatchKey>,
}

/// Rebuild match results from persisted decisions, best score first.
pub fn reconcile_decisions(
    registries: &Registries,
    decisions: &[Decision],
    options: &MatchOptions,
) -> ReconciledDecisions {
    let mut reconciled = ReconciledDecisions::default();
    for decision in decisions {
        let key = &decision.key;
        let internal = registries.find_internal(&key.internal_id);
        let external = registries.find_external(&key.external_id);
        match (internal, external) {
            (Some(internal), Some(external)) => {
                let score = calculate_match_score(internal, external, options);
                reconciled.matches.push(
                    MatchResult::new(internal.clone(), external.clone(), score)
                        .with_status(decision.status),
                );
            }
            _ => {
                warn!(
                    internal_id = %key.internal_id,
                    external_id = %key.external_id,
                    internal_found = internal.is_some(),
                    external_found = external.is_some(),
                    "decision references a missing patient record"
                );
                reconciled.missing.push(key.clone());
            }
        }
    }
    sort_by_score_desc(&mut reconciled.matches);
    reconciled
}

/// Computed matches that have no persisted decision yet.
pub fn pending_matches(computed: Vec<MatchResult>, decisions: &[Decision]) -> Vec<MatchResult> {
    let decided: BTreeSet<&MatchKey> = decisions.iter().map(|decision| &decision.key).collect();
    computed
        .into_iter()
        .filter(|result| !decided.contains(&result.key()))
        .collect()
}

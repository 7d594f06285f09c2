//! Matching orchestration over two loaded registries.
//!
//! Both retrieval modes share one evaluation path: compare the pair, gate it
//! with the predicate, score it, and shape the score with a
//! [`ScoringProfile`]. The bulk scan ranks every admitted pair; the search
//! pre-filters internal records by query relevance and keeps only the top few.

use std::cmp::Ordering;
use std::time::Instant;

use tracing::{debug, info, info_span};

use pmatch_ingest::{Registries, RegistryReader};
use pmatch_model::{MatchOptions, MatchResult, PatientRecord};

use crate::compare::FieldComparison;
use crate::error::Result;
use crate::query::query_relevance;
use crate::score::{ScoreBreakdown, ScoringProfile};

/// Predicate verdict and score breakdown for one pair.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchExplanation {
    pub comparison: FieldComparison,
    pub is_match: bool,
    pub breakdown: ScoreBreakdown,
}

/// Matcher bound to a caller-owned registry handle.
#[derive(Debug, Clone)]
pub struct MatchEngine<'a> {
    registries: &'a Registries,
    options: MatchOptions,
}

impl<'a> MatchEngine<'a> {
    /// Create an engine after validating the options.
    pub fn new(registries: &'a Registries, options: MatchOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            registries,
            options,
        })
    }

    /// Engine with the default parameters.
    pub fn with_defaults(registries: &'a Registries) -> Self {
        Self {
            registries,
            options: MatchOptions::default(),
        }
    }

    pub fn registries(&self) -> &'a Registries {
        self.registries
    }

    /// Score for a pair under the given profile, or `None` if the predicate
    /// rejects it.
    fn evaluate(
        &self,
        internal: &PatientRecord,
        external: &PatientRecord,
        profile: ScoringProfile,
    ) -> Option<f64> {
        let comparison = FieldComparison::compare(internal, external, &self.options);
        if !comparison.is_match(&self.options) {
            return None;
        }
        let pair_score = ScoreBreakdown::from_comparison(&comparison, &self.options).score;
        Some(profile.combine(pair_score, &self.options.query))
    }

    /// Every admitted pair of the full cross product, best first.
    pub fn find_all_patient_matches(&self) -> Vec<MatchResult> {
        let span = info_span!(
            "full_scan",
            internal_count = self.registries.internal().len(),
            external_count = self.registries.external().len()
        );
        let _guard = span.enter();
        let start = Instant::now();

        let mut matches = Vec::new();
        for internal in self.registries.internal() {
            for external in self.registries.external() {
                if let Some(score) = self.evaluate(internal, external, ScoringProfile::Pair) {
                    matches.push(MatchResult::new(internal.clone(), external.clone(), score));
                }
            }
        }
        sort_by_score_desc(&mut matches);

        info!(
            match_count = matches.len(),
            duration_ms = start.elapsed().as_millis(),
            "full scan complete"
        );
        matches
    }

    /// Top matches for internal records relevant to `query`, best first.
    ///
    /// Stops collecting once the candidate cap is reached, then returns at
    /// most the configured result limit.
    pub fn find_likely_patient_matches(&self, query: &str) -> Vec<MatchResult> {
        let query_options = self.options.query;
        let start = Instant::now();

        let mut candidates = Vec::new();
        let mut relevant_internal = 0usize;
        'internal: for internal in self.registries.internal() {
            let Some(relevance) = query_relevance(query, internal, &self.options) else {
                continue;
            };
            relevant_internal += 1;
            let profile = ScoringProfile::Query { relevance };
            for external in self.registries.external() {
                if let Some(score) = self.evaluate(internal, external, profile) {
                    candidates.push(MatchResult::new(internal.clone(), external.clone(), score));
                    if candidates.len() >= query_options.candidate_cap {
                        break 'internal;
                    }
                }
            }
        }
        sort_by_score_desc(&mut candidates);
        candidates.truncate(query_options.result_limit);

        debug!(
            relevant_internal,
            result_count = candidates.len(),
            duration_ms = start.elapsed().as_millis(),
            "search complete"
        );
        candidates
    }

    /// Full comparison detail for one pair, regardless of the predicate.
    pub fn explain(&self, internal: &PatientRecord, external: &PatientRecord) -> MatchExplanation {
        let comparison = FieldComparison::compare(internal, external, &self.options);
        MatchExplanation {
            comparison,
            is_match: comparison.is_match(&self.options),
            breakdown: ScoreBreakdown::from_comparison(&comparison, &self.options),
        }
    }
}

/// Load both registries and run a full scan.
///
/// A registry read failure is returned to the caller rather than producing
/// an empty match list.
pub fn run_full_scan<R: RegistryReader + ?Sized>(
    reader: &R,
    options: MatchOptions,
) -> Result<Vec<MatchResult>> {
    let registries = Registries::load(reader)?;
    let engine = MatchEngine::new(&registries, options)?;
    Ok(engine.find_all_patient_matches())
}

pub(crate) fn sort_by_score_desc(matches: &mut [MatchResult]) {
    matches.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
}

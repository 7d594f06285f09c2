//! Weighted confidence score for admitted pairs.
//!
//! Each field contributes `weight * (exact ? 1.0 : proxy)`. Date of birth and
//! phone have no partial credit. The weighted sum is then lifted by an
//! exact-match bonus applied to the remaining headroom, so the result stays
//! within [0, 1] and the bonus shrinks as the base score approaches 1.

use pmatch_model::{MatchOptions, PatientRecord, QueryOptions, fields};

use crate::compare::FieldComparison;

/// One field's share of the score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldContribution {
    pub field: &'static str,
    pub exact: bool,
    /// 1.0 on an exact match, otherwise the fuzzy proxy.
    pub value: f64,
    pub weight: f64,
}

impl FieldContribution {
    fn new(field: &'static str, exact: bool, proxy: f64, weight: f64) -> Self {
        Self {
            field,
            exact,
            value: if exact { 1.0 } else { proxy },
            weight,
        }
    }

    pub fn weighted(&self) -> f64 {
        self.value * self.weight
    }
}

/// Breakdown of a confidence score for explainability.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreBreakdown {
    pub contributions: [FieldContribution; 5],
    /// Weighted average before the bonus.
    pub base: f64,
    pub exact_count: usize,
    pub bonus: f64,
    pub score: f64,
}

impl ScoreBreakdown {
    pub fn from_comparison(comparison: &FieldComparison, options: &MatchOptions) -> Self {
        let weights = &options.weights;
        let contributions = [
            FieldContribution::new(
                fields::FIRST_NAME,
                comparison.first_name_match,
                comparison.first_name_similarity,
                weights.first_name,
            ),
            FieldContribution::new(
                fields::LAST_NAME,
                comparison.last_name_match,
                comparison.last_name_similarity,
                weights.last_name,
            ),
            FieldContribution::new(fields::DOB, comparison.dob_match, 0.0, weights.dob),
            FieldContribution::new(
                fields::PHONE_NUMBER,
                comparison.phone_match,
                0.0,
                weights.phone,
            ),
            FieldContribution::new(
                fields::ADDRESS,
                comparison.address_match,
                comparison.combined_address_score(),
                weights.address,
            ),
        ];

        let total_weight = weights.total();
        let weighted: f64 = contributions.iter().map(FieldContribution::weighted).sum();
        let base = if total_weight > 0.0 {
            weighted / total_weight
        } else {
            0.0
        };

        let exact_count = comparison.exact_count();
        let bonus = options
            .bonus
            .bonus(comparison.name_matched(), exact_count);
        let score = (base + (1.0 - base) * bonus).min(1.0);

        Self {
            contributions,
            base,
            exact_count,
            bonus,
            score,
        }
    }

    /// Human-readable explanation, e.g. `LastName: 25%; DOB: 25%; bonus: +5%`.
    pub fn explain(&self) -> String {
        let mut parts: Vec<String> = self
            .contributions
            .iter()
            .map(|c| format!("{}: {:.0}%", c.field, c.weighted() * 100.0))
            .collect();
        if self.bonus > 0.0 {
            parts.push(format!("bonus: +{:.0}%", self.bonus * 100.0));
        }
        parts.join("; ")
    }
}

/// Confidence in [0, 1] that two records denote the same patient.
///
/// Meant for pairs that already passed the match predicate; calling it on
/// other pairs is allowed and still yields a bounded score.
pub fn calculate_match_score(
    internal: &PatientRecord,
    external: &PatientRecord,
    options: &MatchOptions,
) -> f64 {
    let comparison = FieldComparison::compare(internal, external, options);
    ScoreBreakdown::from_comparison(&comparison, options).score
}

/// How the final ranking score is formed from the pair score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoringProfile {
    /// Bulk reconciliation: the pair score as is.
    Pair,
    /// Interactive search: blend query relevance with the pair score.
    Query { relevance: f64 },
}

impl ScoringProfile {
    pub fn combine(self, pair_score: f64, options: &QueryOptions) -> f64 {
        match self {
            Self::Pair => pair_score,
            Self::Query { relevance } => {
                let weight = options.relevance_weight;
                (weight * relevance + (1.0 - weight) * pair_score).clamp(0.0, 1.0)
            }
        }
    }
}

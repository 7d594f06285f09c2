//! Tunable parameters for matching.
//!
//! The defaults reproduce the behavior the review team calibrated against
//! real registry extracts. Every field is optional in a config file; anything
//! left out keeps its default.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Per-field weights for the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldWeights {
    pub first_name: f64,
    pub last_name: f64,
    pub dob: f64,
    pub phone: f64,
    pub address: f64,
}

impl Default for FieldWeights {
    fn default() -> Self {
        Self {
            first_name: 0.15,
            last_name: 0.25,
            dob: 0.25,
            phone: 0.20,
            address: 0.15,
        }
    }
}

impl FieldWeights {
    #[must_use]
    pub fn total(&self) -> f64 {
        self.first_name + self.last_name + self.dob + self.phone + self.address
    }

    fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("first_name", self.first_name),
            ("last_name", self.last_name),
            ("dob", self.dob),
            ("phone", self.phone),
            ("address", self.address),
        ]
    }
}

/// Exact-match bonus tiers applied against the remaining headroom.
///
/// A tier only applies when the first or last name matched exactly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BonusTiers {
    pub strong_count: usize,
    pub strong_bonus: f64,
    pub weak_count: usize,
    pub weak_bonus: f64,
}

impl Default for BonusTiers {
    fn default() -> Self {
        Self {
            strong_count: 3,
            strong_bonus: 0.10,
            weak_count: 2,
            weak_bonus: 0.05,
        }
    }
}

impl BonusTiers {
    /// Bonus for `exact_count` exact field matches.
    #[must_use]
    pub fn bonus(&self, name_matched: bool, exact_count: usize) -> f64 {
        if !name_matched {
            0.0
        } else if exact_count >= self.strong_count {
            self.strong_bonus
        } else if exact_count >= self.weak_count {
            self.weak_bonus
        } else {
            0.0
        }
    }
}

/// Parameters of the interactive, query-filtered search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryOptions {
    /// Name similarity a record must exceed to survive the pre-filter.
    pub name_threshold: f64,
    /// Share of the final score taken by query relevance.
    pub relevance_weight: f64,
    /// Candidates collected before ranking.
    pub candidate_cap: usize,
    /// Results returned after ranking.
    pub result_limit: usize,
    /// Shortest normalized query that may match on address.
    pub min_address_query_len: usize,
}

impl Default for QueryOptions {
    fn default() -> Self {
        Self {
            name_threshold: 0.7,
            relevance_weight: 0.7,
            candidate_cap: 10,
            result_limit: 5,
            min_address_query_len: 4,
        }
    }
}

/// All matching parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchOptions {
    /// Two-digit years below the pivot expand to 20YY, otherwise 19YY.
    pub year_pivot: u32,
    /// First and last name similarity both above this admit a pair.
    pub name_similarity_threshold: f64,
    /// Address similarity above this (with a close last name) admits a pair.
    pub address_similarity_threshold: f64,
    /// Last name similarity required alongside a close address.
    pub address_last_name_threshold: f64,
    pub weights: FieldWeights,
    pub bonus: BonusTiers,
    pub query: QueryOptions,
}

impl Default for MatchOptions {
    fn default() -> Self {
        Self {
            year_pivot: 50,
            name_similarity_threshold: 0.8,
            address_similarity_threshold: 0.7,
            address_last_name_threshold: 0.7,
            weights: FieldWeights::default(),
            bonus: BonusTiers::default(),
            query: QueryOptions::default(),
        }
    }
}

impl MatchOptions {
    #[must_use]
    pub fn with_query(mut self, query: QueryOptions) -> Self {
        self.query = query;
        self
    }

    /// Check that every parameter is within its meaningful range.
    pub fn validate(&self) -> Result<()> {
        for (name, weight) in self.weights.as_array() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(ModelError::InvalidOptions(format!(
                    "weight {name} must be a non-negative number, got {weight}"
                )));
            }
        }
        if self.weights.total() <= 0.0 {
            return Err(ModelError::InvalidOptions(
                "field weights must not all be zero".to_string(),
            ));
        }
        let unit_values = [
            ("name_similarity_threshold", self.name_similarity_threshold),
            (
                "address_similarity_threshold",
                self.address_similarity_threshold,
            ),
            (
                "address_last_name_threshold",
                self.address_last_name_threshold,
            ),
            ("bonus.strong_bonus", self.bonus.strong_bonus),
            ("bonus.weak_bonus", self.bonus.weak_bonus),
            ("query.name_threshold", self.query.name_threshold),
            ("query.relevance_weight", self.query.relevance_weight),
        ];
        for (name, value) in unit_values {
            if !(0.0..=1.0).contains(&value) {
                return Err(ModelError::InvalidOptions(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }
        if self.year_pivot > 100 {
            return Err(ModelError::InvalidOptions(format!(
                "year_pivot must be at most 100, got {}",
                self.year_pivot
            )));
        }
        if self.query.candidate_cap == 0 || self.query.result_limit == 0 {
            return Err(ModelError::InvalidOptions(
                "query candidate_cap and result_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_sum_to_one() {
        assert!((FieldWeights::default().total() - 1.0).abs() < 1e-12);
        assert!(MatchOptions::default().validate().is_ok());
    }

    #[test]
    fn bonus_requires_a_name_match() {
        let tiers = BonusTiers::default();
        assert_eq!(tiers.bonus(false, 5), 0.0);
        assert_eq!(tiers.bonus(true, 3), 0.10);
        assert_eq!(tiers.bonus(true, 2), 0.05);
        assert_eq!(tiers.bonus(true, 1), 0.0);
    }

    #[test]
    fn rejects_out_of_range_values() {
        let mut options = MatchOptions::default();
        options.weights.phone = -0.1;
        assert!(options.validate().is_err());

        let mut options = MatchOptions::default();
        options.query.relevance_weight = 1.5;
        assert!(options.validate().is_err());

        let mut options = MatchOptions::default();
        options.query.result_limit = 0;
        assert!(options.validate().is_err());
    }
}

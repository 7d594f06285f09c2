//! Field-by-field comparison of an internal and an external record, and the
//! match predicate built on it.
//!
//! Every flag and similarity is computed once per pair. The predicate and the
//! scorer both read the same [`FieldComparison`], so they can never disagree
//! about what "the last names match" means.

use pmatch_model::{MatchOptions, PatientRecord};

use crate::normalize::{normalize_date_with_pivot, normalize_text};
use crate::similarity::{similarity_ratio, token_overlap_score};

/// Exact flags and fuzzy similarities for one candidate pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldComparison {
    pub first_name_match: bool,
    pub last_name_match: bool,
    pub dob_match: bool,
    pub phone_match: bool,
    pub address_match: bool,
    pub first_name_similarity: f64,
    pub last_name_similarity: f64,
    pub address_similarity: f64,
    pub address_token_overlap: f64,
}

impl FieldComparison {
    pub fn compare(
        internal: &PatientRecord,
        external: &PatientRecord,
        options: &MatchOptions,
    ) -> Self {
        let first = (
            normalize_text(internal.first_name()),
            normalize_text(external.first_name()),
        );
        let last = (
            normalize_text(internal.last_name()),
            normalize_text(external.last_name()),
        );
        let address = (
            normalize_text(internal.address()),
            normalize_text(external.address()),
        );
        let dob_match = normalize_date_with_pivot(internal.dob(), options.year_pivot)
            == normalize_date_with_pivot(external.dob(), options.year_pivot);
        // An internal record without a phone never matches on phone, even
        // against an external record that also lacks one.
        let phone_match = !internal.phone_number().is_empty()
            && normalize_text(internal.phone_number()) == normalize_text(external.phone_number());

        Self {
            first_name_match: first.0 == first.1,
            last_name_match: last.0 == last.1,
            dob_match,
            phone_match,
            address_match: address.0 == address.1,
            first_name_similarity: similarity_ratio(&first.0, &first.1),
            last_name_similarity: similarity_ratio(&last.0, &last.1),
            address_similarity: similarity_ratio(&address.0, &address.1),
            address_token_overlap: token_overlap_score(&address.0, &address.1),
        }
    }

    /// Number of the five scored fields that matched exactly.
    pub fn exact_count(&self) -> usize {
        [
            self.first_name_match,
            self.last_name_match,
            self.dob_match,
            self.phone_match,
            self.address_match,
        ]
        .into_iter()
        .filter(|&flag| flag)
        .count()
    }

    pub fn name_matched(&self) -> bool {
        self.first_name_match || self.last_name_match
    }

    /// Average of edit-distance similarity and token overlap on address.
    pub fn combined_address_score(&self) -> f64 {
        (self.address_similarity + self.address_token_overlap) / 2.0
    }

    /// True when a name shares nothing and the date of birth does not
    /// corroborate. Takes precedence over every admitting rule.
    pub fn is_rejected(&self) -> bool {
        (self.first_name_similarity == 0.0 || self.last_name_similarity == 0.0) && !self.dob_match
    }

    /// Hard gate deciding whether the pair is a candidate match at all.
    pub fn is_match(&self, options: &MatchOptions) -> bool {
        if self.is_rejected() {
            return false;
        }
        (self.first_name_match && self.last_name_match)
            || (self.dob_match && self.last_name_match)
            || self.phone_match
            || self.address_match
            || (self.first_name_similarity > options.name_similarity_threshold
                && self.last_name_similarity > options.name_similarity_threshold)
            || (self.address_similarity > options.address_similarity_threshold
                && self.last_name_similarity > options.address_last_name_threshold)
    }
}

/// Whether two records are considered a candidate match.
pub fn are_patients_a_match(
    internal: &PatientRecord,
    external: &PatientRecord,
    options: &MatchOptions,
) -> bool {
    FieldComparison::compare(internal, external, options).is_match(options)
}

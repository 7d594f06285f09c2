//! Relevance of an internal record to a free-text search query.
//!
//! Checks run from most to least specific and the first hit decides the
//! relevance: names, then the short identifying fields, then address.

use pmatch_model::{MatchOptions, PatientRecord};

use crate::normalize::{normalize_date_with_pivot, normalize_text};
use crate::similarity::similarity_ratio;

/// Relevance of a substring hit on a name.
pub const NAME_HIT_RELEVANCE: f64 = 1.0;
/// Relevance of a hit on DOB, phone, city or zip code.
pub const FIELD_HIT_RELEVANCE: f64 = 0.8;
/// Relevance of a hit on address.
pub const ADDRESS_HIT_RELEVANCE: f64 = 0.6;

/// Relevance in [0, 1], or `None` when the record does not match the query.
pub fn query_relevance(query: &str, record: &PatientRecord, options: &MatchOptions) -> Option<f64> {
    let needle = normalize_text(query);
    if needle.is_empty() {
        return None;
    }

    if let Some(relevance) = name_relevance(&needle, record, options.query.name_threshold) {
        return Some(relevance);
    }

    if field_hit(query, &needle, record, options.year_pivot) {
        return Some(FIELD_HIT_RELEVANCE);
    }

    let address = normalize_text(record.address());
    if needle.len() >= options.query.min_address_query_len && address.contains(&needle) {
        return Some(ADDRESS_HIT_RELEVANCE);
    }

    None
}

fn name_relevance(needle: &str, record: &PatientRecord, threshold: f64) -> Option<f64> {
    let first = normalize_text(record.first_name());
    let last = normalize_text(record.last_name());
    let full = format!("{first}{last}");
    let names = [first, last, full];

    if names
        .iter()
        .any(|name| !name.is_empty() && name.contains(needle))
    {
        return Some(NAME_HIT_RELEVANCE);
    }

    let best = names
        .iter()
        .filter(|name| !name.is_empty())
        .map(|name| similarity_ratio(name, needle))
        .fold(0.0_f64, f64::max);
    (best > threshold).then_some(best)
}

fn field_hit(query: &str, needle: &str, record: &PatientRecord, year_pivot: u32) -> bool {
    let raw_query = query.trim().to_lowercase();
    let dob = record.dob();
    if !dob.is_empty() {
        let canonical_query = normalize_date_with_pivot(query, year_pivot);
        if dob.to_lowercase().contains(&raw_query)
            || normalize_date_with_pivot(dob, year_pivot).contains(&canonical_query)
        {
            return true;
        }
    }

    [record.phone_number(), record.city(), record.zip_code()]
        .into_iter()
        .map(normalize_text)
        .any(|value| !value.is_empty() && value.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmatch_model::{RegistryKind, fields};

    fn record() -> PatientRecord {
        PatientRecord::from_pairs(
            RegistryKind::Internal,
            [
                (fields::INTERNAL_ID, "I1"),
                (fields::FIRST_NAME, "Jonathan"),
                (fields::LAST_NAME, "Smith"),
                (fields::DOB, "21-Oct-1977"),
                (fields::PHONE_NUMBER, "555-0100"),
                (fields::ADDRESS, "14 Orchard Lane"),
                (fields::CITY, "Springfield"),
                (fields::ZIP_CODE, "62704"),
            ],
        )
    }

    fn relevance(query: &str) -> Option<f64> {
        query_relevance(query, &record(), &MatchOptions::default())
    }

    #[test]
    fn name_substring_is_full_relevance() {
        assert_eq!(relevance("smi"), Some(NAME_HIT_RELEVANCE));
        assert_eq!(relevance("Jonathan Smith"), Some(NAME_HIT_RELEVANCE));
    }

    #[test]
    fn near_name_uses_similarity() {
        let score = relevance("smyth").expect("near match");
        assert!((score - 0.8).abs() < 1e-12);
    }

    #[test]
    fn identifying_fields() {
        assert_eq!(relevance("1977-10-21"), Some(FIELD_HIT_RELEVANCE));
        assert_eq!(relevance("oct-1977"), Some(FIELD_HIT_RELEVANCE));
        assert_eq!(relevance("5550100"), Some(FIELD_HIT_RELEVANCE));
        assert_eq!(relevance("springf"), Some(FIELD_HIT_RELEVANCE));
        assert_eq!(relevance("6270"), Some(FIELD_HIT_RELEVANCE));
    }

    #[test]
    fn address_needs_a_long_enough_query() {
        assert_eq!(relevance("orchard"), Some(ADDRESS_HIT_RELEVANCE));
        assert_eq!(relevance("14o"), None);
    }

    #[test]
    fn blank_or_unrelated_queries_match_nothing() {
        assert_eq!(relevance("  ..  "), None);
        assert_eq!(relevance("zzzzzz"), None);
    }
}

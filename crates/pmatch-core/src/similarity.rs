//! String similarity primitives.
//!
//! Inputs are compared exactly as given; callers normalize first.

use std::collections::BTreeSet;

use rapidfuzz::distance::levenshtein;

/// Single-character insert/delete/substitute distance.
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein::distance(a.chars(), b.chars())
}

/// `1 - distance / longer length`; two empty strings are identical.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f64 / max_len as f64
}

/// Jaccard index of the whitespace-separated token sets.
///
/// Returns 0.0 when either side has no tokens.
pub fn token_overlap_score(a: &str, b: &str) -> f64 {
    let left: BTreeSet<&str> = a.split_whitespace().collect();
    let right: BTreeSet<&str> = b.split_whitespace().collect();
    if left.is_empty() || right.is_empty() {
        return 0.0;
    }
    let intersection = left.intersection(&right).count();
    let union = left.union(&right).count();
    intersection as f64 / union as f64
}

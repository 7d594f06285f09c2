//! Record-linkage engine for internal and external patient registries.
//!
//! Data flows leaves first: [`normalize`] canonicalizes fields,
//! [`similarity`] compares them, [`compare`] gates candidate pairs,
//! [`score`] ranks admitted pairs and [`engine`] runs the search.

pub mod compare;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod query;
pub mod reconcile;
pub mod score;
pub mod similarity;

pub use compare::{FieldComparison, are_patients_a_match};
pub use engine::{MatchEngine, MatchExplanation, run_full_scan};
pub use error::{CoreError, Result};
pub use normalize::{DEFAULT_YEAR_PIVOT, normalize_date, normalize_date_with_pivot, normalize_text};
pub use query::query_relevance;
pub use reconcile::{ReconciledDecisions, pending_matches, reconcile_decisions};
pub use score::{FieldContribution, ScoreBreakdown, ScoringProfile, calculate_match_score};
pub use similarity::{edit_distance, similarity_ratio, token_overlap_score};

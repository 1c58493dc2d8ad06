//! Record matching against a sanctions reference set
//!
//! # Operations
//!
//! - `exact_match` / `exact_lookup`: normalized name or alias equality
//! - `fuzzy_match`: ranked candidates at or above a 0-100 threshold
//! - `batch_search_names`: exact, then best fuzzy candidate, per name
//! - `process_new_source`: annotate a caller table, using location to narrow
//! - `search_by_location`, `search_by_id`, `search_identifiers`
//! - `get_entity_profile`
//!
//! Matching never fails per record: missing names, ambiguous hits, and
//! location corroboration are reported as [`MatchFlag`]s on the result.
//!
//! # Example
//!
//! ```rust
//! use sanctix_core::matcher::Matcher;
//! use sanctix_core::model::{EntityKey, EntityKind, ReferenceTables};
//!
//! let tables = ReferenceTables::new()
//!     .entity(27039, "Salman Raouf SALMAN", EntityKind::Individual, &["SDGT"])
//!     .alias(27039, "Andree MARQUEZ", "a.k.a.");
//! let matcher = Matcher::new(tables).unwrap();
//!
//! assert_eq!(matcher.exact_match("Andree Marquez"), Some(EntityKey(27039)));
//! let ranked = matcher.fuzzy_match("Salman Salman", 80);
//! assert_eq!(ranked[0].entity_key, EntityKey(27039));
//! ```

mod engine;
mod types;

pub use engine::Matcher;
pub use types::{
    AnnotatedRecord, EntityProfile, ExactHit, FuzzyCandidate, IdentifierQuery, IndexStats,
    MatchFlag, MatchResult, QueryRecord,
};

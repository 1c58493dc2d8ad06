//! sanctix Core Engine
//!
//! Cross-references names from new, unstructured sources against a sanctions
//! reference set held entirely in memory.
//!
//! # Modules
//!
//! - `model` - reference rows and validated entity records
//! - `normalize` - name, location, and identifier normalization
//! - `similarity` - 0-100 name similarity (edit distance + token set)
//! - `matcher` - the [`Matcher`] and its query/result types
//! - `handle` - [`MatcherHandle`] for swapping reference sets atomically
//! - `extract` - candidate names from free text
//!
//! # Example
//!
//! ```rust
//! use sanctix_core::{EntityKind, Matcher, MatchType, ReferenceTables};
//!
//! let tables = ReferenceTables::new()
//!     .entity(44522, "Samer Akil RADA", EntityKind::Individual, &["SDGT"])
//!     .address(44522, None, Some("Venezuela"));
//! let matcher = Matcher::new(tables).unwrap();
//!
//! let results = matcher.batch_search_names(&["Samer Akil Reda", "John Smith"], true);
//! assert_eq!(results[0].match_type, MatchType::Fuzzy);
//! assert_eq!(results[1].match_type, MatchType::None);
//! ```

pub mod confidence;
pub mod config;
pub mod error;
pub mod extract;
pub mod handle;
pub mod index;
pub mod matcher;
pub mod model;
pub mod normalize;
pub mod similarity;

// Re-export main types at crate root
pub use confidence::{ConfidencePolicy, ConfidenceTier, MatchType};
pub use config::MatcherConfig;
pub use error::{LoadError, MatchError, Result};
pub use extract::extract_names_from_text;
pub use handle::MatcherHandle;
pub use matcher::{
    AnnotatedRecord, EntityProfile, ExactHit, FuzzyCandidate, IdentifierQuery, IndexStats,
    MatchFlag, MatchResult, Matcher, QueryRecord,
};
pub use model::{
    AddressRecord, AliasRecord, EntityKey, EntityKind, IdentifierRecord, ReferenceEntity,
    ReferenceTables,
};
pub use similarity::Score;

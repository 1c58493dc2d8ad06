//! Matcher configuration

use serde::{Deserialize, Serialize};

use crate::similarity::Score;

/// Default minimum fuzzy score for a candidate to be returned
pub const DEFAULT_FUZZY_THRESHOLD: Score = 80;

/// Default score a fuzzy match must exceed to rate `medium` confidence
pub const DEFAULT_MEDIUM_CONFIDENCE_ABOVE: Score = 85;

/// Default number of indexed names past which fuzzy scoring is blocked
pub const DEFAULT_MAX_FUZZY_CANDIDATES: usize = 5000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Threshold used by batch and new-source matching (0-100)
    pub fuzzy_threshold: Score,
    /// Fuzzy scores strictly above this rate `medium`, the rest `low`
    pub medium_confidence_above: Score,
    /// Upper bound on names scored per fuzzy query
    pub max_fuzzy_candidates: usize,
    /// Drop honorifics (`mr`, `dr`, ...) during name normalization
    pub strip_honorifics: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
            medium_confidence_above: DEFAULT_MEDIUM_CONFIDENCE_ABOVE,
            max_fuzzy_candidates: DEFAULT_MAX_FUZZY_CANDIDATES,
            strip_honorifics: true,
        }
    }
}

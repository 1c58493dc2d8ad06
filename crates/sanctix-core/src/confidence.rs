//! Match types and confidence tiers
//!
//! The tier is a pure function of how a record matched and its score:
//!
//! ```text
//! exact                     -> high
//! fuzzy, score > cutoff     -> medium
//! fuzzy, score <= cutoff    -> low
//! none                      -> unverified
//! ```

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_MEDIUM_CONFIDENCE_ABOVE;
use crate::similarity::Score;

/// How a query record was matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
    None,
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exact => write!(f, "exact"),
            Self::Fuzzy => write!(f, "fuzzy"),
            Self::None => write!(f, "none"),
        }
    }
}

/// Categorical strength of a match
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceTier {
    Unverified,
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Whether a reviewer should look at this match before relying on it
    pub fn needs_review(&self) -> bool {
        matches!(self, Self::Low | Self::Unverified)
    }
}

impl std::fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
            Self::Unverified => write!(f, "unverified"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidencePolicy {
    pub medium_above: Score,
}

impl Default for ConfidencePolicy {
    fn default() -> Self {
        Self {
            medium_above: DEFAULT_MEDIUM_CONFIDENCE_ABOVE,
        }
    }
}

impl ConfidencePolicy {
    pub fn new(medium_above: Score) -> Self {
        Self { medium_above }
    }

    pub fn tier(&self, match_type: MatchType, score: Option<Score>) -> ConfidenceTier {
        match (match_type, score) {
            (MatchType::Exact, _) => ConfidenceTier::High,
            (MatchType::Fuzzy, Some(s)) if s > self.medium_above => ConfidenceTier::Medium,
            (MatchType::Fuzzy, _) => ConfidenceTier::Low,
            (MatchType::None, _) => ConfidenceTier::Unverified,
        }
    }
}

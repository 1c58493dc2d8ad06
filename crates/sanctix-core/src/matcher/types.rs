//! Query and result types for the matcher

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::confidence::{ConfidenceTier, MatchType};
use crate::model::{AddressRecord, AliasRecord, EntityKey, EntityKind, IdentifierRecord, ReferenceEntity};
use crate::similarity::Score;

/// One caller-supplied row of a new source.
///
/// Columns are free-form; the name and location columns are picked per call.
/// Every field is carried through to the annotated output untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryRecord {
    pub fields: BTreeMap<String, String>,
}

impl QueryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(column.into(), value.into());
        self
    }

    /// Value of `column`, or `None` when missing or blank
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(column)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryRecord {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// Advisory markers attached to a [`MatchResult`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "flag", rename_all = "snake_case")]
pub enum MatchFlag {
    /// Several distinct entities matched equally well; the lowest-ranked
    /// (first registered or lowest key) was picked
    Ambiguous { candidates: Vec<EntityKey> },
    /// The row could not be matched at all (e.g. missing name)
    InvalidInput { reason: String },
    /// The matched entity has an address at the row's location
    LocationCorroborated,
}

/// Result of matching one query name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub input_name: Option<String>,
    pub match_type: MatchType,
    pub entity_key: Option<EntityKey>,
    /// Canonical name of the matched entity
    pub matched_name: Option<String>,
    /// Alias text that produced the match, when it was not the canonical name
    pub matched_alias: Option<String>,
    /// Similarity score; only set for fuzzy matches
    pub score: Option<Score>,
    pub confidence: ConfidenceTier,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub flags: Vec<MatchFlag>,
}

impl MatchResult {
    pub(crate) fn none(input_name: Option<&str>) -> Self {
        Self {
            input_name: input_name.map(str::to_string),
            match_type: MatchType::None,
            entity_key: None,
            matched_name: None,
            matched_alias: None,
            score: None,
            confidence: ConfidenceTier::Unverified,
            flags: Vec::new(),
        }
    }

    pub(crate) fn invalid(input_name: Option<&str>, reason: &str) -> Self {
        let mut result = Self::none(input_name);
        result.flags.push(MatchFlag::InvalidInput {
            reason: reason.to_string(),
        });
        result
    }

    pub fn is_match(&self) -> bool {
        self.match_type != MatchType::None
    }

    pub fn is_ambiguous(&self) -> bool {
        self.flags.iter().any(|f| matches!(f, MatchFlag::Ambiguous { .. }))
    }

    pub fn is_invalid(&self) -> bool {
        self.flags.iter().any(|f| matches!(f, MatchFlag::InvalidInput { .. }))
    }

    pub fn is_location_corroborated(&self) -> bool {
        self.flags.contains(&MatchFlag::LocationCorroborated)
    }
}

/// One entry of a ranked fuzzy candidate list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzyCandidate {
    pub entity_key: EntityKey,
    pub score: Score,
    /// The reference name or alias that scored best for this entity
    pub matched_name: String,
    pub via_alias: bool,
}

/// Exact lookup outcome, including every entity sharing the normalized name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExactHit {
    /// First-registered holder of the name
    pub entity_key: EntityKey,
    /// All holders in registration order; more than one means ambiguous
    pub candidates: Vec<EntityKey>,
    /// Alias text when the first holder matched through an alias
    pub matched_alias: Option<String>,
}

impl ExactHit {
    pub fn is_ambiguous(&self) -> bool {
        self.candidates.len() > 1
    }
}

/// One row of an annotated new source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    /// Position of the row in the input table
    pub source_row: usize,
    pub record: QueryRecord,
    pub result: MatchResult,
    /// Reference entities linked to the row's location, when one was given
    pub location_matches: Option<usize>,
}

/// Partial identifier search: case-insensitive substring filters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierQuery {
    pub value: Option<String>,
    pub id_type: Option<String>,
}

impl IdentifierQuery {
    pub fn value(value: impl Into<String>) -> Self {
        Self {
            value: Some(value.into()),
            id_type: None,
        }
    }

    pub fn id_type(mut self, id_type: impl Into<String>) -> Self {
        self.id_type = Some(id_type.into());
        self
    }
}

/// Full view of one reference entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityProfile {
    pub key: EntityKey,
    pub name: String,
    pub kind: EntityKind,
    pub programs: Vec<String>,
    pub aliases: Vec<AliasRecord>,
    pub addresses: Vec<AddressRecord>,
    pub identifiers: Vec<IdentifierRecord>,
}

impl EntityProfile {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl From<&ReferenceEntity> for EntityProfile {
    fn from(entity: &ReferenceEntity) -> Self {
        Self {
            key: entity.key,
            name: entity.name.clone(),
            kind: entity.kind,
            programs: entity.programs.clone(),
            aliases: entity.aliases.clone(),
            addresses: entity.addresses.clone(),
            identifiers: entity.identifiers.clone(),
        }
    }
}

/// Size of a loaded reference set and its indices
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub entities: usize,
    pub aliases: usize,
    pub addresses: usize,
    pub identifiers: usize,
    pub indexed_names: usize,
    /// Normalized names shared by more than one entity
    pub ambiguous_names: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_record_blank_is_missing() {
        let record = QueryRecord::new().with("name", "   ").with("city", " Beirut ");
        assert_eq!(record.get("name"), None);
        assert_eq!(record.get("city"), Some("Beirut"));
        assert_eq!(record.get("absent"), None);
    }

    #[test]
    fn test_query_record_serializes_as_plain_map() {
        let record: QueryRecord = [("name", "Samer Reda"), ("source", "court filing")]
            .into_iter()
            .collect();
        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(json, r#"{"name":"Samer Reda","source":"court filing"}"#);
    }

    #[test]
    fn test_invalid_result_flags() {
        let result = MatchResult::invalid(None, "missing name");
        assert!(!result.is_match());
        assert!(result.is_invalid());
        assert!(!result.is_ambiguous());
        assert_eq!(result.confidence, ConfidenceTier::Unverified);
    }

    #[test]
    fn test_flag_serialization() {
        let flag = MatchFlag::Ambiguous {
            candidates: vec![EntityKey(1), EntityKey(2)],
        };
        assert_eq!(
            serde_json::to_string(&flag).unwrap(),
            r#"{"flag":"ambiguous","candidates":[1,2]}"#
        );
    }
}

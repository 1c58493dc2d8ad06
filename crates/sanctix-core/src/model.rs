//! Reference dataset types
//!
//! Two layers live here:
//!
//! - **Rows** (`EntityRow`, `AliasRow`, `AddressRow`, `IdentifierRow`) are what
//!   an upstream producer hands over, gathered into [`ReferenceTables`].
//! - **Records** (`ReferenceEntity` and its children) are the validated,
//!   joined form owned by a [`Matcher`](crate::Matcher).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::LoadError;

/// Stable key of a sanctioned entity (the list's UID).
///
/// Deserializes from either a JSON number or a numeric string, since
/// producers disagree on which one they emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct EntityKey(pub u64);

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityKey {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl FromStr for EntityKey {
    type Err = LoadError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u64>()
            .map(Self)
            .map_err(|_| LoadError::InvalidKey(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(Self(n)),
            Raw::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Kind of sanctioned party
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    #[serde(alias = "Individual")]
    Individual,
    /// Companies, groups, and other non-person parties ("Entity" upstream)
    #[serde(alias = "Organization", alias = "Entity", alias = "entity")]
    Organization,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Individual => write!(f, "individual"),
            Self::Organization => write!(f, "organization"),
        }
    }
}

// ============================================================================
// Producer rows
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityRow {
    pub key: EntityKey,
    pub name: String,
    pub kind: EntityKind,
    #[serde(default)]
    pub programs: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AliasRow {
    pub key: EntityKey,
    pub alias: String,
    /// Free text such as "a.k.a." or "f.k.a."
    #[serde(default)]
    pub alias_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AddressRow {
    pub key: EntityKey,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub address_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdentifierRow {
    pub key: EntityKey,
    pub value: String,
    #[serde(default)]
    pub id_type: String,
    #[serde(default)]
    pub country: Option<String>,
}

/// The four reference tables, joined on [`EntityKey`].
///
/// Row order matters: it is the registration order used to break ties
/// between entities that share a normalized name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub entities: Vec<EntityRow>,
    #[serde(default)]
    pub aliases: Vec<AliasRow>,
    #[serde(default)]
    pub addresses: Vec<AddressRow>,
    #[serde(default)]
    pub identifiers: Vec<IdentifierRow>,
}

impl ReferenceTables {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse tables from a JSON document with `entities`, `aliases`,
    /// `addresses`, and `identifiers` arrays.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    pub fn entity(
        mut self,
        key: u64,
        name: impl Into<String>,
        kind: EntityKind,
        programs: &[&str],
    ) -> Self {
        self.entities.push(EntityRow {
            key: EntityKey(key),
            name: name.into(),
            kind,
            programs: programs.iter().map(|p| p.to_string()).collect(),
        });
        self
    }

    pub fn alias(mut self, key: u64, alias: impl Into<String>, alias_type: impl Into<String>) -> Self {
        self.aliases.push(AliasRow {
            key: EntityKey(key),
            alias: alias.into(),
            alias_type: alias_type.into(),
        });
        self
    }

    pub fn address(mut self, key: u64, city: Option<&str>, country: Option<&str>) -> Self {
        self.addresses.push(AddressRow {
            key: EntityKey(key),
            address: None,
            city: city.map(str::to_string),
            country: country.map(str::to_string),
            address_type: None,
        });
        self
    }

    pub fn identifier(
        mut self,
        key: u64,
        value: impl Into<String>,
        id_type: impl Into<String>,
        country: Option<&str>,
    ) -> Self {
        self.identifiers.push(IdentifierRow {
            key: EntityKey(key),
            value: value.into(),
            id_type: id_type.into(),
            country: country.map(str::to_string),
        });
        self
    }
}

// ============================================================================
// Validated records
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AliasRecord {
    pub text: String,
    pub alias_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressRecord {
    pub address: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub address_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdentifierRecord {
    pub value: String,
    pub id_type: String,
    pub country: Option<String>,
}

/// One sanctioned entity with everything attached to it.
///
/// Built once at load time and never modified afterward.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceEntity {
    pub key: EntityKey,
    pub name: String,
    pub kind: EntityKind,
    pub programs: Vec<String>,
    pub aliases: Vec<AliasRecord>,
    pub addresses: Vec<AddressRecord>,
    pub identifiers: Vec<IdentifierRecord>,
}

impl ReferenceEntity {
    pub(crate) fn from_row(row: EntityRow) -> Self {
        Self {
            key: row.key,
            name: row.name.trim().to_string(),
            kind: row.kind,
            programs: row
                .programs
                .into_iter()
                .map(|p| p.trim().to_string())
                .filter(|p| !p.is_empty())
                .collect(),
            aliases: Vec::new(),
            addresses: Vec::new(),
            identifiers: Vec::new(),
        }
    }

    /// Whether this entity carries the given program tag (case-insensitive)
    pub fn in_program(&self, program: &str) -> bool {
        let program = program.trim();
        self.programs.iter().any(|p| p.eq_ignore_ascii_case(program))
    }
}

impl From<AliasRow> for AliasRecord {
    fn from(row: AliasRow) -> Self {
        Self {
            text: row.alias.trim().to_string(),
            alias_type: row.alias_type.trim().to_string(),
        }
    }
}

impl From<AddressRow> for AddressRecord {
    fn from(row: AddressRow) -> Self {
        Self {
            address: non_blank(row.address),
            city: non_blank(row.city),
            country: non_blank(row.country),
            address_type: non_blank(row.address_type),
        }
    }
}

impl From<IdentifierRow> for IdentifierRecord {
    fn from(row: IdentifierRow) -> Self {
        Self {
            value: row.value.trim().to_string(),
            id_type: row.id_type.trim().to_string(),
            country: non_blank(row.country),
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

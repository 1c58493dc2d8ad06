//! Lookup indices built once per reference set
//!
//! All maps are ordered (`BTreeMap`/`BTreeSet`) so iteration, hashing, and
//! tie-breaks are deterministic.

use std::collections::{BTreeMap, BTreeSet};

use crate::model::EntityKey;
use crate::normalize::tokens;

/// Number of leading characters of a token used as its blocking key
const BLOCK_PREFIX_LEN: usize = 3;

/// One indexed surface form (canonical name or alias) of an entity
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexedName {
    pub normalized: String,
    /// The name as it appears in the reference data
    pub display: String,
    pub key: EntityKey,
    pub via_alias: bool,
}

/// Normalized name → entity index, covering canonical names and aliases.
///
/// A normalized form shared by several distinct entities keeps every entity,
/// in registration order.
#[derive(Debug, Default, Hash)]
pub struct NameIndex {
    entries: Vec<IndexedName>,
    by_normalized: BTreeMap<String, Vec<usize>>,
    blocks: BTreeMap<String, Vec<usize>>,
}

/// Outcome of registering a name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    Added,
    /// Same entity already registered under this normalized form
    Duplicate,
    /// Normalized form already belongs to another entity (first holder given)
    Collision(EntityKey),
}

impl NameIndex {
    pub fn insert(&mut self, name: IndexedName) -> Registration {
        let positions = self.by_normalized.entry(name.normalized.clone()).or_default();
        if positions.iter().any(|&p| self.entries[p].key == name.key) {
            return Registration::Duplicate;
        }
        let outcome = match positions.first() {
            Some(&p) => Registration::Collision(self.entries[p].key),
            None => Registration::Added,
        };

        let position = self.entries.len();
        positions.push(position);
        for block in block_keys(&name.normalized) {
            let slots = self.blocks.entry(block).or_default();
            if slots.last() != Some(&position) {
                slots.push(position);
            }
        }
        self.entries.push(name);
        outcome
    }

    /// Entries whose normalized form equals `normalized`, in registration order.
    pub fn lookup<'a>(&'a self, normalized: &str) -> impl Iterator<Item = &'a IndexedName> + 'a {
        self.by_normalized
            .get(normalized)
            .into_iter()
            .flatten()
            .map(move |&p| &self.entries[p])
    }

    /// All indexed names, in registration order.
    pub fn entries(&self) -> &[IndexedName] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of normalized forms held by more than one entity
    pub fn ambiguous_count(&self) -> usize {
        self.by_normalized.values().filter(|p| p.len() > 1).count()
    }

    /// Names worth scoring against `normalized`.
    ///
    /// Up to `cap` entries every name is a candidate. Past that, only names
    /// sharing a token-prefix block with the query are kept, most shared
    /// blocks first, truncated to `cap`.
    pub fn candidates(&self, normalized: &str, cap: usize) -> Vec<&IndexedName> {
        if self.entries.len() <= cap {
            return self.entries.iter().collect();
        }

        let mut overlap: BTreeMap<usize, usize> = BTreeMap::new();
        for block in block_keys(normalized) {
            for &p in self.blocks.get(&block).into_iter().flatten() {
                *overlap.entry(p).or_default() += 1;
            }
        }

        let mut ranked: Vec<(usize, usize)> = overlap.into_iter().collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(cap);
        ranked.sort_by_key(|&(p, _)| p);

        tracing::debug!(
            indexed = self.entries.len(),
            kept = ranked.len(),
            cap,
            "fuzzy candidates capped by token blocks"
        );

        ranked.into_iter().map(|(p, _)| &self.entries[p]).collect()
    }
}

fn block_keys(normalized: &str) -> BTreeSet<String> {
    tokens(normalized)
        .map(|t| t.chars().take(BLOCK_PREFIX_LEN).collect())
        .collect()
}

/// Normalized identifier value → holders, in registration order.
#[derive(Debug, Default, Hash)]
pub struct IdentifierIndex {
    by_value: BTreeMap<String, Vec<EntityKey>>,
}

impl IdentifierIndex {
    /// Register a holder; returns the existing first holder if another
    /// entity already carries this value.
    pub fn insert(&mut self, normalized: String, key: EntityKey) -> Option<EntityKey> {
        let holders = self.by_value.entry(normalized).or_default();
        if holders.contains(&key) {
            return None;
        }
        let existing = holders.first().copied();
        holders.push(key);
        existing
    }

    pub fn first(&self, normalized: &str) -> Option<EntityKey> {
        self.by_value.get(normalized).and_then(|h| h.first().copied())
    }

    pub fn len(&self) -> usize {
        self.by_value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_value.is_empty()
    }
}

/// Normalized country and city → entities with an address there.
#[derive(Debug, Default, Hash)]
pub struct LocationIndex {
    countries: BTreeMap<String, BTreeSet<EntityKey>>,
    cities: BTreeMap<String, BTreeSet<EntityKey>>,
}

impl LocationIndex {
    pub fn insert_country(&mut self, normalized: String, key: EntityKey) {
        self.countries.entry(normalized).or_default().insert(key);
    }

    pub fn insert_city(&mut self, normalized: String, key: EntityKey) {
        self.cities.entry(normalized).or_default().insert(key);
    }

    pub fn by_country(&self, normalized: &str) -> impl Iterator<Item = EntityKey> + '_ {
        self.countries.get(normalized).into_iter().flatten().copied()
    }

    pub fn by_city(&self, normalized: &str) -> impl Iterator<Item = EntityKey> + '_ {
        self.cities.get(normalized).into_iter().flatten().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty() && self.cities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name(normalized: &str, key: u64, via_alias: bool) -> IndexedName {
        IndexedName {
            normalized: normalized.to_string(),
            display: normalized.to_uppercase(),
            key: EntityKey(key),
            via_alias,
        }
    }

    #[test]
    fn test_collisions_kept_in_order() {
        let mut index = NameIndex::default();
        assert_eq!(index.insert(name("akil rada", 44499, true)), Registration::Added);
        assert_eq!(
            index.insert(name("akil rada", 44522, true)),
            Registration::Collision(EntityKey(44499))
        );
        assert_eq!(index.insert(name("akil rada", 44522, false)), Registration::Duplicate);

        let keys: Vec<EntityKey> = index.lookup("akil rada").map(|n| n.key).collect();
        assert_eq!(keys, vec![EntityKey(44499), EntityKey(44522)]);
        assert_eq!(index.len(), 2);
        assert_eq!(index.ambiguous_count(), 1);
    }

    #[test]
    fn test_lookup_missing() {
        let index = NameIndex::default();
        assert_eq!(index.lookup("nobody").count(), 0);
    }

    #[test]
    fn test_candidates_uncapped_returns_all() {
        let mut index = NameIndex::default();
        index.insert(name("salman raouf salman", 1, false));
        index.insert(name("andree marquez", 1, true));
        assert_eq!(index.candidates("zzz", 10).len(), 2);
    }

    #[test]
    fn test_candidates_capped_by_blocks() {
        let mut index = NameIndex::default();
        index.insert(name("salman raouf salman", 1, false));
        index.insert(name("andree marquez", 1, true));
        index.insert(name("samer akil rada", 2, false));
        index.insert(name("amer mohamed akil rada", 3, false));

        let kept: Vec<EntityKey> = index.candidates("akil rada", 1).iter().map(|n| n.key).collect();
        assert_eq!(kept, vec![EntityKey(2)]);

        let kept: Vec<EntityKey> = index.candidates("akil rada", 3).iter().map(|n| n.key).collect();
        assert_eq!(kept, vec![EntityKey(2), EntityKey(3)]);
    }

    #[test]
    fn test_identifier_first_holder_wins() {
        let mut index = IdentifierIndex::default();
        assert_eq!(index.insert("AD059541".into(), EntityKey(1)), None);
        assert_eq!(index.insert("AD059541".into(), EntityKey(2)), Some(EntityKey(1)));
        assert_eq!(index.first("AD059541"), Some(EntityKey(1)));
        assert_eq!(index.first("XX"), None);
    }

    #[test]
    fn test_location_sets() {
        let mut index = LocationIndex::default();
        assert!(index.is_empty());
        index.insert_country("venezuela".into(), EntityKey(44522));
        index.insert_country("venezuela".into(), EntityKey(44522));
        index.insert_city("caracas".into(), EntityKey(44499));
        assert_eq!(index.by_country("venezuela").collect::<Vec<_>>(), vec![EntityKey(44522)]);
        assert_eq!(index.by_city("caracas").count(), 1);
        assert_eq!(index.by_city("beirut").count(), 0);
    }
}

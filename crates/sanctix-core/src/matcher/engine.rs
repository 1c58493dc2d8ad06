//! Matcher - reference indexing and query operations

use std::collections::{BTreeMap, BTreeSet};
use std::hash::{Hash, Hasher};

use ahash::AHasher;
use tracing::{debug, info, warn};

use super::types::{
    AnnotatedRecord, EntityProfile, ExactHit, FuzzyCandidate, IdentifierQuery, IndexStats,
    MatchFlag, MatchResult, QueryRecord,
};
use crate::confidence::{ConfidencePolicy, MatchType};
use crate::config::MatcherConfig;
use crate::error::{LoadError, MatchError, Result};
use crate::index::{IdentifierIndex, IndexedName, LocationIndex, NameIndex, Registration};
use crate::model::{
    AddressRecord, AliasRecord, EntityKey, IdentifierRecord, ReferenceEntity, ReferenceTables,
};
use crate::normalize::{normalize_identifier, normalize_location, normalize_name_with};
use crate::similarity::{self, Score};

/// A name-level candidate considered while resolving one query
#[derive(Debug, Clone)]
struct Candidate {
    key: EntityKey,
    score: Option<Score>,
    matched_alias: Option<String>,
}

/// Resolution of one query name before location corroboration
#[derive(Debug)]
struct Resolution {
    result: MatchResult,
    /// Ranked name candidates the result was chosen from
    candidates: Vec<Candidate>,
}

impl Resolution {
    fn settled(result: MatchResult) -> Self {
        Self {
            result,
            candidates: Vec::new(),
        }
    }
}

/// In-memory sanctions reference set with exact, fuzzy, location, and
/// identifier lookups.
///
/// Built once from [`ReferenceTables`] and read-only afterward: every query
/// takes `&self`, so one instance can serve any number of readers.
#[derive(Debug)]
pub struct Matcher {
    entities: BTreeMap<EntityKey, ReferenceEntity>,
    names: NameIndex,
    identifiers: IdentifierIndex,
    locations: LocationIndex,
    config: MatcherConfig,
    policy: ConfidencePolicy,
    stats: IndexStats,
}

impl Matcher {
    /// Validate and index a reference set with default configuration
    pub fn new(tables: ReferenceTables) -> std::result::Result<Self, LoadError> {
        Self::with_config(tables, MatcherConfig::default())
    }

    /// Validate and index a reference set.
    ///
    /// Canonical names are registered in entity-table order, then aliases in
    /// alias-table order; that order decides which entity wins a shared name.
    pub fn with_config(
        tables: ReferenceTables,
        config: MatcherConfig,
    ) -> std::result::Result<Self, LoadError> {
        let ReferenceTables {
            entities: entity_rows,
            aliases,
            addresses,
            identifiers,
        } = tables;

        let mut entities: BTreeMap<EntityKey, ReferenceEntity> = BTreeMap::new();
        let mut names = NameIndex::default();

        for (row, entity_row) in entity_rows.into_iter().enumerate() {
            if entities.contains_key(&entity_row.key) {
                return Err(LoadError::DuplicateEntity(entity_row.key));
            }
            let entity = ReferenceEntity::from_row(entity_row);
            let normalized = normalize_name_with(&entity.name, config.strip_honorifics);
            if normalized.is_empty() {
                return Err(LoadError::MissingField {
                    table: "entities",
                    row,
                    field: "name",
                });
            }
            register_name(
                &mut names,
                IndexedName {
                    normalized,
                    display: entity.name.clone(),
                    key: entity.key,
                    via_alias: false,
                },
            );
            entities.insert(entity.key, entity);
        }

        let alias_count = aliases.len();
        for (row, alias_row) in aliases.into_iter().enumerate() {
            let entity = entities
                .get_mut(&alias_row.key)
                .ok_or(LoadError::OrphanReference {
                    table: "aliases",
                    key: alias_row.key,
                })?;
            let alias = AliasRecord::from(alias_row);
            let normalized = normalize_name_with(&alias.text, config.strip_honorifics);
            if normalized.is_empty() {
                return Err(LoadError::MissingField {
                    table: "aliases",
                    row,
                    field: "alias",
                });
            }
            register_name(
                &mut names,
                IndexedName {
                    normalized,
                    display: alias.text.clone(),
                    key: entity.key,
                    via_alias: true,
                },
            );
            entity.aliases.push(alias);
        }

        let address_count = addresses.len();
        let mut locations = LocationIndex::default();
        for address_row in addresses {
            let entity = entities
                .get_mut(&address_row.key)
                .ok_or(LoadError::OrphanReference {
                    table: "addresses",
                    key: address_row.key,
                })?;
            let address = AddressRecord::from(address_row);
            if let Some(country) = address.country.as_deref().map(normalize_location) {
                if !country.is_empty() {
                    locations.insert_country(country, entity.key);
                }
            }
            if let Some(city) = address.city.as_deref().map(normalize_location) {
                if !city.is_empty() {
                    locations.insert_city(city, entity.key);
                }
            }
            entity.addresses.push(address);
        }

        let identifier_count = identifiers.len();
        let mut identifier_index = IdentifierIndex::default();
        for (row, identifier_row) in identifiers.into_iter().enumerate() {
            let entity = entities
                .get_mut(&identifier_row.key)
                .ok_or(LoadError::OrphanReference {
                    table: "identifiers",
                    key: identifier_row.key,
                })?;
            let identifier = IdentifierRecord::from(identifier_row);
            let normalized = normalize_identifier(&identifier.value);
            if normalized.is_empty() {
                return Err(LoadError::MissingField {
                    table: "identifiers",
                    row,
                    field: "value",
                });
            }
            if let Some(holder) = identifier_index.insert(normalized, entity.key) {
                warn!(
                    value = %identifier.value,
                    holder = %holder,
                    key = %entity.key,
                    "identifier shared by distinct entities; first holder wins"
                );
            }
            entity.identifiers.push(identifier);
        }

        let stats = IndexStats {
            entities: entities.len(),
            aliases: alias_count,
            addresses: address_count,
            identifiers: identifier_count,
            indexed_names: names.len(),
            ambiguous_names: names.ambiguous_count(),
        };

        info!(
            entities = stats.entities,
            aliases = stats.aliases,
            addresses = stats.addresses,
            identifiers = stats.identifiers,
            indexed_names = stats.indexed_names,
            ambiguous_names = stats.ambiguous_names,
            "reference set loaded"
        );

        Ok(Self {
            entities,
            names,
            identifiers: identifier_index,
            locations,
            policy: ConfidencePolicy::new(config.medium_confidence_above),
            config,
            stats,
        })
    }

    pub fn config(&self) -> &MatcherConfig {
        &self.config
    }

    pub fn stats(&self) -> IndexStats {
        self.stats
    }

    pub fn entity(&self, key: EntityKey) -> Option<&ReferenceEntity> {
        self.entities.get(&key)
    }

    /// All entities, ordered by key
    pub fn entities(&self) -> impl Iterator<Item = &ReferenceEntity> {
        self.entities.values()
    }

    /// Normalize a name exactly as the index does
    pub fn normalize(&self, name: &str) -> String {
        normalize_name_with(name, self.config.strip_honorifics)
    }

    // ========================================================================
    // Name matching
    // ========================================================================

    /// Key of the entity whose canonical name or alias normalizes to the same
    /// form as `name`. Shared names resolve to the first-registered entity.
    pub fn exact_match(&self, name: &str) -> Option<EntityKey> {
        self.exact_lookup(name).map(|hit| hit.entity_key)
    }

    /// Exact lookup with every entity sharing the normalized name
    pub fn exact_lookup(&self, name: &str) -> Option<ExactHit> {
        self.exact_normalized(&self.normalize(name))
    }

    fn exact_normalized(&self, normalized: &str) -> Option<ExactHit> {
        if normalized.is_empty() {
            return None;
        }
        let mut hits = self.names.lookup(normalized);
        let first = hits.next()?;
        let mut candidates = vec![first.key];
        candidates.extend(hits.map(|n| n.key));

        Some(ExactHit {
            entity_key: first.key,
            candidates,
            matched_alias: first.via_alias.then(|| first.display.clone()),
        })
    }

    /// Ranked fuzzy candidates scoring at or above `threshold`.
    ///
    /// One candidate per entity (its best-scoring name), sorted by score
    /// descending, then key ascending.
    pub fn fuzzy_match(&self, name: &str, threshold: Score) -> Vec<FuzzyCandidate> {
        self.rank(&self.normalize(name), threshold)
    }

    fn rank(&self, normalized: &str, threshold: Score) -> Vec<FuzzyCandidate> {
        if normalized.is_empty() {
            return Vec::new();
        }

        let mut best: BTreeMap<EntityKey, FuzzyCandidate> = BTreeMap::new();
        for entry in self
            .names
            .candidates(normalized, self.config.max_fuzzy_candidates)
        {
            let score = similarity::score(normalized, &entry.normalized);
            if score < threshold {
                continue;
            }
            let replace = best.get(&entry.key).map_or(true, |c| score > c.score);
            if replace {
                best.insert(
                    entry.key,
                    FuzzyCandidate {
                        entity_key: entry.key,
                        score,
                        matched_name: entry.display.clone(),
                        via_alias: entry.via_alias,
                    },
                );
            }
        }

        let mut ranked: Vec<FuzzyCandidate> = best.into_values().collect();
        ranked.sort_by(|a, b| {
            b.score
                .cmp(&a.score)
                .then_with(|| a.entity_key.cmp(&b.entity_key))
        });
        ranked
    }

    /// Match a list of names: exact first, then (optionally) the single best
    /// fuzzy candidate at the configured threshold.
    ///
    /// Always returns one result per input, in input order.
    pub fn batch_search_names<S: AsRef<str>>(&self, names: &[S], fuzzy: bool) -> Vec<MatchResult> {
        let results: Vec<MatchResult> = names
            .iter()
            .map(|name| self.resolve(Some(name.as_ref()), fuzzy).result)
            .collect();
        log_batch("batch_search_names", &results);
        results
    }

    /// Cross-reference a new source against the reference set.
    ///
    /// Each row is matched on `name_column`. When `location_column` is given,
    /// a match at that location is marked corroborated and an ambiguous match
    /// is narrowed to candidates with an address there. Location alone never
    /// produces a match.
    /// Rows are never dropped or reordered.
    pub fn process_new_source(
        &self,
        rows: &[QueryRecord],
        name_column: &str,
        location_column: Option<&str>,
    ) -> Vec<AnnotatedRecord> {
        let annotated: Vec<AnnotatedRecord> = rows
            .iter()
            .enumerate()
            .map(|(source_row, record)| {
                let mut resolution = self.resolve(record.get(name_column), true);
                let location = location_column.and_then(|column| record.get(column));

                let location_matches = location.map(|location| {
                    let nearby = self.location_keys(Some(location), Some(location));
                    self.corroborate(&mut resolution, &nearby);
                    nearby.len()
                });

                AnnotatedRecord {
                    source_row,
                    record: record.clone(),
                    result: resolution.result,
                    location_matches,
                }
            })
            .collect();

        let results: Vec<MatchResult> = annotated.iter().map(|a| a.result.clone()).collect();
        log_batch("process_new_source", &results);
        annotated
    }

    fn resolve(&self, name: Option<&str>, fuzzy: bool) -> Resolution {
        let Some(name) = name.filter(|n| !n.trim().is_empty()) else {
            return Resolution::settled(MatchResult::invalid(name, "missing name"));
        };

        let normalized = self.normalize(name);
        if normalized.is_empty() {
            return Resolution::settled(MatchResult::invalid(
                Some(name),
                "name has no matchable characters",
            ));
        }

        if let Some(hit) = self.exact_normalized(&normalized) {
            let candidates = self
                .names
                .lookup(&normalized)
                .map(|n| Candidate {
                    key: n.key,
                    score: None,
                    matched_alias: n.via_alias.then(|| n.display.clone()),
                })
                .collect();
            let mut result = self.result_for(
                name,
                MatchType::Exact,
                hit.entity_key,
                None,
                hit.matched_alias.clone(),
            );
            if hit.is_ambiguous() {
                result.flags.push(MatchFlag::Ambiguous {
                    candidates: hit.candidates,
                });
            }
            return Resolution { result, candidates };
        }

        if !fuzzy {
            return Resolution::settled(MatchResult::none(Some(name)));
        }

        let ranked = self.rank(&normalized, self.config.fuzzy_threshold);
        let Some(top) = ranked.first() else {
            return Resolution::settled(MatchResult::none(Some(name)));
        };

        let mut result = self.result_for(
            name,
            MatchType::Fuzzy,
            top.entity_key,
            Some(top.score),
            top.via_alias.then(|| top.matched_name.clone()),
        );
        let tied: Vec<EntityKey> = ranked
            .iter()
            .take_while(|c| c.score == top.score)
            .map(|c| c.entity_key)
            .collect();
        if tied.len() > 1 {
            result.flags.push(MatchFlag::Ambiguous { candidates: tied });
        }

        let candidates = ranked
            .into_iter()
            .map(|c| Candidate {
                key: c.entity_key,
                score: Some(c.score),
                matched_alias: c.via_alias.then_some(c.matched_name),
            })
            .collect();
        Resolution { result, candidates }
    }

    fn result_for(
        &self,
        input: &str,
        match_type: MatchType,
        key: EntityKey,
        score: Option<Score>,
        matched_alias: Option<String>,
    ) -> MatchResult {
        MatchResult {
            input_name: Some(input.to_string()),
            match_type,
            entity_key: Some(key),
            matched_name: self.entities.get(&key).map(|e| e.name.clone()),
            matched_alias,
            score,
            confidence: self.policy.tier(match_type, score),
            flags: Vec::new(),
        }
    }

    /// Use the row's location to confirm or narrow a name resolution.
    fn corroborate(&self, resolution: &mut Resolution, nearby: &BTreeSet<EntityKey>) {
        let result = &mut resolution.result;
        let Some(key) = result.entity_key else {
            return;
        };

        if !result.is_ambiguous() {
            if nearby.contains(&key) {
                result.flags.push(MatchFlag::LocationCorroborated);
            }
            return;
        }

        let ambiguous: BTreeSet<EntityKey> = result
            .flags
            .iter()
            .filter_map(|f| match f {
                MatchFlag::Ambiguous { candidates } => Some(candidates.iter().copied()),
                _ => None,
            })
            .flatten()
            .collect();
        // Location narrows only among the tied top candidates.
        let confirmed: Vec<&Candidate> = resolution
            .candidates
            .iter()
            .filter(|c| ambiguous.contains(&c.key) && nearby.contains(&c.key))
            .collect();
        let Some(best) = confirmed.first() else {
            return;
        };
        let tied: Vec<EntityKey> = confirmed
            .iter()
            .take_while(|c| c.score == best.score)
            .map(|c| c.key)
            .collect();

        result.flags.retain(|f| !matches!(f, MatchFlag::Ambiguous { .. }));
        result.entity_key = Some(best.key);
        result.matched_name = self.entities.get(&best.key).map(|e| e.name.clone());
        result.matched_alias = best.matched_alias.clone();
        result.score = best.score;
        result.confidence = self.policy.tier(result.match_type, best.score);

        if tied.len() > 1 {
            result.flags.push(MatchFlag::Ambiguous { candidates: tied });
        } else {
            result.flags.push(MatchFlag::LocationCorroborated);
        }
    }

    // ========================================================================
    // Location, identifier, and profile lookups
    // ========================================================================

    /// Entities with an address in `country` or in `city`, ordered by key.
    pub fn search_by_location(
        &self,
        country: Option<&str>,
        city: Option<&str>,
    ) -> Vec<&ReferenceEntity> {
        self.location_keys(country, city)
            .into_iter()
            .filter_map(|key| self.entities.get(&key))
            .collect()
    }

    fn location_keys(&self, country: Option<&str>, city: Option<&str>) -> BTreeSet<EntityKey> {
        let mut keys = BTreeSet::new();
        if let Some(country) = country.map(normalize_location).filter(|c| !c.is_empty()) {
            keys.extend(self.locations.by_country(&country));
        }
        if let Some(city) = city.map(normalize_location).filter(|c| !c.is_empty()) {
            keys.extend(self.locations.by_city(&city));
        }
        keys
    }

    /// Exact identifier lookup after identifier normalization.
    pub fn search_by_id(&self, id_number: &str) -> Option<EntityKey> {
        let normalized = normalize_identifier(id_number);
        if normalized.is_empty() {
            return None;
        }
        self.identifiers.first(&normalized)
    }

    /// Partial identifier search over values and identifier types.
    ///
    /// Unset filters match everything. Results are ordered by entity key,
    /// then by the entity's identifier order.
    pub fn search_identifiers(
        &self,
        query: &IdentifierQuery,
    ) -> Vec<(EntityKey, &IdentifierRecord)> {
        let value = query
            .value
            .as_deref()
            .map(normalize_identifier)
            .filter(|v| !v.is_empty());
        let id_type = query
            .id_type
            .as_deref()
            .map(|t| t.trim().to_lowercase())
            .filter(|t| !t.is_empty());

        self.entities
            .values()
            .flat_map(|e| e.identifiers.iter().map(move |id| (e.key, id)))
            .filter(|(_, id)| {
                value
                    .as_deref()
                    .map_or(true, |v| normalize_identifier(&id.value).contains(v))
            })
            .filter(|(_, id)| {
                id_type
                    .as_deref()
                    .map_or(true, |t| id.id_type.to_lowercase().contains(t))
            })
            .collect()
    }

    /// Entities tagged with `program`, ordered by key
    pub fn entities_in_program(&self, program: &str) -> Vec<&ReferenceEntity> {
        self.entities
            .values()
            .filter(|e| e.in_program(program))
            .collect()
    }

    /// Entities whose canonical name or any alias contains one of `terms`
    /// after normalization, ordered by key.
    pub fn search_name_terms<S: AsRef<str>>(&self, terms: &[S]) -> Vec<&ReferenceEntity> {
        let terms: Vec<String> = terms
            .iter()
            .map(|t| self.normalize(t.as_ref()))
            .filter(|t| !t.is_empty())
            .collect();
        if terms.is_empty() {
            return Vec::new();
        }

        let keys: BTreeSet<EntityKey> = self
            .names
            .entries()
            .iter()
            .filter(|n| terms.iter().any(|t| n.normalized.contains(t.as_str())))
            .map(|n| n.key)
            .collect();
        keys.into_iter()
            .filter_map(|key| self.entities.get(&key))
            .collect()
    }

    /// Complete profile of one entity
    pub fn get_entity_profile(&self, key: EntityKey) -> Result<EntityProfile> {
        self.entities
            .get(&key)
            .map(EntityProfile::from)
            .ok_or(MatchError::NotFound(key))
    }

    /// Stable hash over the reference set and every index.
    ///
    /// Equal fingerprints before and after a series of queries show that
    /// nothing was modified.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = AHasher::default();
        self.entities.hash(&mut hasher);
        self.names.hash(&mut hasher);
        self.identifiers.hash(&mut hasher);
        self.locations.hash(&mut hasher);
        hasher.finish()
    }
}

fn register_name(names: &mut NameIndex, name: IndexedName) {
    let shown = name.display.clone();
    let key = name.key;
    if let Registration::Collision(holder) = names.insert(name) {
        warn!(
            name = %shown,
            holder = %holder,
            key = %key,
            "normalized name shared by distinct entities; first registered wins"
        );
    }
}

fn log_batch(operation: &str, results: &[MatchResult]) {
    let count = |t: MatchType| results.iter().filter(|r| r.match_type == t).count();
    debug!(
        operation,
        rows = results.len(),
        exact = count(MatchType::Exact),
        fuzzy = count(MatchType::Fuzzy),
        unmatched = count(MatchType::None),
        ambiguous = results.iter().filter(|r| r.is_ambiguous()).count(),
        invalid = results.iter().filter(|r| r.is_invalid()).count(),
        "matching finished"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::confidence::ConfidenceTier;
    use crate::model::EntityKind;

    fn scenario() -> Matcher {
        let tables = ReferenceTables::new()
            .entity(27039, "Salman Raouf SALMAN", EntityKind::Individual, &["SDGT"])
            .entity(44499, "Amer Mohamed Akil RADA", EntityKind::Individual, &["SDGT"])
            .entity(44522, "Samer Akil RADA", EntityKind::Individual, &["SDGT", "LEBANON"])
            .alias(27039, "Andree MARQUEZ", "a.k.a.")
            .address(44522, None, Some("Venezuela"))
            .address(44499, Some("Caracas"), None)
            .identifier(27039, "AD059541", "Passport", Some("Colombia"));
        Matcher::new(tables).unwrap()
    }

    #[test]
    fn test_exact_alias_match() {
        let matcher = scenario();
        assert_eq!(matcher.exact_match("Andree Marquez"), Some(EntityKey(27039)));
        let hit = matcher.exact_lookup("andrée  marquez").unwrap();
        assert_eq!(hit.matched_alias.as_deref(), Some("Andree MARQUEZ"));
        assert!(!hit.is_ambiguous());
    }

    #[test]
    fn test_exact_no_match() {
        let matcher = scenario();
        assert_eq!(matcher.exact_match("John Smith"), None);
        assert_eq!(matcher.exact_match("   "), None);
    }

    #[test]
    fn test_fuzzy_ranked_and_deduplicated() {
        let matcher = scenario();
        let ranked = matcher.fuzzy_match("Akil Rada", 80);
        let keys: Vec<EntityKey> = ranked.iter().map(|c| c.entity_key).collect();
        assert_eq!(keys, vec![EntityKey(44499), EntityKey(44522)]);
        assert!(ranked.iter().all(|c| c.score == 100));
    }

    #[test]
    fn test_batch_fuzzy_tie_is_ambiguous() {
        let matcher = scenario();
        let results = matcher.batch_search_names(&["Akil Rada"], true);
        assert_eq!(results[0].match_type, MatchType::Fuzzy);
        assert_eq!(results[0].entity_key, Some(EntityKey(44499)));
        assert_eq!(
            results[0].flags,
            vec![MatchFlag::Ambiguous {
                candidates: vec![EntityKey(44499), EntityKey(44522)]
            }]
        );
    }

    #[test]
    fn test_location_narrows_ambiguous_fuzzy() {
        let matcher = scenario();
        let rows = vec![QueryRecord::new()
            .with("name", "Akil Rada")
            .with("where", "Venezuela")];
        let annotated = matcher.process_new_source(&rows, "name", Some("where"));
        let result = &annotated[0].result;
        assert_eq!(result.entity_key, Some(EntityKey(44522)));
        assert_eq!(result.matched_name.as_deref(), Some("Samer Akil RADA"));
        assert_eq!(result.flags, vec![MatchFlag::LocationCorroborated]);
        assert_eq!(result.confidence, ConfidenceTier::Medium);
        assert_eq!(annotated[0].location_matches, Some(1));
    }

    #[test]
    fn test_location_never_matches_alone() {
        let matcher = scenario();
        let rows = vec![QueryRecord::new()
            .with("name", "John Smith")
            .with("where", "Venezuela")];
        let annotated = matcher.process_new_source(&rows, "name", Some("where"));
        assert_eq!(annotated[0].result.match_type, MatchType::None);
        assert_eq!(annotated[0].result.entity_key, None);
        assert_eq!(annotated[0].location_matches, Some(1));
    }

    #[test]
    fn test_search_by_id_normalizes() {
        let matcher = scenario();
        assert_eq!(matcher.search_by_id("ad 059541"), Some(EntityKey(27039)));
        assert_eq!(matcher.search_by_id("AD05954"), None);
        assert_eq!(matcher.search_by_id(""), None);
    }

    #[test]
    fn test_profile_not_found() {
        let matcher = scenario();
        assert_eq!(
            matcher.get_entity_profile(EntityKey(1)),
            Err(MatchError::NotFound(EntityKey(1)))
        );
    }

    #[test]
    fn test_stats() {
        let stats = scenario().stats();
        assert_eq!(stats.entities, 3);
        assert_eq!(stats.aliases, 1);
        assert_eq!(stats.addresses, 2);
        assert_eq!(stats.identifiers, 1);
        assert_eq!(stats.indexed_names, 4);
        assert_eq!(stats.ambiguous_names, 0);
    }
}

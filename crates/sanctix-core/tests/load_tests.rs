//! Reference set validation tests

use pretty_assertions::assert_eq;
use sanctix_core::{EntityKey, EntityKind, LoadError, Matcher, ReferenceTables};

fn base() -> ReferenceTables {
    ReferenceTables::new()
        .entity(27039, "Salman Raouf SALMAN", EntityKind::Individual, &["SDGT"])
        .entity(44499, "Amer Mohamed Akil RADA", EntityKind::Individual, &["SDGT"])
}

#[test]
fn test_duplicate_entity_key() {
    let tables = base().entity(27039, "Someone Else", EntityKind::Individual, &[]);
    assert_eq!(
        Matcher::new(tables).unwrap_err(),
        LoadError::DuplicateEntity(EntityKey(27039))
    );
}

#[test]
fn test_orphan_alias() {
    let tables = base().alias(99999, "Ghost", "a.k.a.");
    assert_eq!(
        Matcher::new(tables).unwrap_err(),
        LoadError::OrphanReference {
            table: "aliases",
            key: EntityKey(99999)
        }
    );
}

#[test]
fn test_orphan_address() {
    let tables = base().address(1, Some("Beirut"), Some("Lebanon"));
    assert_eq!(
        Matcher::new(tables).unwrap_err(),
        LoadError::OrphanReference {
            table: "addresses",
            key: EntityKey(1)
        }
    );
}

#[test]
fn test_orphan_identifier() {
    let tables = base().identifier(2, "AD059541", "Passport", None);
    assert!(matches!(
        Matcher::new(tables),
        Err(LoadError::OrphanReference {
            table: "identifiers",
            ..
        })
    ));
}

#[test]
fn test_blank_entity_name() {
    let tables = base().entity(1, "  ...  ", EntityKind::Organization, &[]);
    assert_eq!(
        Matcher::new(tables).unwrap_err(),
        LoadError::MissingField {
            table: "entities",
            row: 2,
            field: "name"
        }
    );
}

#[test]
fn test_blank_alias_and_identifier() {
    let tables = base().alias(27039, "", "a.k.a.");
    assert!(matches!(
        Matcher::new(tables),
        Err(LoadError::MissingField {
            table: "aliases",
            ..
        })
    ));

    let tables = base().identifier(27039, " - ", "Passport", None);
    assert!(matches!(
        Matcher::new(tables),
        Err(LoadError::MissingField {
            table: "identifiers",
            field: "value",
            ..
        })
    ));
}

#[test]
fn test_load_from_json() {
    let json = r#"{
        "entities": [
            {"key": "27039", "name": "Salman Raouf SALMAN", "kind": "Individual", "programs": ["SDGT"]},
            {"key": 44522, "name": "Samer Akil RADA", "kind": "individual"}
        ],
        "aliases": [{"key": 27039, "alias": "Andree MARQUEZ", "alias_type": "a.k.a."}],
        "addresses": [{"key": 44522, "country": "Venezuela"}],
        "identifiers": [{"key": 27039, "value": "AD059541", "id_type": "Passport", "country": "Colombia"}]
    }"#;
    let matcher = Matcher::new(ReferenceTables::from_json(json).unwrap()).unwrap();

    let stats = matcher.stats();
    assert_eq!(stats.entities, 2);
    assert_eq!(stats.indexed_names, 3);
    assert_eq!(matcher.exact_match("ANDREE MARQUEZ"), Some(EntityKey(27039)));
    assert_eq!(matcher.search_by_id("AD059541"), Some(EntityKey(27039)));
}

#[test]
fn test_load_error_messages() {
    assert_eq!(
        LoadError::OrphanReference {
            table: "aliases",
            key: EntityKey(5)
        }
        .to_string(),
        "aliases row references unknown entity 5"
    );
    assert_eq!(
        LoadError::DuplicateEntity(EntityKey(7)).to_string(),
        "duplicate entity key: 7"
    );
}

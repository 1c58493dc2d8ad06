//! Shared matcher with atomic reloads
//!
//! Readers take an `Arc<Matcher>` snapshot and query it without holding any
//! lock. A reload builds the new matcher first and only then swaps the
//! pointer, so queries in flight keep using the instance they started with.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::info;

use crate::config::MatcherConfig;
use crate::error::LoadError;
use crate::matcher::{IndexStats, Matcher};
use crate::model::ReferenceTables;

pub struct MatcherHandle {
    current: RwLock<Arc<Matcher>>,
}

impl MatcherHandle {
    pub fn new(matcher: Matcher) -> Self {
        Self {
            current: RwLock::new(Arc::new(matcher)),
        }
    }

    pub fn load(tables: ReferenceTables, config: MatcherConfig) -> Result<Self, LoadError> {
        Matcher::with_config(tables, config).map(Self::new)
    }

    /// The matcher currently being served
    pub fn snapshot(&self) -> Arc<Matcher> {
        Arc::clone(&self.current.read())
    }

    /// Replace the reference set, keeping the current configuration.
    ///
    /// On error the current matcher stays in place.
    pub fn reload(&self, tables: ReferenceTables) -> Result<IndexStats, LoadError> {
        let config = self.snapshot().config().clone();
        self.reload_with_config(tables, config)
    }

    pub fn reload_with_config(
        &self,
        tables: ReferenceTables,
        config: MatcherConfig,
    ) -> Result<IndexStats, LoadError> {
        let fresh = Matcher::with_config(tables, config)?;
        let stats = fresh.stats();
        *self.current.write() = Arc::new(fresh);
        info!(entities = stats.entities, "reference set swapped");
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EntityKey, EntityKind};

    fn tables(name: &str) -> ReferenceTables {
        ReferenceTables::new().entity(1, name, EntityKind::Organization, &["FTO"])
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let handle = MatcherHandle::load(tables("Hizballah"), MatcherConfig::default()).unwrap();
        let before = handle.snapshot();

        handle.reload(tables("Islamic Jihad Organization")).unwrap();

        assert_eq!(before.exact_match("Hizballah"), Some(EntityKey(1)));
        assert_eq!(handle.snapshot().exact_match("Hizballah"), None);
        assert_eq!(
            handle.snapshot().exact_match("Islamic Jihad Organization"),
            Some(EntityKey(1))
        );
    }

    #[test]
    fn test_failed_reload_keeps_current() {
        let handle = MatcherHandle::load(tables("Hizballah"), MatcherConfig::default()).unwrap();
        let broken = tables("Hizballah").alias(2, "Orphan", "a.k.a.");

        assert!(handle.reload(broken).is_err());
        assert_eq!(handle.snapshot().exact_match("Hizballah"), Some(EntityKey(1)));
    }

    #[test]
    fn test_reload_keeps_config() {
        let config = MatcherConfig {
            fuzzy_threshold: 95,
            ..MatcherConfig::default()
        };
        let handle = MatcherHandle::load(tables("Hizballah"), config).unwrap();
        handle.reload(tables("Hizbollah")).unwrap();
        assert_eq!(handle.snapshot().config().fuzzy_threshold, 95);
    }
}

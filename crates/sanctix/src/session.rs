//! Screening session
//!
//! A `Session` owns one `MatcherHandle` for its whole lifetime. Callers
//! build it once, screen as many sources as they like, and swap in a fresh
//! reference set with [`Session::reload`].

use std::sync::Arc;

use sanctix_core::{
    extract_names_from_text, AnnotatedRecord, IndexStats, MatchResult, MatchType, Matcher,
    MatcherConfig, MatcherHandle, QueryRecord, ReferenceTables,
};
use serde::Serialize;
use tracing::info;

use crate::config;
use crate::error::Result;

pub struct Session {
    handle: MatcherHandle,
}

impl Session {
    /// Open a session configured from the `SANCTIX_*` environment.
    pub fn open(tables: ReferenceTables) -> Result<Self> {
        Self::with_config(tables, config::from_env()?)
    }

    pub fn with_config(tables: ReferenceTables, config: MatcherConfig) -> Result<Self> {
        config::validate(&config)?;
        let handle = MatcherHandle::load(tables, config)?;
        let stats = handle.snapshot().stats();
        info!(
            entities = stats.entities,
            names = stats.indexed_names,
            "screening session opened"
        );
        Ok(Self { handle })
    }

    /// Open a session from a JSON reference document.
    pub fn from_json(json: &str, config: MatcherConfig) -> Result<Self> {
        Self::with_config(ReferenceTables::from_json(json)?, config)
    }

    /// The matcher serving queries right now.
    pub fn matcher(&self) -> Arc<Matcher> {
        self.handle.snapshot()
    }

    /// Swap in a new reference set under the current configuration.
    ///
    /// A rejected set leaves the session serving the previous one.
    pub fn reload(&self, tables: ReferenceTables) -> Result<IndexStats> {
        Ok(self.handle.reload(tables)?)
    }

    /// Screen tabular rows and summarize the outcome.
    pub fn screen(
        &self,
        rows: &[QueryRecord],
        name_column: &str,
        location_column: Option<&str>,
    ) -> ScreeningReport {
        let rows = self
            .matcher()
            .process_new_source(rows, name_column, location_column);
        let summary = ScreeningSummary::from_results(rows.iter().map(|r| &r.result));
        info!(
            total = summary.total,
            exact = summary.exact,
            fuzzy = summary.fuzzy,
            needs_review = summary.needs_review,
            "source screened"
        );
        ScreeningReport { rows, summary }
    }

    /// Extract candidate names from free text and match each one.
    pub fn screen_text(&self, text: &str) -> Vec<MatchResult> {
        let names = extract_names_from_text(text);
        self.matcher().batch_search_names(&names, true)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScreeningReport {
    pub rows: Vec<AnnotatedRecord>,
    pub summary: ScreeningSummary,
}

impl ScreeningReport {
    /// Matched rows whose confidence calls for manual review.
    pub fn flagged(&self) -> impl Iterator<Item = &AnnotatedRecord> {
        self.rows
            .iter()
            .filter(|r| r.result.is_match() && r.result.confidence.needs_review())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Counts over a screened source
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScreeningSummary {
    pub total: usize,
    pub exact: usize,
    pub fuzzy: usize,
    pub unmatched: usize,
    pub ambiguous: usize,
    pub invalid: usize,
    /// Matches at `low` confidence
    pub needs_review: usize,
}

impl ScreeningSummary {
    pub fn from_results<'a>(results: impl IntoIterator<Item = &'a MatchResult>) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.total += 1;
            match result.match_type {
                MatchType::Exact => summary.exact += 1,
                MatchType::Fuzzy => summary.fuzzy += 1,
                MatchType::None => summary.unmatched += 1,
            }
            if result.is_ambiguous() {
                summary.ambiguous += 1;
            }
            if result.is_invalid() {
                summary.invalid += 1;
            }
            if result.is_match() && result.confidence.needs_review() {
                summary.needs_review += 1;
            }
        }
        summary
    }
}

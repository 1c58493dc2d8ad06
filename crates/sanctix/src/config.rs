//! Matcher configuration from `SANCTIX_*` environment variables
//!
//! Unset variables keep the `MatcherConfig` defaults. A variable that is set
//! but cannot be parsed is an error rather than being silently ignored.

use std::str::FromStr;

use sanctix_core::{MatcherConfig, Score};
use tracing::debug;

use crate::error::{Error, Result};

pub const ENV_FUZZY_THRESHOLD: &str = "SANCTIX_FUZZY_THRESHOLD";
pub const ENV_MEDIUM_ABOVE: &str = "SANCTIX_MEDIUM_ABOVE";
pub const ENV_MAX_CANDIDATES: &str = "SANCTIX_MAX_CANDIDATES";
pub const ENV_STRIP_HONORIFICS: &str = "SANCTIX_STRIP_HONORIFICS";

/// Build a config from the process environment.
pub fn from_env() -> Result<MatcherConfig> {
    from_lookup(|key| std::env::var(key).ok())
}

/// Build a config from an arbitrary key lookup.
pub fn from_lookup<F>(lookup: F) -> Result<MatcherConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = MatcherConfig::default();

    if let Some(v) = parse::<Score>(&lookup, ENV_FUZZY_THRESHOLD)? {
        config.fuzzy_threshold = v;
    }
    if let Some(v) = parse::<Score>(&lookup, ENV_MEDIUM_ABOVE)? {
        config.medium_confidence_above = v;
    }
    if let Some(v) = parse::<usize>(&lookup, ENV_MAX_CANDIDATES)? {
        config.max_fuzzy_candidates = v;
    }
    if let Some(raw) = lookup(ENV_STRIP_HONORIFICS) {
        config.strip_honorifics = parse_flag(ENV_STRIP_HONORIFICS, &raw)?;
    }

    validate(&config)?;
    debug!(?config, "matcher config resolved");
    Ok(config)
}

/// Reject configs whose scores fall outside 0-100 or that disable fuzzy
/// scoring entirely.
pub fn validate(config: &MatcherConfig) -> Result<()> {
    for (name, value) in [
        (ENV_FUZZY_THRESHOLD, config.fuzzy_threshold),
        (ENV_MEDIUM_ABOVE, config.medium_confidence_above),
    ] {
        if value > 100 {
            return Err(Error::Config(format!("{name} must be 0-100, got {value}")));
        }
    }
    if config.max_fuzzy_candidates == 0 {
        return Err(Error::Config(format!("{ENV_MAX_CANDIDATES} must be positive")));
    }
    Ok(())
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{key}: cannot parse {raw:?}"))),
    }
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::Config(format!("{key}: expected a boolean, got {raw:?}"))),
    }
}

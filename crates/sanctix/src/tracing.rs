//! Logging setup for sanctix components.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::error::{Error, Result};

/// Initialize tracing with sanctix defaults.
///
/// Sets up tracing-subscriber with:
/// - Environment filter (RUST_LOG)
/// - Compact format suitable for terminal output
///
/// Panics if a global subscriber is already installed; use
/// [`try_init_with_filter`] where that can happen.
pub fn init() {
    init_with_filter("info");
}

/// Initialize tracing with a custom default filter.
pub fn init_with_filter(default_filter: &str) {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(fmt::layer().compact())
        .init();
}

/// Like [`init_with_filter`], but reports an already-installed subscriber
/// as an error instead of panicking.
pub fn try_init_with_filter(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(default_filter))
        .with(fmt::layer().compact())
        .try_init()
        .map_err(|e| Error::Logging(e.to_string()))
}

fn env_filter(default_filter: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_reports_error() {
        let _ = try_init_with_filter("debug");
        assert!(matches!(
            try_init_with_filter("debug"),
            Err(Error::Logging(_))
        ));
    }
}

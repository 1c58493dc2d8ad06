//! # sanctix Shared Library
//!
//! Wiring around the `sanctix-core` matching engine for research scripts and
//! services:
//! - **session**: an explicitly owned matcher lifetime with screening reports
//! - **config**: `MatcherConfig` from `SANCTIX_*` environment variables
//! - **error**: top-level error type
//! - **tracing**: logging setup
//!
//! ## Usage
//!
//! ```rust
//! use sanctix::Session;
//! use sanctix_core::{EntityKind, MatcherConfig, QueryRecord, ReferenceTables};
//!
//! let tables = ReferenceTables::new()
//!     .entity(27039, "Salman Raouf SALMAN", EntityKind::Individual, &["SDGT"]);
//! let session = Session::with_config(tables, MatcherConfig::default()).unwrap();
//!
//! let rows = vec![QueryRecord::new().with("name", "Salman Salman")];
//! let report = session.screen(&rows, "name", None);
//! assert_eq!(report.summary.fuzzy, 1);
//! ```

pub mod config;
pub mod error;
pub mod session;
pub mod tracing;

// Re-export commonly used items at crate root
pub use error::{Error, Result};
pub use session::{ScreeningReport, ScreeningSummary, Session};

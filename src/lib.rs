//! Task dashboard library.
//!
//! The [`engine`] module is the core: pure filtering, statistics and facet
//! extraction over a task collection. The rest wraps it for use as a
//! dashboard: session state, an HTTP API, snapshot loading, configuration
//! and output formatting.

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod engine;
pub mod error;
pub mod format;
pub mod logging;
pub mod snapshot;
pub mod types;
pub mod validate;

pub use engine::{compute_stats, extract_facets, filter_tasks};

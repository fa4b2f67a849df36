// Public fallible APIs in this crate share one concrete error contract (`TaxoError`).
// Repeating per-function `# Errors` boilerplate obscures behavior more than it clarifies.
#![allow(
    clippy::missing_errors_doc,
    reason = "crate-wide fallible API uses one explicit error type; per-item boilerplate would duplicate contract"
)]

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod ingest;
pub mod models;
pub mod path;
pub mod store;
pub mod tree;

pub use client::Taxotree;
pub use engine::{HierarchyEngine, MAX_CHILD_CHECK_WORKERS, MIN_SEARCH_TERM_CHARS, SearchTerm};
pub use error::{Result, TaxoError};
pub use store::{FlatStore, MemoryFlatStore, SqliteFlatStore};

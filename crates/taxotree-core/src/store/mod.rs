//! The flat store: the persisted `(path, size)` rows the engine queries.
//!
//! The engine only reads. Writers (`insert_records`, `clear`) exist for
//! offline ingestion and tests.

use crate::error::Result;
use crate::models::{NodeRecord, SearchRollup};

mod memory;
mod sqlite;

pub use memory::MemoryFlatStore;
pub use sqlite::SqliteFlatStore;

/// Rows inserted per transaction during ingestion.
pub const INSERT_BATCH_SIZE: usize = 1000;

pub trait FlatStore: Send + Sync {
    /// Every record in insertion order.
    fn scan(&self) -> Result<Vec<NodeRecord>>;

    /// Records exactly one level below `parent`; an empty parent lists the top level.
    fn children_of(&self, parent: &str) -> Result<Vec<NodeRecord>>;

    /// Whether any record lies strictly under `path`.
    fn has_descendant(&self, path: &str) -> Result<bool>;

    /// Whether any record strictly under `path` has a full path containing `term`.
    fn has_descendant_matching(&self, path: &str, term: &str) -> Result<bool>;

    /// Matching records grouped by top-level segment, sizes summed, ordered by name.
    fn search_rollup(&self, term: &str) -> Result<Vec<SearchRollup>>;

    fn count(&self) -> Result<usize>;
}

/// Escapes `LIKE` metacharacters so user input only ever matches literally.
pub(crate) fn like_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(ch);
    }
    out
}

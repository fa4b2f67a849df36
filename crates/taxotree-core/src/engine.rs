//! Lazy child resolution and search over a [`FlatStore`].

use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::error::{Result, TaxoError};
use crate::models::{ChildListing, LazyNodeView, NodeRecord, SearchRollup, TreeNode};
use crate::path;
use crate::store::FlatStore;
use crate::tree;

/// Terms shorter than this (in characters) switch search off entirely.
pub const MIN_SEARCH_TERM_CHARS: usize = 3;

/// Upper bound on concurrent per-child checks within one listing; also the
/// default size of the SQLite reader pool.
pub const MAX_CHILD_CHECK_WORKERS: usize = 16;

/// A search term that passed the length gate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchTerm(String);

impl SearchTerm {
    /// `None` when the raw term is absent or too short to search with.
    pub fn activate(raw: Option<&str>) -> Option<Self> {
        raw.filter(|term| term.chars().count() >= MIN_SEARCH_TERM_CHARS)
            .map(|term| Self(term.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub struct HierarchyEngine<S> {
    store: Arc<S>,
}

impl<S> Clone for HierarchyEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S> std::fmt::Debug for HierarchyEngine<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierarchyEngine").finish_non_exhaustive()
    }
}

impl<S: FlatStore> HierarchyEngine<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// The whole hierarchy rooted at the first top-level record.
    pub fn tree(&self) -> Result<TreeNode> {
        let started = Instant::now();
        let records = self.store.scan()?;
        let root = tree::reconstruct(&records)
            .ok_or_else(|| TaxoError::NotFound("flat store holds no records".to_string()))?;
        debug!(
            records = records.len(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "reconstructed tree"
        );
        Ok(root)
    }

    /// Immediate children of `path` with their `hasChildren` flag.
    pub fn children(&self, path: &str) -> Result<Vec<LazyNodeView>> {
        self.list_children(path, None)
    }

    /// Immediate children of `path`, flagged against `search` when the term is long enough.
    pub fn children_with_search(&self, path: &str, search: Option<&str>) -> Result<Vec<LazyNodeView>> {
        let term = SearchTerm::activate(search);
        self.list_children(path, term.as_ref())
    }

    /// Top-level branches containing matches, each sized by its matching records.
    ///
    /// Returns `None` when the term is below the search threshold.
    pub fn search(&self, term: &str) -> Result<Option<Vec<SearchRollup>>> {
        let Some(term) = SearchTerm::activate(Some(term)) else {
            return Ok(None);
        };
        let started = Instant::now();
        let rollup = self.store.search_rollup(term.as_str())?;
        debug!(
            term = term.as_str(),
            branches = rollup.len(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "global search"
        );
        Ok(Some(rollup))
    }

    /// The `node-children` contract: a global rollup for an active search at
    /// the top level, otherwise one flagged level of children.
    pub fn node_children(&self, path: Option<&str>, search: Option<&str>) -> Result<ChildListing> {
        let path = path.unwrap_or_default();
        if path.is_empty()
            && let Some(rollup) = search.map(|term| self.search(term)).transpose()?.flatten()
        {
            return Ok(ChildListing::Rollup(rollup));
        }
        self.children_with_search(path, search)
            .map(ChildListing::Nodes)
    }

    fn list_children(&self, path: &str, term: Option<&SearchTerm>) -> Result<Vec<LazyNodeView>> {
        let started = Instant::now();
        let records = self.store.children_of(path)?;
        let views = self.annotate(&records, term)?;
        debug!(
            path,
            search = term.map(SearchTerm::as_str),
            children = views.len(),
            latency_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "listed children"
        );
        Ok(views)
    }

    /// Runs each child's checks on its own scoped worker, at most
    /// [`MAX_CHILD_CHECK_WORKERS`] at a time; one failure fails the listing.
    fn annotate(&self, records: &[NodeRecord], term: Option<&SearchTerm>) -> Result<Vec<LazyNodeView>> {
        if records.len() < 2 {
            return records
                .iter()
                .map(|record| self.annotate_one(record, term))
                .collect();
        }
        let parallelism = child_check_parallelism(records.len());
        let mut out = Vec::with_capacity(records.len());
        for batch in records.chunks(parallelism) {
            std::thread::scope(|scope| {
                let handles = batch
                    .iter()
                    .map(|record| scope.spawn(move || self.annotate_one(record, term)))
                    .collect::<Vec<_>>();
                for handle in handles {
                    let joined = handle.join().map_err(|_| {
                        TaxoError::Internal("child check worker panicked".to_string())
                    })?;
                    out.push(joined?);
                }
                Ok::<(), TaxoError>(())
            })?;
        }
        Ok(out)
    }

    fn annotate_one(&self, record: &NodeRecord, term: Option<&SearchTerm>) -> Result<LazyNodeView> {
        let has_children = self.store.has_descendant(&record.path)?;
        let (matches_search, has_search_match_in_children) = match term {
            Some(term) => (
                path::contains_ignore_case(record.name(), term.as_str()),
                self.store
                    .has_descendant_matching(&record.path, term.as_str())?,
            ),
            None => (false, false),
        };
        Ok(LazyNodeView {
            name: record.name().to_string(),
            size: record.size,
            has_children,
            matches_search,
            has_search_match_in_children,
        })
    }
}

// Checks mostly wait on SQLite, so the bound is the child count, not the CPU count.
fn child_check_parallelism(children: usize) -> usize {
    children.clamp(1, MAX_CHILD_CHECK_WORKERS)
}

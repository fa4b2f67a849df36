use std::path::Path;
use std::sync::Arc;

use tracing::info;

use crate::config::StoreConfig;
use crate::engine::HierarchyEngine;
use crate::error::Result;
use crate::ingest::{self, ImportFormat};
use crate::models::{ChildListing, ImportReport, LazyNodeView, NodeRecord, SearchRollup, TreeNode};
use crate::store::{FlatStore, SqliteFlatStore};

/// Handle over one taxonomy database: the store plus the engine reading it.
///
/// Open it once at startup and hand clones to whoever serves requests.
#[derive(Clone)]
pub struct Taxotree {
    pub store: SqliteFlatStore,
    engine: HierarchyEngine<SqliteFlatStore>,
}

impl std::fmt::Debug for Taxotree {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Taxotree").finish_non_exhaustive()
    }
}

impl Taxotree {
    pub fn open(config: &StoreConfig) -> Result<Self> {
        let store = SqliteFlatStore::open(&config.db_path, config.reader_pool)?;
        info!(db = %config.db_path.display(), "opened taxonomy store");
        Ok(Self::from_store(store))
    }

    #[must_use]
    pub fn from_store(store: SqliteFlatStore) -> Self {
        let engine = HierarchyEngine::new(Arc::new(store.clone()));
        Self { store, engine }
    }

    #[must_use]
    pub fn engine(&self) -> &HierarchyEngine<SqliteFlatStore> {
        &self.engine
    }

    pub fn tree(&self) -> Result<TreeNode> {
        self.engine.tree()
    }

    pub fn children(&self, path: &str, search: Option<&str>) -> Result<Vec<LazyNodeView>> {
        self.engine.children_with_search(path, search)
    }

    pub fn search(&self, term: &str) -> Result<Option<Vec<SearchRollup>>> {
        self.engine.search(term)
    }

    pub fn node_children(&self, path: Option<&str>, search: Option<&str>) -> Result<ChildListing> {
        self.engine.node_children(path, search)
    }

    pub fn record_count(&self) -> Result<usize> {
        self.store.count()
    }

    pub fn import_records(&self, records: &[NodeRecord]) -> Result<ImportReport> {
        self.store.insert_records(records)
    }

    pub fn import_file(&self, file: &Path, format: ImportFormat) -> Result<ImportReport> {
        let records = ingest::read_source(file, format)?;
        let report = self.import_records(&records)?;
        log_import(file, &report, false);
        Ok(report)
    }

    /// Like [`Self::import_file`], but the loaded records replace every stored
    /// row. The source is fully parsed first; the store is untouched if that
    /// or the swap fails.
    pub fn replace_from_file(&self, file: &Path, format: ImportFormat) -> Result<ImportReport> {
        let records = ingest::read_source(file, format)?;
        let report = self.store.replace_records(&records)?;
        log_import(file, &report, true);
        Ok(report)
    }
}

fn log_import(file: &Path, report: &ImportReport, replaced: bool) {
    info!(
        source = %file.display(),
        read = report.read,
        inserted = report.inserted,
        skipped_duplicates = report.skipped_duplicates,
        replaced,
        "import complete"
    );
}

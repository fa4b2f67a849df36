use std::collections::{BTreeMap, HashSet};

use crate::error::Result;
use crate::models::{ImportReport, NodeRecord, SearchRollup};
use crate::path;

use super::FlatStore;

/// Vector-backed store with the same matching rules as [`super::SqliteFlatStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryFlatStore {
    records: Vec<NodeRecord>,
}

impl MemoryFlatStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(records: impl IntoIterator<Item = NodeRecord>) -> Self {
        let mut store = Self::new();
        store.insert_records(records);
        store
    }

    pub fn insert_records(&mut self, records: impl IntoIterator<Item = NodeRecord>) -> ImportReport {
        let mut seen = self
            .records
            .iter()
            .map(|record| record.path.clone())
            .collect::<HashSet<_>>();
        let mut report = ImportReport::default();
        for record in records {
            report.read += 1;
            if seen.insert(record.path.clone()) {
                self.records.push(record);
                report.inserted += 1;
            } else {
                report.skipped_duplicates += 1;
            }
        }
        report
    }
}

impl FlatStore for MemoryFlatStore {
    fn scan(&self) -> Result<Vec<NodeRecord>> {
        Ok(self.records.clone())
    }

    fn children_of(&self, parent: &str) -> Result<Vec<NodeRecord>> {
        let target_depth = path::depth(parent) + 1;
        Ok(self
            .records
            .iter()
            .filter(|record| {
                if parent.is_empty() {
                    record.depth() == 1
                } else {
                    path::is_descendant_of_ignore_case(&record.path, parent)
                        && record.depth() == target_depth
                }
            })
            .cloned()
            .collect())
    }

    fn has_descendant(&self, path: &str) -> Result<bool> {
        Ok(self
            .records
            .iter()
            .any(|record| path::is_descendant_of_ignore_case(&record.path, path)))
    }

    fn has_descendant_matching(&self, path: &str, term: &str) -> Result<bool> {
        Ok(self.records.iter().any(|record| {
            path::is_descendant_of_ignore_case(&record.path, path)
                && path::contains_ignore_case(&record.path, term)
        }))
    }

    fn search_rollup(&self, term: &str) -> Result<Vec<SearchRollup>> {
        let mut totals = BTreeMap::<&str, i64>::new();
        for record in &self.records {
            if path::contains_ignore_case(&record.path, term) {
                *totals.entry(path::top_level(&record.path)).or_default() += record.size;
            }
        }
        Ok(totals
            .into_iter()
            .map(|(name, size)| SearchRollup {
                name: name.to_string(),
                size,
            })
            .collect())
    }

    fn count(&self) -> Result<usize> {
        Ok(self.records.len())
    }
}

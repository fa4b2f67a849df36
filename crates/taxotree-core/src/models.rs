use serde::{Deserialize, Serialize};

use crate::path;

/// One persisted row of the flat store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub path: String,
    pub size: i64,
}

impl NodeRecord {
    pub fn new(path: impl Into<String>, size: i64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        path::local_name(&self.path)
    }

    #[must_use]
    pub fn depth(&self) -> usize {
        path::depth(&self.path)
    }
}

/// Eagerly reconstructed tree node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeNode {
    pub name: String,
    pub size: i64,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn find(&self, names: &[&str]) -> Option<&TreeNode> {
        let (first, rest) = names.split_first()?;
        let child = self.children.iter().find(|child| child.name == *first)?;
        if rest.is_empty() {
            Some(child)
        } else {
            child.find(rest)
        }
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(TreeNode::node_count).sum::<usize>()
    }
}

/// One level of a lazy listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LazyNodeView {
    pub name: String,
    pub size: i64,
    pub has_children: bool,
    pub matches_search: bool,
    pub has_search_match_in_children: bool,
}

/// Global search result: a top-level branch and the summed size of its matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRollup {
    pub name: String,
    pub size: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ChildListing {
    Nodes(Vec<LazyNodeView>),
    Rollup(Vec<SearchRollup>),
}

impl ChildListing {
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Nodes(nodes) => nodes.len(),
            Self::Rollup(rollup) => rollup.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub read: usize,
    pub inserted: usize,
    pub skipped_duplicates: usize,
}

//! Eager reconstruction of the whole hierarchy from flat records.

use std::collections::HashMap;

use crate::models::{NodeRecord, TreeNode};
use crate::path;

struct ArenaNode {
    name: String,
    size: i64,
    children: Vec<usize>,
}

/// Builds every top-level subtree, in first-seen order.
///
/// Nodes are keyed by their full ancestor path, so two unrelated branches
/// that share a local name (`A > Other`, `B > Other`) stay separate. An
/// ancestor that never appears as its own record keeps size 0.
pub fn reconstruct_forest(records: &[NodeRecord]) -> Vec<TreeNode> {
    let mut arena = Vec::<ArenaNode>::new();
    let mut roots = Vec::<usize>::new();
    let mut by_path = HashMap::<&str, usize>::with_capacity(records.len());

    for record in records {
        let mut parent = None::<usize>;
        let mut start = 0usize;
        for end in path::prefix_ends(&record.path) {
            let prefix = &record.path[..end];
            let idx = match by_path.get(prefix) {
                Some(idx) => *idx,
                None => {
                    let idx = arena.len();
                    arena.push(ArenaNode {
                        name: record.path[start..end].to_string(),
                        size: 0,
                        children: Vec::new(),
                    });
                    by_path.insert(prefix, idx);
                    match parent {
                        Some(parent) => arena[parent].children.push(idx),
                        None => roots.push(idx),
                    }
                    idx
                }
            };
            parent = Some(idx);
            start = end + path::DELIMITER.len();
        }
        if let Some(idx) = parent {
            arena[idx].size = record.size;
        }
    }

    roots
        .into_iter()
        .map(|root| materialize(&mut arena, root))
        .collect()
}

/// The first top-level subtree, or `None` for an empty store.
pub fn reconstruct(records: &[NodeRecord]) -> Option<TreeNode> {
    reconstruct_forest(records).into_iter().next()
}

fn materialize(arena: &mut [ArenaNode], idx: usize) -> TreeNode {
    let name = std::mem::take(&mut arena[idx].name);
    let child_ids = std::mem::take(&mut arena[idx].children);
    let size = arena[idx].size;
    let children = child_ids
        .into_iter()
        .map(|child| materialize(arena, child))
        .collect();
    TreeNode {
        name,
        size,
        children,
    }
}

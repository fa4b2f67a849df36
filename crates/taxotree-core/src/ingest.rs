//! Offline ingestion: turn a source hierarchy into flat store records.

use std::path::Path;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Result, TaxoError};
use crate::models::NodeRecord;
use crate::path::{self, DELIMITER};

/// Nested source node, e.g. an ImageNet synset tree exported to JSON.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceNode {
    pub name: String,
    #[serde(default)]
    pub children: Vec<SourceNode>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportFormat {
    /// One nested JSON document.
    Tree,
    /// JSON Lines of `{"path": ..., "size": ...}`.
    Jsonl,
}

impl ImportFormat {
    /// `.jsonl` / `.ndjson` files are records, anything else a nested tree.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("jsonl" | "ndjson") => Self::Jsonl,
            _ => Self::Tree,
        }
    }
}

/// Flattens `root` depth-first, parents before children.
///
/// Each record's size is the number of nodes beneath it.
pub fn linearize(root: &SourceNode) -> Result<Vec<NodeRecord>> {
    let mut out = Vec::new();
    push_subtree(root, "", &mut out)?;
    Ok(out)
}

fn push_subtree(node: &SourceNode, parent: &str, out: &mut Vec<NodeRecord>) -> Result<i64> {
    validate_name(&node.name)?;
    let current = path::join(parent, &node.name);
    let slot = out.len();
    out.push(NodeRecord::new(current.clone(), 0));

    let mut descendants = 0i64;
    for child in &node.children {
        descendants += 1 + push_subtree(child, &current, out)?;
    }
    out[slot].size = descendants;
    Ok(descendants)
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TaxoError::Validation("node name must not be empty".to_string()));
    }
    if name.contains(DELIMITER) {
        return Err(TaxoError::Validation(format!(
            "node name contains the path delimiter {DELIMITER:?}: {name}"
        )));
    }
    Ok(())
}

/// A JSONL record file read line by line; malformed lines are counted, not fatal.
#[derive(Debug, Default)]
struct RecordLines {
    records: Vec<NodeRecord>,
    rejected: usize,
    first_rejection: Option<(usize, String)>,
}

impl RecordLines {
    fn read(raw: &str) -> Self {
        let mut lines = Self::default();
        let non_blank = raw
            .lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty());
        for (idx, line) in non_blank {
            match serde_json::from_str::<NodeRecord>(line) {
                Ok(record) => lines.records.push(record),
                Err(err) => {
                    lines.rejected += 1;
                    if lines.first_rejection.is_none() {
                        lines.first_rejection = Some((idx + 1, err.to_string()));
                    }
                }
            }
        }
        lines
    }

    /// Fails only when nothing but malformed lines was found.
    fn into_records(self, label: &str) -> Result<Vec<NodeRecord>> {
        let Some((line_no, message)) = self.first_rejection else {
            return Ok(self.records);
        };
        if self.records.is_empty() {
            return Err(TaxoError::Validation(format!(
                "{label}: no readable records ({} malformed lines, first at line {line_no}: {message})",
                self.rejected
            )));
        }
        warn!(
            source = label,
            skipped = self.rejected,
            first_line = line_no,
            error = message.as_str(),
            "skipped malformed record lines"
        );
        Ok(self.records)
    }
}

/// Parses JSON Lines of `{"path", "size"}` records.
pub fn parse_records_jsonl(raw: &str, label: &str) -> Result<Vec<NodeRecord>> {
    let records = RecordLines::read(raw).into_records(label)?;
    for record in &records {
        for segment in path::segments(&record.path) {
            validate_name(segment)?;
        }
    }
    let orphans = count_orphans(&records);
    if orphans > 0 {
        warn!(source = label, orphans, "records whose parent path is not stored");
    }
    Ok(records)
}

/// Records whose parent path never appears in the batch.
pub fn count_orphans(records: &[NodeRecord]) -> usize {
    let known = records
        .iter()
        .map(|record| record.path.as_str())
        .collect::<std::collections::HashSet<_>>();
    records
        .iter()
        .filter_map(|record| path::parent_path(&record.path))
        .filter(|parent| !known.contains(parent))
        .count()
}

/// Reads a source file into records according to `format`.
pub fn read_source(file: &Path, format: ImportFormat) -> Result<Vec<NodeRecord>> {
    let raw = std::fs::read_to_string(file)?;
    match format {
        ImportFormat::Tree => {
            let root = serde_json::from_str::<SourceNode>(&raw)?;
            linearize(&root)
        }
        ImportFormat::Jsonl => parse_records_jsonl(&raw, &file.display().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str, children: Vec<SourceNode>) -> SourceNode {
        SourceNode {
            name: name.to_string(),
            children,
        }
    }

    #[test]
    fn linearize_emits_preorder_with_descendant_counts() {
        let root = node(
            "Animal",
            vec![
                node("Dog", vec![node("Puppy", Vec::new())]),
                node("Cat", Vec::new()),
            ],
        );
        let records = linearize(&root).expect("linearize");
        assert_eq!(
            records,
            vec![
                NodeRecord::new("Animal", 3),
                NodeRecord::new("Animal > Dog", 1),
                NodeRecord::new("Animal > Dog > Puppy", 0),
                NodeRecord::new("Animal > Cat", 0),
            ]
        );
        assert_eq!(count_orphans(&records), 0);
    }

    #[test]
    fn linearize_rejects_delimiter_inside_name() {
        let root = node("Animal", vec![node("Dog > Puppy", Vec::new())]);
        let err = linearize(&root).expect_err("delimiter in name");
        assert_eq!(err.code(), "VALIDATION_FAILED");
    }

    #[test]
    fn nested_json_source_deserializes_without_children_key() {
        let root: SourceNode =
            serde_json::from_str(r#"{"name":"Animal","children":[{"name":"Dog"}]}"#)
                .expect("parse tree");
        assert_eq!(root.children.len(), 1);
        assert!(root.children[0].children.is_empty());
    }

    #[test]
    fn jsonl_skips_bad_lines_but_keeps_good_ones() {
        let raw = "{\"path\":\"Animal\",\"size\":1}\nnot json\n\n{\"path\":\"Animal > Dog\",\"size\":0}\n";
        let records = parse_records_jsonl(raw, "fixture").expect("parse");
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].name(), "Dog");
    }

    #[test]
    fn jsonl_with_only_bad_lines_fails() {
        let err = parse_records_jsonl("nope\nstill nope\n", "fixture").expect_err("all invalid");
        assert_eq!(err.code(), "VALIDATION_FAILED");
        assert!(err.to_string().contains("2 malformed lines"));
        assert!(err.to_string().contains("first at line 1"));
    }

    #[test]
    fn jsonl_line_numbers_count_blank_lines() {
        let lines = RecordLines::read("\n\n{\"path\":\"A\",\"size\":0}\n{oops}\n");
        assert_eq!(lines.records.len(), 1);
        assert_eq!(lines.rejected, 1);
        assert_eq!(lines.first_rejection.map(|(line, _)| line), Some(4));
    }

    #[test]
    fn empty_jsonl_source_yields_no_records() {
        assert!(parse_records_jsonl("\n  \n", "fixture").expect("empty").is_empty());
    }

    #[test]
    fn orphans_are_counted() {
        let records = vec![
            NodeRecord::new("Animal", 1),
            NodeRecord::new("Plant > Tree", 0),
        ];
        assert_eq!(count_orphans(&records), 1);
    }

    #[test]
    fn format_follows_extension() {
        assert_eq!(ImportFormat::from_path(Path::new("a.jsonl")), ImportFormat::Jsonl);
        assert_eq!(ImportFormat::from_path(Path::new("a.ndjson")), ImportFormat::Jsonl);
        assert_eq!(ImportFormat::from_path(Path::new("a.json")), ImportFormat::Tree);
    }
}

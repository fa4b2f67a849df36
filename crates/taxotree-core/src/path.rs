//! Encoded hierarchy paths.
//!
//! A node's ancestry is stored as one string: every level's display name
//! joined by [`DELIMITER`], e.g. `"Animal > Mammal > Dog"`. Names never
//! contain the delimiter; ingestion rejects them, queries do not re-check.

/// Separator between levels of an encoded path.
pub const DELIMITER: &str = " > ";

pub fn encode<S: AsRef<str>>(names: &[S]) -> String {
    let mut out = String::new();
    for (idx, name) in names.iter().enumerate() {
        if idx > 0 {
            out.push_str(DELIMITER);
        }
        out.push_str(name.as_ref());
    }
    out
}

/// Appends one level to `parent`. An empty parent yields a top-level path.
#[must_use]
pub fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}{DELIMITER}{name}")
    }
}

#[must_use]
pub fn local_name(path: &str) -> &str {
    match path.rfind(DELIMITER) {
        Some(idx) => &path[idx + DELIMITER.len()..],
        None => path,
    }
}

#[must_use]
pub fn parent_path(path: &str) -> Option<&str> {
    path.rfind(DELIMITER).map(|idx| &path[..idx])
}

#[must_use]
pub fn top_level(path: &str) -> &str {
    match path.find(DELIMITER) {
        Some(idx) => &path[..idx],
        None => path,
    }
}

pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split(DELIMITER)
}

#[must_use]
pub fn depth(path: &str) -> usize {
    if path.is_empty() {
        return 0;
    }
    path.matches(DELIMITER).count() + 1
}

/// Byte offsets where each ancestor prefix of `path` ends, the path itself last.
///
/// `"A > B > C"` yields `[1, 5, 9]`, so `&path[..end]` walks `A`, `A > B`,
/// `A > B > C` without allocating.
pub fn prefix_ends(path: &str) -> impl Iterator<Item = usize> + '_ {
    path.match_indices(DELIMITER)
        .map(|(idx, _)| idx)
        .chain(std::iter::once(path.len()))
}

/// True iff `path` lies strictly under `ancestor`.
///
/// The delimiter is part of the required prefix, so `Catalog` is never a
/// descendant of `Cat`.
#[must_use]
pub fn is_descendant_of(path: &str, ancestor: &str) -> bool {
    path.len() > ancestor.len() + DELIMITER.len()
        && path.starts_with(ancestor)
        && path[ancestor.len()..].starts_with(DELIMITER)
}

/// Lowercases every character on its own, without context rules.
///
/// Folding is per character, so `fold_case(a + b) == fold_case(a) + fold_case(b)`
/// and prefix tests on folded strings agree with prefix tests on the originals.
/// The SQLite store registers this same function for its queries.
#[must_use]
pub fn fold_case(raw: &str) -> String {
    raw.chars().flat_map(char::to_lowercase).collect()
}

/// Case-insensitive variant of [`is_descendant_of`].
#[must_use]
pub fn is_descendant_of_ignore_case(path: &str, ancestor: &str) -> bool {
    let prefix = fold_case(ancestor) + DELIMITER;
    fold_case(path).starts_with(&prefix)
}

#[must_use]
pub fn starts_with_ignore_case(haystack: &str, prefix: &str) -> bool {
    fold_case(haystack).starts_with(&fold_case(prefix))
}

#[must_use]
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    fold_case(haystack).contains(&fold_case(needle))
}

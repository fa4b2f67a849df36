use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, params};
use tracing::debug;

use crate::error::{Result, TaxoError};
use crate::models::{ImportReport, NodeRecord, SearchRollup};
use crate::path::{self, DELIMITER};

use super::{FlatStore, INSERT_BATCH_SIZE, like_escape};

const SCHEMA_SQL: &str = r"
    PRAGMA journal_mode = WAL;
    CREATE TABLE IF NOT EXISTS taxonomy_nodes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        path TEXT NOT NULL UNIQUE,
        size INTEGER NOT NULL
    );
";

/// SQL name of [`path::fold_case`], registered on every connection.
const FOLD_FN: &str = "taxo_fold";

const CHILDREN_SQL: &str = r"
    SELECT path, size
    FROM taxonomy_nodes
    WHERE taxo_fold(path) LIKE ?1 ESCAPE '\'
      AND taxo_fold(path) NOT LIKE ?2 ESCAPE '\'
    ORDER BY id
";

const TOP_LEVEL_SQL: &str = r"
    SELECT path, size
    FROM taxonomy_nodes
    WHERE path NOT LIKE ?1 ESCAPE '\'
    ORDER BY id
";

const HAS_DESCENDANT_SQL: &str = r"
    SELECT 1 FROM taxonomy_nodes
    WHERE taxo_fold(path) LIKE ?1 ESCAPE '\'
    LIMIT 1
";

const HAS_MATCHING_DESCENDANT_SQL: &str = r"
    SELECT 1 FROM taxonomy_nodes
    WHERE taxo_fold(path) LIKE ?1 ESCAPE '\'
      AND taxo_fold(path) LIKE ?2 ESCAPE '\'
    LIMIT 1
";

// ?1 = folded term pattern, ?2 = delimiter
const SEARCH_ROLLUP_SQL: &str = r"
    WITH matched_nodes AS (
        SELECT path, size
        FROM taxonomy_nodes
        WHERE taxo_fold(path) LIKE ?1 ESCAPE '\'
    ),
    top_level_nodes AS (
        SELECT DISTINCT
          CASE
            WHEN instr(path, ?2) > 0 THEN substr(path, 1, instr(path, ?2) - 1)
            ELSE path
          END AS top_name
        FROM matched_nodes
    )
    SELECT
      t.top_name AS name,
      CAST(COALESCE(SUM(m.size), 0) AS INTEGER) AS size
    FROM top_level_nodes t
    LEFT JOIN matched_nodes m
      ON m.path = t.top_name
      OR substr(m.path, 1, length(t.top_name) + length(?2)) = t.top_name || ?2
    GROUP BY t.top_name
    ORDER BY t.top_name
";

/// SQLite-backed flat store.
///
/// One connection takes writes; a small pool of reader connections serves
/// queries so per-child checks from one listing can run side by side.
#[derive(Clone)]
pub struct SqliteFlatStore {
    writer: Arc<Mutex<Connection>>,
    readers: Arc<Vec<Mutex<Connection>>>,
    next_reader: Arc<AtomicUsize>,
}

impl std::fmt::Debug for SqliteFlatStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteFlatStore")
            .field("readers", &self.readers.len())
            .finish_non_exhaustive()
    }
}

impl SqliteFlatStore {
    pub fn open(path: impl AsRef<Path>, reader_pool: usize) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let writer = open_connection(path)?;
        writer.execute_batch(SCHEMA_SQL)?;

        let mut readers = Vec::with_capacity(reader_pool.max(1));
        for _ in 0..reader_pool.max(1) {
            readers.push(Mutex::new(open_connection(path)?));
        }
        debug!(path = %path.display(), readers = readers.len(), "opened flat store");

        Ok(Self {
            writer: Arc::new(Mutex::new(writer)),
            readers: Arc::new(readers),
            next_reader: Arc::new(AtomicUsize::new(0)),
        })
    }

    fn with_reader<T>(&self, f: impl FnOnce(&Connection) -> Result<T>) -> Result<T> {
        let conn = self.acquire_reader()?;
        f(&conn)
    }

    fn acquire_reader(&self) -> Result<MutexGuard<'_, Connection>> {
        let start = self.next_reader.fetch_add(1, Ordering::Relaxed);
        let len = self.readers.len();
        for offset in 0..len {
            if let Ok(guard) = self.readers[(start + offset) % len].try_lock() {
                return Ok(guard);
            }
        }
        self.readers[start % len]
            .lock()
            .map_err(|_| TaxoError::mutex_poisoned("sqlite reader"))
    }

    fn with_tx<T>(&self, f: impl FnOnce(&rusqlite::Transaction<'_>) -> Result<T>) -> Result<T> {
        let mut conn = self
            .writer
            .lock()
            .map_err(|_| TaxoError::mutex_poisoned("sqlite writer"))?;
        let tx = conn.transaction()?;
        let value = f(&tx)?;
        tx.commit()?;
        drop(conn);
        Ok(value)
    }

    /// Inserts records in insertion order; a path already present is skipped.
    pub fn insert_records(&self, records: &[NodeRecord]) -> Result<ImportReport> {
        let mut report = ImportReport {
            read: records.len(),
            ..ImportReport::default()
        };
        for batch in records.chunks(INSERT_BATCH_SIZE) {
            report.inserted += self.with_tx(|tx| insert_batch(tx, batch))?;
        }
        report.skipped_duplicates = report.read - report.inserted;
        debug!(
            read = report.read,
            inserted = report.inserted,
            "inserted flat store records"
        );
        Ok(report)
    }

    /// Swaps the whole table for `records` in one transaction.
    ///
    /// Readers see either the old rows or the new ones; a failure leaves the
    /// old rows in place.
    pub fn replace_records(&self, records: &[NodeRecord]) -> Result<ImportReport> {
        let (removed, inserted) = self.with_tx(|tx| {
            let removed = tx.execute("DELETE FROM taxonomy_nodes", [])?;
            let mut inserted = 0usize;
            for batch in records.chunks(INSERT_BATCH_SIZE) {
                inserted += insert_batch(tx, batch)?;
            }
            Ok((removed, inserted))
        })?;
        let report = ImportReport {
            read: records.len(),
            inserted,
            skipped_duplicates: records.len() - inserted,
        };
        debug!(removed, inserted, "replaced flat store records");
        Ok(report)
    }

    pub fn clear(&self) -> Result<()> {
        self.with_tx(|tx| {
            tx.execute("DELETE FROM taxonomy_nodes", [])?;
            Ok(())
        })
    }
}

fn insert_batch(tx: &rusqlite::Transaction<'_>, batch: &[NodeRecord]) -> Result<usize> {
    let mut stmt =
        tx.prepare_cached("INSERT OR IGNORE INTO taxonomy_nodes(path, size) VALUES (?1, ?2)")?;
    let mut inserted = 0usize;
    for record in batch {
        inserted += stmt.execute(params![record.path, record.size])?;
    }
    Ok(inserted)
}

impl FlatStore for SqliteFlatStore {
    fn scan(&self) -> Result<Vec<NodeRecord>> {
        self.with_reader(|conn| {
            let mut stmt = conn.prepare("SELECT path, size FROM taxonomy_nodes ORDER BY id")?;
            collect_records(&mut stmt, [])
        })
    }

    fn children_of(&self, parent: &str) -> Result<Vec<NodeRecord>> {
        self.with_reader(|conn| {
            if parent.is_empty() {
                let mut stmt = conn.prepare_cached(TOP_LEVEL_SQL)?;
                let any_nested = format!("%{}%", like_escape(DELIMITER));
                return collect_records(&mut stmt, params![any_nested]);
            }
            let prefix = format!(
                "{}{}",
                like_escape(&path::fold_case(parent)),
                like_escape(DELIMITER)
            );
            let direct = format!("{prefix}%");
            let nested = format!("{prefix}%{}%", like_escape(DELIMITER));
            let mut stmt = conn.prepare_cached(CHILDREN_SQL)?;
            collect_records(&mut stmt, params![direct, nested])
        })
    }

    fn has_descendant(&self, path: &str) -> Result<bool> {
        let pattern = descendant_pattern(path);
        self.with_reader(|conn| {
            let mut stmt = conn.prepare_cached(HAS_DESCENDANT_SQL)?;
            let hit = stmt
                .query_row(params![pattern], |row| row.get::<_, i64>(0))
                .optional()?;
            Ok(hit.is_some())
        })
    }

    fn has_descendant_matching(&self, path: &str, term: &str) -> Result<bool> {
        let pattern = descendant_pattern(path);
        let term_pattern = contains_pattern(term);
        self.with_reader(|conn| {
            let mut stmt = conn.prepare_cached(HAS_MATCHING_DESCENDANT_SQL)?;
            let hit = stmt
                .query_row(params![pattern, term_pattern], |row| row.get::<_, i64>(0))
                .optional()?;
            Ok(hit.is_some())
        })
    }

    fn search_rollup(&self, term: &str) -> Result<Vec<SearchRollup>> {
        let term_pattern = contains_pattern(term);
        self.with_reader(|conn| {
            let mut stmt = conn.prepare_cached(SEARCH_ROLLUP_SQL)?;
            let rows = stmt.query_map(params![term_pattern, DELIMITER], |row| {
                Ok(SearchRollup {
                    name: row.get(0)?,
                    size: row.get(1)?,
                })
            })?;
            let mut out = Vec::new();
            for row in rows {
                out.push(row?);
            }
            Ok(out)
        })
    }

    fn count(&self) -> Result<usize> {
        self.with_reader(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM taxonomy_nodes", [], |row| row.get(0))?;
            Ok(usize::try_from(count).unwrap_or(0))
        })
    }
}

fn open_connection(db_path: &Path) -> Result<Connection> {
    let conn = Connection::open(db_path)?;
    conn.create_scalar_function(
        FOLD_FN,
        1,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let raw = ctx.get_raw(0).as_str().map_err(|err| {
                rusqlite::Error::UserFunctionError(Box::new(err))
            })?;
            Ok(path::fold_case(raw))
        },
    )?;
    Ok(conn)
}

// Patterns are matched against `taxo_fold(path)`, so every bound value is
// folded the same way before escaping.
fn descendant_pattern(ancestor: &str) -> String {
    format!("{}{}%", like_escape(&path::fold_case(ancestor)), like_escape(DELIMITER))
}

fn contains_pattern(term: &str) -> String {
    format!("%{}%", like_escape(&path::fold_case(term)))
}

fn collect_records(
    stmt: &mut rusqlite::Statement<'_>,
    params: impl rusqlite::Params,
) -> Result<Vec<NodeRecord>> {
    let rows = stmt.query_map(params, |row| {
        Ok(NodeRecord {
            path: row.get(0)?,
            size: row.get(1)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

//! Durable store for the PDF-extraction table
//!
//! The extraction table has to survive a dashboard restart, so columns are
//! kept in a small SQLite database under the data directory. Metric data and
//! screenshot paths are stored as JSON text.

use crate::error::Result;
use crate::extraction::ExtractionColumn;
use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;
use std::path::Path;

const CREATE_EXTRACTIONS_TABLE: &str = "
    CREATE TABLE IF NOT EXISTS extractions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        filename TEXT NOT NULL UNIQUE,
        data TEXT NOT NULL,
        screenshot_paths TEXT NOT NULL,
        extraction_error TEXT,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
";

/// SQLite-backed extraction column store
pub struct ExtractionStore {
    conn: Mutex<Connection>,
}

impl ExtractionStore {
    /// Open (or create) the store at `path`
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for better concurrent access
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;

        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let conn = self.conn.lock();

        conn.execute(
            "CREATE TABLE IF NOT EXISTS migrations (
                id INTEGER PRIMARY KEY,
                name TEXT NOT NULL UNIQUE,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            )",
            [],
        )?;

        run_migration(&conn, "001_extractions", CREATE_EXTRACTIONS_TABLE)?;

        Ok(())
    }

    /// Insert a column, replacing any previous column with the same filename
    pub fn insert(&self, column: &ExtractionColumn) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute(
            "INSERT INTO extractions (filename, data, screenshot_paths, extraction_error)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(filename) DO UPDATE SET
                 data = excluded.data,
                 screenshot_paths = excluded.screenshot_paths,
                 extraction_error = excluded.extraction_error",
            params![
                column.filename,
                serde_json::to_string(&column.data)?,
                serde_json::to_string(&column.screenshot_paths)?,
                column.extraction_error,
            ],
        )?;
        Ok(())
    }

    /// All columns in insertion order
    pub fn list(&self) -> Result<Vec<ExtractionColumn>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare(
            "SELECT filename, data, screenshot_paths, extraction_error
             FROM extractions ORDER BY id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Option<String>>(3)?,
            ))
        })?;

        let mut columns = Vec::new();
        for row in rows {
            let (filename, data, screenshot_paths, extraction_error) = row?;
            columns.push(ExtractionColumn {
                filename,
                data: serde_json::from_str(&data)?,
                screenshot_paths: serde_json::from_str(&screenshot_paths)?,
                extraction_error,
            });
        }

        Ok(columns)
    }

    /// Filenames currently in the store, in insertion order
    pub fn filenames(&self) -> Result<Vec<String>> {
        let conn = self.conn.lock();
        let mut stmt = conn.prepare("SELECT filename FROM extractions ORDER BY id")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(names)
    }

    /// Overwrite one metric field of one column. Returns false when no
    /// column with that filename exists.
    pub fn patch_field(&self, filename: &str, field: &str, value: &str) -> Result<bool> {
        let conn = self.conn.lock();

        let data: Option<String> = conn
            .query_row(
                "SELECT data FROM extractions WHERE filename = ?1",
                [filename],
                |row| row.get(0),
            )
            .optional()?;

        let Some(data) = data else {
            return Ok(false);
        };

        let mut map: BTreeMap<String, String> = serde_json::from_str(&data)?;
        map.insert(field.to_string(), value.to_string());

        conn.execute(
            "UPDATE extractions SET data = ?1 WHERE filename = ?2",
            params![serde_json::to_string(&map)?, filename],
        )?;

        Ok(true)
    }

    /// Remove one column by filename. Returns whether a row was deleted.
    pub fn remove(&self, filename: &str) -> Result<bool> {
        let conn = self.conn.lock();
        let deleted = conn.execute("DELETE FROM extractions WHERE filename = ?1", [filename])?;
        Ok(deleted > 0)
    }

    /// Drop every column
    pub fn clear(&self) -> Result<()> {
        let conn = self.conn.lock();
        conn.execute("DELETE FROM extractions", [])?;
        Ok(())
    }
}

fn run_migration(conn: &Connection, name: &str, sql: &str) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM migrations WHERE name = ?)",
        [name],
        |row| row.get(0),
    )?;

    if !exists {
        tracing::info!("Running migration: {}", name);
        conn.execute_batch(sql)?;
        conn.execute("INSERT INTO migrations (name) VALUES (?)", [name])?;
    }

    Ok(())
}

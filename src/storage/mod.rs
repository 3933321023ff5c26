use crate::error::{HealthaiError, Result};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::types::Type;
use rusqlite::Error::FromSqlConversionFailure;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::{AnalysisRecord, Severity};

/// Default number of analyses retained
pub const DEFAULT_HISTORY_CAP: usize = 10;

/// Capped store of recent symptom analyses
///
/// Holds at most `cap` records. Recording a new analysis evicts the oldest
/// ones beyond the cap in the same transaction, and listings are newest
/// first.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    db_path: PathBuf,
    cap: usize,
}

impl HistoryStore {
    /// Create a store in the user's data directory
    ///
    /// `HEALTHAI_HISTORY_DB` overrides the location.
    pub fn new(cap: usize) -> Result<Self> {
        if let Ok(override_path) = std::env::var("HEALTHAI_HISTORY_DB") {
            return Self::new_with_path(override_path, cap);
        }

        let proj_dirs = ProjectDirs::from("com", "healthai", "healthai")
            .ok_or_else(|| HealthaiError::Storage("Could not determine data directory".into()))?;

        Self::new_with_path(proj_dirs.data_dir().join("history.db"), cap)
    }

    /// Open the store described by the `history` config section
    pub fn from_config(config: &crate::config::HistoryConfig) -> Result<Self> {
        match &config.db_path {
            Some(path) => Self::new_with_path(path.clone(), config.max_entries),
            None => Self::new(config.max_entries),
        }
    }

    /// Create a store backed by the given database file
    ///
    /// # Examples
    ///
    /// ```
    /// use healthai::storage::HistoryStore;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let store = HistoryStore::new_with_path(dir.path().join("history.db"), 10).unwrap();
    /// assert!(store.is_empty().unwrap());
    /// ```
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P, cap: usize) -> Result<Self> {
        let db_path = db_path.into();

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .context("Failed to create parent directory for database")
                .map_err(|e| HealthaiError::Storage(e.to_string()))?;
        }

        let store = Self {
            db_path,
            cap: cap.max(1),
        };
        store.init()?;
        Ok(store)
    }

    /// Location of the backing database
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Maximum number of retained analyses
    pub fn cap(&self) -> usize {
        self.cap
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| HealthaiError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;

        // `seq` orders records even when two share a timestamp
        conn.execute(
            "CREATE TABLE IF NOT EXISTS analyses (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                symptoms TEXT NOT NULL,
                analysis TEXT NOT NULL,
                created_at TEXT NOT NULL,
                severity TEXT NOT NULL,
                duration TEXT
            )",
            [],
        )
        .context("Failed to create tables")
        .map_err(|e| HealthaiError::Storage(e.to_string()))?;

        Ok(())
    }

    /// Save an analysis and evict anything beyond the cap
    pub fn record(
        &self,
        symptoms: &str,
        analysis: &str,
        severity: Severity,
        duration: Option<&str>,
    ) -> Result<AnalysisRecord> {
        let record = AnalysisRecord {
            id: uuid::Uuid::new_v4().to_string(),
            symptoms: symptoms.to_string(),
            analysis: analysis.to_string(),
            timestamp: Utc::now(),
            severity,
            duration: duration.map(str::to_string),
        };

        let mut conn = self.open()?;
        let tx = conn
            .transaction()
            .context("Failed to start transaction")
            .map_err(|e| HealthaiError::Storage(e.to_string()))?;

        tx.execute(
            "INSERT INTO analyses (id, symptoms, analysis, created_at, severity, duration)
            VALUES (?, ?, ?, ?, ?, ?)",
            params![
                record.id,
                record.symptoms,
                record.analysis,
                record.timestamp.to_rfc3339(),
                record.severity.as_str(),
                record.duration
            ],
        )
        .context("Failed to insert analysis")
        .map_err(|e| HealthaiError::Storage(e.to_string()))?;

        let evicted = tx
            .execute(
                "DELETE FROM analyses WHERE seq NOT IN (
                    SELECT seq FROM analyses ORDER BY seq DESC LIMIT ?
                )",
                params![self.cap as i64],
            )
            .context("Failed to evict old analyses")
            .map_err(|e| HealthaiError::Storage(e.to_string()))?;

        tx.commit()
            .context("Failed to commit transaction")
            .map_err(|e| HealthaiError::Storage(e.to_string()))?;

        if evicted > 0 {
            tracing::debug!(evicted, cap = self.cap, "Evicted old analyses");
        }

        Ok(record)
    }

    /// All retained analyses, newest first
    pub fn list(&self) -> Result<Vec<AnalysisRecord>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, symptoms, analysis, created_at, severity, duration
                FROM analyses
                ORDER BY seq DESC",
            )
            .context("Failed to prepare statement")
            .map_err(|e| HealthaiError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map([], row_to_record)
            .context("Failed to query analyses")
            .map_err(|e| HealthaiError::Storage(e.to_string()))?;

        let records = rows
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to read analyses")
            .map_err(|e| HealthaiError::Storage(format!("{:#}", e)))?;
        Ok(records)
    }

    /// Load one analysis by full id or unique prefix
    ///
    /// Returns `None` when nothing matches, including for ids with characters
    /// outside a UUID. A prefix shared by several analyses is an error.
    pub fn get(&self, id: &str) -> Result<Option<AnalysisRecord>> {
        let conn = self.open()?;
        let Some(id) = resolve_id(&conn, id)? else {
            return Ok(None);
        };

        conn.query_row(
            "SELECT id, symptoms, analysis, created_at, severity, duration
            FROM analyses WHERE id = ?",
            params![id],
            row_to_record,
        )
        .optional()
        .context("Failed to query analysis")
        .map_err(|e| HealthaiError::Storage(format!("{:#}", e)).into())
    }

    /// Delete one analysis by full id or unique prefix; returns the number removed
    pub fn delete(&self, id: &str) -> Result<usize> {
        let conn = self.open()?;
        let Some(id) = resolve_id(&conn, id)? else {
            return Ok(0);
        };

        conn.execute("DELETE FROM analyses WHERE id = ?", params![id])
            .context("Failed to delete analysis")
            .map_err(|e| HealthaiError::Storage(e.to_string()).into())
    }

    /// Remove every saved analysis
    pub fn clear(&self) -> Result<usize> {
        let conn = self.open()?;
        conn.execute("DELETE FROM analyses", [])
            .context("Failed to clear history")
            .map_err(|e| HealthaiError::Storage(e.to_string()).into())
    }

    /// Number of retained analyses
    pub fn len(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn
            .query_row("SELECT count(*) FROM analyses", [], |r| r.get(0))
            .context("Failed to count analyses")
            .map_err(|e| HealthaiError::Storage(e.to_string()))?;
        Ok(count as usize)
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

/// Map a full id or prefix to the single stored id it names
///
/// Only hex digits and `-` can appear in an id, so anything else matches
/// nothing. The comparison is a plain `substr` so no input acts as a pattern.
fn resolve_id(conn: &Connection, id: &str) -> Result<Option<String>> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
        return Ok(None);
    }
    let id = id.to_ascii_lowercase();

    let mut stmt = conn
        .prepare("SELECT id FROM analyses WHERE substr(id, 1, length(?1)) = ?1 LIMIT 2")
        .context("Failed to prepare statement")
        .map_err(|e| HealthaiError::Storage(e.to_string()))?;
    let matches = stmt
        .query_map(params![id], |row| row.get::<_, String>(0))
        .and_then(|rows| rows.collect::<rusqlite::Result<Vec<_>>>())
        .context("Failed to look up analysis id")
        .map_err(|e| HealthaiError::Storage(format!("{:#}", e)))?;

    match matches.as_slice() {
        [] => Ok(None),
        [only] => Ok(Some(only.clone())),
        _ => Err(HealthaiError::Storage(format!(
            "Ambiguous id prefix '{}': more than one analysis matches",
            id
        ))
        .into()),
    }
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    let created_at: String = row.get(3)?;
    let severity: String = row.get(4)?;

    let timestamp = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;
    let severity = Severity::parse_str(&severity)
        .map_err(|e| FromSqlConversionFailure(4, Type::Text, e.into()))?;

    Ok(AnalysisRecord {
        id: row.get(0)?,
        symptoms: row.get(1)?,
        analysis: row.get(2)?,
        timestamp,
        severity,
        duration: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::tempdir;

    fn create_test_store(cap: usize) -> (HistoryStore, tempfile::TempDir) {
        let dir = tempdir().expect("failed to create tempdir");
        let store = HistoryStore::new_with_path(dir.path().join("history.db"), cap)
            .expect("failed to create store");
        (store, dir)
    }

    #[test]
    fn test_init_creates_table() {
        let (store, _dir) = create_test_store(10);
        let conn = Connection::open(store.path()).expect("open connection");
        let count: i64 = conn
            .query_row(
                "SELECT count(*) FROM sqlite_master WHERE type='table' AND name='analyses'",
                [],
                |r| r.get(0),
            )
            .expect("query row");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_record_and_get_round_trip() {
        let (store, _dir) = create_test_store(10);
        let saved = store
            .record("headache", "## Analysis", Severity::Moderate, Some("2 days"))
            .expect("record failed");

        let loaded = store.get(&saved.id).expect("get failed").expect("missing");
        assert_eq!(loaded.symptoms, "headache");
        assert_eq!(loaded.analysis, "## Analysis");
        assert_eq!(loaded.severity, Severity::Moderate);
        assert_eq!(loaded.duration.as_deref(), Some("2 days"));
    }

    #[test]
    fn test_get_by_prefix() {
        let (store, _dir) = create_test_store(10);
        let saved = store
            .record("cough", "rest", Severity::Mild, None)
            .expect("record failed");

        let loaded = store.get(&saved.id[..8]).expect("get failed");
        assert_eq!(loaded.map(|r| r.id), Some(saved.id));
    }

    #[test]
    fn test_cap_keeps_ten_most_recent_newest_first() {
        let (store, _dir) = create_test_store(DEFAULT_HISTORY_CAP);
        for i in 0..13 {
            store
                .record(&format!("symptom {}", i), "analysis", Severity::Mild, None)
                .expect("record failed");
        }

        let records = store.list().expect("list failed");
        assert_eq!(records.len(), 10);
        let symptoms: Vec<String> = records.into_iter().map(|r| r.symptoms).collect();
        let expected: Vec<String> = (3..13).rev().map(|i| format!("symptom {}", i)).collect();
        assert_eq!(symptoms, expected);
    }

    #[test]
    fn test_cap_of_one() {
        let (store, _dir) = create_test_store(1);
        store.record("a", "x", Severity::Mild, None).unwrap();
        store.record("b", "y", Severity::Severe, None).unwrap();
        let records = store.list().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].symptoms, "b");
    }

    #[test]
    fn test_delete_and_clear() {
        let (store, _dir) = create_test_store(10);
        let first = store.record("a", "x", Severity::Mild, None).unwrap();
        store.record("b", "y", Severity::Mild, None).unwrap();

        assert_eq!(store.delete(&first.id).unwrap(), 1);
        assert_eq!(store.len().unwrap(), 1);
        assert!(store.get(&first.id).unwrap().is_none());

        assert_eq!(store.clear().unwrap(), 1);
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_delete_missing_is_zero() {
        let (store, _dir) = create_test_store(10);
        assert_eq!(store.delete("does-not-exist").unwrap(), 0);
    }

    fn insert_raw(store: &HistoryStore, id: &str, created_at: &str) {
        let conn = Connection::open(store.path()).expect("open connection");
        conn.execute(
            "INSERT INTO analyses (id, symptoms, analysis, created_at, severity, duration)
            VALUES (?, 'rash', 'analysis', ?, 'mild', NULL)",
            params![id, created_at],
        )
        .expect("insert row");
    }

    #[test]
    fn test_like_wildcards_match_nothing() {
        let (store, _dir) = create_test_store(10);
        for symptom in ["a", "b", "c"] {
            store.record(symptom, "x", Severity::Mild, None).unwrap();
        }

        for pattern in ["_", "%", "%%", "____", "\\"] {
            assert!(store.get(pattern).unwrap().is_none(), "get({:?})", pattern);
            assert_eq!(store.delete(pattern).unwrap(), 0, "delete({:?})", pattern);
        }
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn test_ambiguous_prefix_is_error() {
        let (store, _dir) = create_test_store(10);
        let now = Utc::now().to_rfc3339();
        insert_raw(&store, "abcd0000-0000-4000-8000-000000000001", &now);
        insert_raw(&store, "abcd1111-0000-4000-8000-000000000002", &now);

        let err = store.get("abcd").unwrap_err();
        assert!(err.to_string().contains("Ambiguous id prefix"));
        assert!(store.delete("abcd").is_err());
        assert_eq!(store.len().unwrap(), 2);

        let loaded = store.get("ABCD1").unwrap().expect("unique prefix");
        assert_eq!(loaded.id, "abcd1111-0000-4000-8000-000000000002");
        assert_eq!(store.delete("abcd0").unwrap(), 1);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_corrupt_row_fails_listing() {
        let (store, _dir) = create_test_store(10);
        store.record("headache", "x", Severity::Mild, None).unwrap();
        insert_raw(&store, "00000000-0000-4000-8000-000000000000", "yesterday");

        let err = store.list().unwrap_err();
        assert!(err.to_string().contains("Failed to read analyses"));
        assert!(store.get("00000000").is_err());
    }

    #[test]
    fn test_history_persists_across_instances() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("history.db");
        {
            let store = HistoryStore::new_with_path(&path, 10).unwrap();
            store.record("fatigue", "sleep", Severity::Mild, None).unwrap();
        }
        let store = HistoryStore::new_with_path(&path, 10).unwrap();
        assert_eq!(store.list().unwrap()[0].symptoms, "fatigue");
    }

    #[test]
    #[serial]
    fn test_env_override_path() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("override.db");
        std::env::set_var("HEALTHAI_HISTORY_DB", &path);
        let store = HistoryStore::new(10);
        std::env::remove_var("HEALTHAI_HISTORY_DB");

        let store = store.expect("store from env path");
        assert_eq!(store.path(), path.as_path());
        assert!(path.exists());
    }
}

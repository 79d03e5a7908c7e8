//! Job persistence: lets `job-status` read back a job's progress after the
//! process that ran `ingest` has exited, and lets a crashed orchestrator
//! resume from the last saved phase pointer (`spec.md` §4.7).
//!
//! Grounded on `store::sqlite::SqliteStore`'s connection-and-mutex style,
//! generalized from the chunk-index schema to a single `jobs` table keyed
//! by job id, storing the [`Job`] as a JSON blob rather than a normalised
//! row set — a job is always read and written whole, never queried by
//! field, so normalising its columns would add schema without adding
//! capability.

use crate::core::job::Job;
use crate::error::{Result, StorageError};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Mutex;

/// Persists and retrieves [`Job`] records by id.
pub trait JobStore: Send + Sync {
    /// Saves (creates or replaces) a job record.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError`] on a write failure.
    fn save(&self, job: &Job) -> Result<()>;

    /// Retrieves a job by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::error::StorageError::ChunkNotFound`]-shaped
    /// not-found classification via [`crate::error::Error::kind`] when no
    /// job with `id` exists.
    fn get(&self, id: &str) -> Result<Job>;
}

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS jobs (\n    id TEXT PRIMARY KEY,\n    payload TEXT NOT NULL\n);";

/// A `SQLite`-backed [`JobStore`].
pub struct SqliteJobStore {
    conn: Mutex<Connection>,
}

impl SqliteJobStore {
    /// Opens or creates a job store at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the database cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| StorageError::Database(e.to_string()))?;
            }
        }
        let conn = Connection::open(path).map_err(StorageError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(StorageError::from)?;
        Ok(Self { conn: Mutex::new(conn) })
    }

    /// Opens an in-memory job store, for tests and the CLI demo mode.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError`] if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(StorageError::from)?;
        conn.execute_batch(SCHEMA_SQL).map_err(StorageError::from)?;
        Ok(Self { conn: Mutex::new(conn) })
    }
}

impl JobStore for SqliteJobStore {
    fn save(&self, job: &Job) -> Result<()> {
        let payload = serde_json::to_string(job).map_err(StorageError::from)?;
        let conn = self.conn.lock().expect("job store mutex poisoned");
        conn.execute(
            "INSERT INTO jobs (id, payload) VALUES (?1, ?2)
             ON CONFLICT(id) DO UPDATE SET payload = excluded.payload",
            params![job.id, payload],
        )
        .map_err(StorageError::from)?;
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Job> {
        let conn = self.conn.lock().expect("job store mutex poisoned");
        let payload: Option<String> = conn
            .query_row("SELECT payload FROM jobs WHERE id = ?1", params![id], |row| row.get(0))
            .optional()
            .map_err(StorageError::from)?;
        let payload = payload.ok_or_else(|| StorageError::ChunkNotFound { id: id.to_string() })?;
        let job = serde_json::from_str(&payload).map_err(StorageError::from)?;
        Ok(job)
    }
}

/// An in-memory [`JobStore`], for tests and single-process CLI runs where a
/// database file is unnecessary.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<String, Job>>,
}

impl InMemoryJobStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl JobStore for InMemoryJobStore {
    fn save(&self, job: &Job) -> Result<()> {
        self.jobs
            .lock()
            .expect("job map poisoned")
            .insert(job.id.clone(), job.clone());
        Ok(())
    }

    fn get(&self, id: &str) -> Result<Job> {
        self.jobs
            .lock()
            .expect("job map poisoned")
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::ChunkNotFound { id: id.to_string() }.into())
    }
}

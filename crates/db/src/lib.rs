//! SQLite storage handle and migration runner for Folio.
//!
//! A [`Database`] wraps a single SQLite connection behind a mutex. Every call
//! runs on tokio's blocking pool so request handlers never block the runtime.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rusqlite::Connection;
use thiserror::Error;

pub mod migrations;

pub use migrations::{apply_migrations, Migration};

pub type DbResult<T> = Result<T, DbError>;

/// Errors raised by the storage layer.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("database schema version {db_version} is newer than supported {latest_supported}")]
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },

    #[error("database task failed: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error("database connection lock poisoned")]
    Poisoned,
}

/// Shared handle to the application database.
///
/// Cloning is cheap; all clones talk to the same connection.
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database").finish_non_exhaustive()
    }
}

impl Database {
    /// Open (or create) a database file.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> DbResult<Self> {
        let path = path.as_ref();
        let started_at = Instant::now();
        tracing::info!(target: "folio-db", path = %path.display(), "opening database");

        let conn = Connection::open(path).inspect_err(|err| {
            tracing::error!(
                target: "folio-db",
                path = %path.display(),
                error = %err,
                "failed to open database"
            );
        })?;
        let db = Self::bootstrap(conn, busy_timeout)?;

        tracing::info!(
            target: "folio-db",
            path = %path.display(),
            duration_ms = started_at.elapsed().as_millis() as u64,
            "database ready"
        );
        Ok(db)
    }

    /// Open a private in-memory database. Used by tests and ephemeral runs.
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::bootstrap(conn, Duration::from_secs(5))
    }

    fn bootstrap(conn: Connection, busy_timeout: Duration) -> DbResult<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.busy_timeout(busy_timeout)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run `f` against the connection on the blocking pool.
    ///
    /// The closure holds the connection lock for its whole duration, so a
    /// transaction opened inside it is never interleaved with other calls.
    pub async fn call<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Connection) -> Result<T, E> + Send + 'static,
        T: Send + 'static,
        E: From<DbError> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let mut guard = conn.lock().map_err(|_| E::from(DbError::Poisoned))?;
            f(&mut *guard)
        })
        .await
        .map_err(|err| E::from(DbError::Join(err)))?
    }

    /// Apply pending migrations and return how many were executed.
    pub async fn migrate(&self, migrations: Vec<(String, Migration)>) -> DbResult<usize> {
        self.call(move |conn| apply_migrations(conn, &migrations)).await
    }
}

//! SQLite-backed store.
//!
//! Every operation checks a connection out of a small idle pool and runs on
//! the blocking thread pool. Counter increments open `BEGIN IMMEDIATE`
//! transactions, so writers on the same database file (in this process or
//! another) queue on the write lock for up to `busy_timeout_ms` instead of
//! interleaving between read and write.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension, Row, Transaction, TransactionBehavior};

use greenhouse_core::clock::now_millis;
use greenhouse_core::error::{GreenhouseError, Result};
use greenhouse_core::{CounterName, NewReading, SensorReading};

use super::{CounterStore, ReadingStore};
use crate::config::StorageSection;

/// Bumped whenever the table layout changes.
const SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = "
CREATE TABLE IF NOT EXISTS counters (
    name  TEXT PRIMARY KEY NOT NULL,
    value INTEGER NOT NULL DEFAULT 0 CHECK (value >= 0)
);
CREATE TABLE IF NOT EXISTS readings (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    sensor_id      TEXT NOT NULL,
    temperature    REAL,
    humidity       REAL,
    soil_moisture  REAL,
    water_level    REAL,
    recorded_at_ms INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS readings_recency ON readings (recorded_at_ms DESC, id DESC);
";

const READING_COLUMNS: &str =
    "id, sensor_id, temperature, humidity, soil_moisture, water_level, recorded_at_ms";

#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<Inner>,
}

struct Inner {
    cfg: StorageSection,
    idle: Mutex<Vec<Connection>>,
}

impl SqliteStore {
    /// Open the database file, apply pragmas and create the schema if needed.
    pub fn open(cfg: &StorageSection) -> Result<Self> {
        ensure_parent_dir(&cfg.path)?;
        let mut conn = open_connection(cfg)?;
        initialize_schema(&mut conn)?;

        Ok(Self {
            inner: Arc::new(Inner {
                cfg: cfg.clone(),
                idle: Mutex::new(vec![conn]),
            }),
        })
    }

    /// Run `f` on a pooled connection off the async workers.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
    {
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let mut conn = inner.checkout()?;
            let out = f(&mut conn);
            inner.checkin(conn);
            out
        })
        .await
        .map_err(|e| GreenhouseError::Internal(format!("storage task failed: {e}")))?
    }
}

impl Inner {
    fn checkout(&self) -> Result<Connection> {
        let pooled = self.idle.lock().unwrap_or_else(|p| p.into_inner()).pop();
        match pooled {
            Some(conn) => Ok(conn),
            None => open_connection(&self.cfg),
        }
    }

    fn checkin(&self, conn: Connection) {
        let mut idle = self.idle.lock().unwrap_or_else(|p| p.into_inner());
        if idle.len() < self.cfg.pool_size {
            idle.push(conn);
        }
    }
}

/// Insert-if-absent, increment, read back. The caller owns the transaction;
/// nothing is visible until it commits.
fn increment_in_tx(tx: &Transaction<'_>, name: &str) -> Result<u64> {
    tx.execute(
        "INSERT INTO counters (name, value) VALUES (?1, 0) ON CONFLICT(name) DO NOTHING",
        params![name],
    )
    .map_err(statement_error)?;
    tx.execute("UPDATE counters SET value = value + 1 WHERE name = ?1", params![name])
        .map_err(statement_error)?;
    let value: i64 = tx
        .query_row("SELECT value FROM counters WHERE name = ?1", params![name], |row| row.get(0))
        .map_err(statement_error)?;
    stored_counter(name, value)
}

fn stored_counter(name: &str, value: i64) -> Result<u64> {
    u64::try_from(value)
        .map_err(|_| GreenhouseError::Internal(format!("counter {name} holds negative value {value}")))
}

#[async_trait]
impl CounterStore for SqliteStore {
    async fn increment_and_get(&self, name: &CounterName) -> Result<u64> {
        let name = name.clone();
        self.with_conn(move |conn| {
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(unavailable)?;
            let value = increment_in_tx(&tx, name.as_str())?;
            tx.commit().map_err(statement_error)?;
            tracing::debug!(counter = %name, value, "counter incremented");
            Ok(value)
        })
        .await
    }

    async fn current(&self, name: &CounterName) -> Result<Option<u64>> {
        let name = name.clone();
        self.with_conn(move |conn| {
            let value: Option<i64> = conn
                .query_row("SELECT value FROM counters WHERE name = ?1", params![name.as_str()], |row| {
                    row.get(0)
                })
                .optional()
                .map_err(statement_error)?;
            value.map(|v| stored_counter(name.as_str(), v)).transpose()
        })
        .await
    }
}

#[async_trait]
impl ReadingStore for SqliteStore {
    async fn insert(&self, reading: NewReading) -> Result<SensorReading> {
        reading.validate()?;
        let recorded_at_ms = reading.recorded_at_or(now_millis());
        // validate() bounds recorded_at_ms to the INTEGER range
        let recorded_at = i64::try_from(recorded_at_ms)
            .map_err(|_| GreenhouseError::Internal(format!("recorded_at_ms {recorded_at_ms} overflows")))?;

        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO readings (sensor_id, temperature, humidity, soil_moisture, water_level, recorded_at_ms)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    reading.sensor_id_or_default(),
                    reading.temperature,
                    reading.humidity,
                    reading.soil_moisture,
                    reading.water_level,
                    recorded_at,
                ],
            )
            .map_err(statement_error)?;
            let id = conn.last_insert_rowid() as u64;
            Ok(SensorReading::from_new(id, &reading, recorded_at_ms))
        })
        .await
    }

    async fn latest(&self) -> Result<Option<SensorReading>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!(
                    "SELECT {READING_COLUMNS} FROM readings ORDER BY recorded_at_ms DESC, id DESC LIMIT 1"
                ),
                params![],
                row_to_reading,
            )
            .optional()
            .map_err(statement_error)
        })
        .await
    }

    async fn history(&self, limit: usize) -> Result<Vec<SensorReading>> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(move |conn| {
            let mut stmt = conn
                .prepare_cached(&format!(
                    "SELECT {READING_COLUMNS} FROM readings ORDER BY recorded_at_ms DESC, id DESC LIMIT ?1"
                ))
                .map_err(statement_error)?;
            let rows = stmt
                .query_map(params![limit], row_to_reading)
                .map_err(statement_error)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(statement_error)
        })
        .await
    }
}

fn unsigned_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<u64> {
    let v: i64 = row.get(idx)?;
    u64::try_from(v).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(idx, v))
}

fn row_to_reading(row: &Row<'_>) -> rusqlite::Result<SensorReading> {
    Ok(SensorReading {
        id: unsigned_column(row, 0)?,
        sensor_id: row.get(1)?,
        temperature: row.get(2)?,
        humidity: row.get(3)?,
        soil_moisture: row.get(4)?,
        water_level: row.get(5)?,
        recorded_at_ms: unsigned_column(row, 6)?,
    })
}

// --------------------
// Error mapping
// --------------------

/// Connection or transaction could not be opened.
fn unavailable(err: rusqlite::Error) -> GreenhouseError {
    GreenhouseError::StorageUnavailable(err.to_string())
}

/// Failure while a statement or commit runs.
fn statement_error(err: rusqlite::Error) -> GreenhouseError {
    let code = match &err {
        rusqlite::Error::SqliteFailure(e, _) => Some(e.code),
        _ => None,
    };
    match code {
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
            GreenhouseError::TransactionConflict(err.to_string())
        }
        Some(
            ErrorCode::CannotOpen
            | ErrorCode::NotADatabase
            | ErrorCode::SystemIoFailure
            | ErrorCode::DiskFull
            | ErrorCode::PermissionDenied
            | ErrorCode::ReadOnly,
        ) => GreenhouseError::StorageUnavailable(err.to_string()),
        _ => GreenhouseError::Internal(err.to_string()),
    }
}

// --------------------
// Connection setup
// --------------------

fn ensure_parent_dir(path: &Path) -> Result<()> {
    match path.parent() {
        Some(parent) => std::fs::create_dir_all(parent)
            .map_err(|e| GreenhouseError::StorageUnavailable(format!("create {}: {e}", parent.display()))),
        None => Ok(()),
    }
}

fn open_connection(cfg: &StorageSection) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(&cfg.path, flags).map_err(unavailable)?;
    conn.busy_timeout(Duration::from_millis(cfg.busy_timeout_ms))
        .map_err(unavailable)?;
    conn.execute_batch("PRAGMA journal_mode = WAL;").map_err(unavailable)?;
    conn.execute_batch(&format!("PRAGMA synchronous = {};", cfg.synchronous.pragma_value()))
        .map_err(unavailable)?;
    Ok(conn)
}

/// Idempotent: safe on every start, refuses a database written by a newer layout.
fn initialize_schema(conn: &mut Connection) -> Result<()> {
    let tx = conn
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(unavailable)?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(statement_error)?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(statement_error)?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(statement_error)?;
        }
        Some(v) if v == SCHEMA_VERSION => {}
        Some(v) => {
            return Err(GreenhouseError::Internal(format!(
                "database schema version {v} is not supported (expected {SCHEMA_VERSION})"
            )));
        }
    }
    tx.execute_batch(SCHEMA_SQL).map_err(statement_error)?;
    tx.commit().map_err(statement_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg_in(dir: &tempfile::TempDir) -> StorageSection {
        StorageSection {
            path: dir.path().join("nested").join("greenhouse.db"),
            ..StorageSection::default()
        }
    }

    #[tokio::test]
    async fn rolled_back_increment_is_invisible() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(&dir);
        let store = SqliteStore::open(&cfg).unwrap();
        let name = CounterName::parse("global").unwrap();

        assert_eq!(store.increment_and_get(&name).await.unwrap(), 1);

        // fail after the update step, before commit
        {
            let mut conn = open_connection(&cfg).unwrap();
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate).unwrap();
            assert_eq!(increment_in_tx(&tx, "global").unwrap(), 2);
            assert_eq!(increment_in_tx(&tx, "fresh").unwrap(), 1);
            drop(tx);
        }

        assert_eq!(store.current(&name).await.unwrap(), Some(1));
        assert_eq!(store.increment_and_get(&name).await.unwrap(), 2);
        let fresh = CounterName::parse("fresh").unwrap();
        assert_eq!(store.current(&fresh).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reopening_keeps_counters() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(&dir);
        let name = CounterName::parse("restarts").unwrap();

        {
            let store = SqliteStore::open(&cfg).unwrap();
            for expected in 1..=3 {
                assert_eq!(store.increment_and_get(&name).await.unwrap(), expected);
            }
        }

        let store = SqliteStore::open(&cfg).unwrap();
        assert_eq!(store.increment_and_get(&name).await.unwrap(), 4);
    }

    #[test]
    fn newer_schema_version_is_refused() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(&dir);
        drop(SqliteStore::open(&cfg).unwrap());

        let conn = open_connection(&cfg).unwrap();
        conn.execute("UPDATE store_meta SET version = ?1", params![SCHEMA_VERSION + 1]).unwrap();
        drop(conn);

        let err = SqliteStore::open(&cfg).err().expect("must refuse");
        assert_eq!(err.client_code().as_str(), "INTERNAL");
    }

    #[test]
    fn unopenable_path_is_storage_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StorageSection { path: dir.path().to_path_buf(), ..StorageSection::default() };
        let err = SqliteStore::open(&cfg).err().expect("directory is not a database");
        assert_eq!(err.client_code().as_str(), "STORAGE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn busy_write_lock_fails_without_incrementing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = StorageSection { busy_timeout_ms: 100, ..cfg_in(&dir) };
        let store = SqliteStore::open(&cfg).unwrap();
        let name = CounterName::parse("global").unwrap();
        assert_eq!(store.increment_and_get(&name).await.unwrap(), 1);

        let mut blocker = open_connection(&cfg).unwrap();
        let held = blocker.transaction_with_behavior(TransactionBehavior::Immediate).unwrap();

        let err = store.increment_and_get(&name).await.expect_err("write lock is held");
        assert_eq!(err.client_code().as_str(), "STORAGE_UNAVAILABLE");
        assert!(err.client_code().is_retryable());

        drop(held);
        drop(blocker);

        assert_eq!(store.current(&name).await.unwrap(), Some(1));
        assert_eq!(store.increment_and_get(&name).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn negative_stored_values_are_internal_errors() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = cfg_in(&dir);
        let store = SqliteStore::open(&cfg).unwrap();

        let conn = open_connection(&cfg).unwrap();
        conn.execute_batch(
            "PRAGMA ignore_check_constraints = ON;
             INSERT INTO counters (name, value) VALUES ('broken', -1);
             INSERT INTO readings (sensor_id, temperature, recorded_at_ms) VALUES ('s1', 20.0, -5);",
        )
        .unwrap();
        drop(conn);

        let broken = CounterName::parse("broken").unwrap();
        let err = store.current(&broken).await.expect_err("negative counter");
        assert_eq!(err.client_code().as_str(), "INTERNAL");

        let err = store.latest().await.expect_err("negative timestamp");
        assert_eq!(err.client_code().as_str(), "INTERNAL");
        let err = store.history(10).await.expect_err("negative timestamp");
        assert_eq!(err.client_code().as_str(), "INTERNAL");
    }
}

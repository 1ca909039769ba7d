// crates/booking-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Record Store
// Description: Durable RecordStore backed by SQLite.
// Purpose: Persist records and apply status transitions as atomic updates.
// Dependencies: booking-core, rusqlite, serde, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`RecordStore`] using `SQLite`. Records
//! live in a single `records` table keyed by identifier. A status update is
//! one `UPDATE` statement, optionally restricted to the guard statuses, run
//! inside an immediate transaction. Rows read back from disk are untrusted:
//! unknown role or status literals fail closed as corruption.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use booking_core::Record;
use booking_core::RecordId;
use booking_core::RecordStore;
use booking_core::Role;
use booking_core::Status;
use booking_core::StatusUpdate;
use booking_core::StoreError;
use booking_core::unix_millis;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::TransactionBehavior;
use rusqlite::params;
use rusqlite::params_from_iter;
use rusqlite::types::Value;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 1;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum record identifier length accepted on registration.
pub const MAX_RECORD_ID_LENGTH: usize = 256;
/// Column list shared by every record query.
const RECORD_COLUMNS: &str = "id, role, status, category, inn";

// ============================================================================
// SECTION: Config
// ============================================================================

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` record store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Builds a config for `path` with default tuning.
    #[must_use]
    pub fn for_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored row could not be decoded.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store input.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// No record exists for the identifier.
    #[error("record not found: {0}")]
    NotFound(String),
    /// A record already exists for the identifier.
    #[error("record already exists: {0}")]
    AlreadyExists(String),
    /// Guarded update rejected by the current status.
    #[error("record {id} has status {current}, transition to {target} not permitted")]
    Conflict {
        /// Record identifier.
        id: String,
        /// Current status.
        current: Status,
        /// Requested status.
        target: Status,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Invalid(format!("corrupt row: {message}")),
            SqliteStoreError::VersionMismatch(message) => {
                Self::Store(format!("schema version mismatch: {message}"))
            }
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::NotFound(id) => Self::NotFound(id),
            SqliteStoreError::AlreadyExists(id) => Self::AlreadyExists(id),
            SqliteStoreError::Conflict {
                id,
                current,
                target,
            } => Self::Conflict {
                id,
                current,
                target,
            },
        }
    }
}

/// Maps a rusqlite error into a store error.
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================
// SECTION: Store
// ============================================================================

/// `SQLite`-backed record store.
#[derive(Clone)]
pub struct SqliteRecordStore {
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteRecordStore {
    /// Opens an `SQLite`-backed record store, creating the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: &SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Inserts a new record.
    fn register_record(&self, record: &Record) -> Result<(), SqliteStoreError> {
        if record.id.is_blank() {
            return Err(SqliteStoreError::Invalid("record id must be non-empty".to_string()));
        }
        if record.id.as_str().len() > MAX_RECORD_ID_LENGTH {
            return Err(SqliteStoreError::Invalid(format!(
                "record id exceeds {MAX_RECORD_ID_LENGTH} bytes"
            )));
        }
        if record.status != Status::Pending {
            return Err(SqliteStoreError::Invalid(format!(
                "registered record {} must be PENDING",
                record.id
            )));
        }
        let now = unix_millis();
        let inserted = {
            let guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            guard
                .execute(
                    "INSERT INTO records (id, role, status, category, inn, created_at, \
                     updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6) ON CONFLICT(id) DO NOTHING",
                    params![
                        record.id.as_str(),
                        record.role.as_str(),
                        record.status.as_str(),
                        record.category,
                        record.inn,
                        now
                    ],
                )
                .map_err(|err| db_error(&err))?
        };
        if inserted == 0 {
            return Err(SqliteStoreError::AlreadyExists(record.id.to_string()));
        }
        Ok(())
    }

    /// Loads a record by identifier.
    fn load_record(&self, id: &RecordId) -> Result<Option<Record>, SqliteStoreError> {
        let raw = {
            let guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            guard
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
                    params![id.as_str()],
                    RawRecord::from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))?
        };
        raw.map(RawRecord::decode).transpose()
    }

    /// Lists every record ordered by identifier.
    fn list_records(&self) -> Result<Vec<Record>, SqliteStoreError> {
        let rows = {
            let guard = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let mut stmt = guard
                .prepare(&format!("SELECT {RECORD_COLUMNS} FROM records ORDER BY id"))
                .map_err(|err| db_error(&err))?;
            let rows = stmt
                .query_map(params![], RawRecord::from_row)
                .map_err(|err| db_error(&err))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| db_error(&err))?;
            rows
        };
        rows.into_iter().map(RawRecord::decode).collect()
    }

    /// Applies a status update in a single immediate transaction.
    fn update_record_status(&self, update: &StatusUpdate) -> Result<Record, SqliteStoreError> {
        let id = update.id().as_str();
        let mut sql = "UPDATE records SET status = ?1, updated_at = ?2 WHERE id = ?3".to_string();
        let mut values = vec![
            Value::Text(update.status().as_str().to_string()),
            Value::Integer(unix_millis()),
            Value::Text(id.to_string()),
        ];
        if let Some(guard) = update.guard() {
            let placeholders: Vec<String> =
                (0..guard.len()).map(|offset| format!("?{}", offset + 4)).collect();
            sql.push_str(&format!(" AND status IN ({})", placeholders.join(", ")));
            values.extend(guard.iter().map(|status| Value::Text(status.as_str().to_string())));
        }

        let record = {
            let mut conn = self
                .connection
                .lock()
                .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
            let tx = conn
                .transaction_with_behavior(TransactionBehavior::Immediate)
                .map_err(|err| db_error(&err))?;
            let changed =
                tx.execute(&sql, params_from_iter(values.iter())).map_err(|err| db_error(&err))?;
            if changed == 0 {
                let current: Option<String> = tx
                    .query_row("SELECT status FROM records WHERE id = ?1", params![id], |row| {
                        row.get(0)
                    })
                    .optional()
                    .map_err(|err| db_error(&err))?;
                return Err(match current {
                    None => SqliteStoreError::NotFound(id.to_string()),
                    Some(current) => SqliteStoreError::Conflict {
                        id: id.to_string(),
                        current: parse_status(&current)?,
                        target: update.status(),
                    },
                });
            }
            // Decode before commit so a corrupt row leaves the status untouched.
            let record = tx
                .query_row(
                    &format!("SELECT {RECORD_COLUMNS} FROM records WHERE id = ?1"),
                    params![id],
                    RawRecord::from_row,
                )
                .map_err(|err| db_error(&err))?
                .decode()?;
            tx.commit().map_err(|err| db_error(&err))?;
            drop(conn);
            record
        };
        Ok(record)
    }
}

impl RecordStore for SqliteRecordStore {
    fn register(&self, record: &Record) -> Result<(), StoreError> {
        self.register_record(record).map_err(StoreError::from)
    }

    fn load(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        self.load_record(id).map_err(StoreError::from)
    }

    fn list(&self) -> Result<Vec<Record>, StoreError> {
        self.list_records().map_err(StoreError::from)
    }

    fn update_status(&self, update: &StatusUpdate) -> Result<Record, StoreError> {
        self.update_record_status(update).map_err(StoreError::from)
    }
}

// ============================================================================
// SECTION: Row Decoding
// ============================================================================

/// Undecoded record row.
struct RawRecord {
    /// Identifier column.
    id: String,
    /// Role literal.
    role: String,
    /// Status literal.
    status: String,
    /// Optional category.
    category: Option<String>,
    /// Optional taxpayer number.
    inn: Option<String>,
}

impl RawRecord {
    /// Reads the shared column list from a row.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            role: row.get(1)?,
            status: row.get(2)?,
            category: row.get(3)?,
            inn: row.get(4)?,
        })
    }

    /// Decodes role and status literals, failing closed on unknown values.
    fn decode(self) -> Result<Record, SqliteStoreError> {
        let role: Role = self
            .role
            .parse()
            .map_err(|err| SqliteStoreError::Corrupt(format!("record {}: {err}", self.id)))?;
        let status = parse_status(&self.status)
            .map_err(|err| SqliteStoreError::Corrupt(format!("record {}: {err}", self.id)))?;
        Ok(Record {
            id: RecordId::new(self.id),
            role,
            status,
            category: self.category,
            inn: self.inn,
        })
    }
}

/// Parses a stored status literal.
fn parse_status(value: &str) -> Result<Status, SqliteStoreError> {
    value.parse().map_err(|err: booking_core::ParseEnumError| {
        SqliteStoreError::Corrupt(err.to_string())
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.is_empty() {
        return Err(SqliteStoreError::Invalid("store path must be non-empty".to_string()));
    }
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection =
        Connection::open_with_flags(&config.path, flags).map_err(|err| db_error(&err))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| db_error(&err))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| db_error(&err))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| db_error(&err))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| db_error(&err))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| db_error(&err))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| db_error(&err))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS records (
                    id TEXT PRIMARY KEY,
                    role TEXT NOT NULL,
                    status TEXT NOT NULL,
                    category TEXT,
                    inn TEXT,
                    created_at INTEGER NOT NULL,
                    updated_at INTEGER NOT NULL
                );
                CREATE INDEX IF NOT EXISTS idx_records_status ON records (status);",
            )
            .map_err(|err| db_error(&err))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| db_error(&err))?;
    Ok(())
}

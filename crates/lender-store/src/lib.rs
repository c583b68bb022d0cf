//! SQLite-backed applicant record store.
//!
//! The applicant table is owned by the loan origination system; this crate
//! only reads it. Rows are returned as JSON objects so that every stored
//! column reaches the client unchanged.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use lender_core::{ApplicantRecord, LookupError, RecordStore};
use rusqlite::types::ValueRef;
use rusqlite::{params, Connection, Row};
use serde_json::{Number, Value};
use thiserror::Error;
use tracing::{debug, info};

/// Errors from applicant store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Failed to prepare database file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Lock error")]
    Lock,
    #[error("Invalid SQL identifier: {0:?}")]
    InvalidIdentifier(String),
}

/// Returns true for plain SQL identifiers (`[A-Za-z_][A-Za-z0-9_]*`).
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Point lookups against the applicant table.
pub struct ApplicantStore {
    conn: Mutex<Connection>,
    query: String,
}

impl ApplicantStore {
    /// Opens the database file at `path`, creating parent directories if needed.
    pub fn open(path: impl AsRef<Path>, table: &str, id_column: &str) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        info!("Applicant store opened at {}", path.display());
        Self::from_connection(conn, table, id_column)
    }

    /// Creates an in-memory store (for testing).
    pub fn in_memory(table: &str, id_column: &str) -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?, table, id_column)
    }

    pub fn from_connection(
        conn: Connection,
        table: &str,
        id_column: &str,
    ) -> Result<Self, StoreError> {
        for name in [table, id_column] {
            if !is_identifier(name) {
                return Err(StoreError::InvalidIdentifier(name.to_string()));
            }
        }
        let query = format!(r#"SELECT * FROM "{table}" WHERE "{id_column}" = ?1 LIMIT 1"#);
        Ok(Self {
            conn: Mutex::new(conn),
            query,
        })
    }

    /// Runs a batch of SQL statements, e.g. a development seed file.
    pub fn execute_batch(&self, sql: &str) -> Result<(), StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;
        conn.execute_batch(sql)?;
        Ok(())
    }

    /// Runs the SQL file at `path` against the store.
    pub fn seed_from_file(&self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        let path = path.as_ref();
        let sql = fs::read_to_string(path)?;
        self.execute_batch(&sql)?;
        info!("Seeded applicant store from {}", path.display());
        Ok(())
    }

    /// Fetches the row for `app_id`, or `None` when no row matches.
    pub fn fetch(&self, app_id: i64) -> Result<Option<ApplicantRecord>, StoreError> {
        let conn = self.conn.lock().map_err(|_| StoreError::Lock)?;

        let mut stmt = conn.prepare_cached(&self.query)?;
        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();

        let result = stmt.query_row(params![app_id], |row| row_to_record(row, &columns));

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl RecordStore for ApplicantStore {
    fn get_application(&self, app_id: i64) -> Result<ApplicantRecord, LookupError> {
        match self.fetch(app_id) {
            Ok(Some(record)) => {
                debug!(app_id, columns = record.len(), "Applicant found");
                Ok(record)
            }
            Ok(None) => Err(LookupError::NotFound(app_id)),
            Err(e) => Err(LookupError::Store(e.to_string())),
        }
    }
}

fn row_to_record(row: &Row<'_>, columns: &[String]) -> rusqlite::Result<ApplicantRecord> {
    let mut record = ApplicantRecord::new();
    for (i, name) in columns.iter().enumerate() {
        record.insert(name.clone(), column_value(row.get_ref(i)?));
    }
    Ok(record)
}

fn column_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(i) => Value::from(i),
        ValueRef::Real(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::String(bytes.iter().map(|b| format!("{b:02x}")).collect()),
    }
}

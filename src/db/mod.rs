//! Database module for wardboard.
//!
//! This module defines the record-storage contract every service talks to, and
//! the two stores that implement it: an in-memory store holding a plain vector
//! per record kind, and a SQLite store that keeps each record's JSON body in a
//! table per kind. The contract mirrors the hosted record service the dashboard
//! was designed against: list queries with filter and sort parameters, and batch
//! create/update/delete calls that report success or failure per record.

mod memory;
mod query;
pub mod seed;
mod sqlite;

pub use memory::MemoryStore;
pub use query::{Direction, Filter, Query, Sort};
pub use sqlite::{register_functions, SqliteStore};

use crate::config::{AppConfig, Backend};
use crate::models::{Admission, Appointment, Department, Patient, QueueEntry, Record, StaffMember};
use anyhow::{Context, Result};
use rusqlite::Connection;
use std::rc::Rc;
use thiserror::Error;
use time::Date;

/// Failure of a whole store call: nothing in the request was applied.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("Invalid query field: {0}")]
    InvalidField(String),

    #[error("Record store unavailable: {0}")]
    Unavailable(String),
}

/// Failure of a single record inside an otherwise successful batch call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordFailure {
    #[error("record {id} not found")]
    NotFound { id: u64 },

    #[error("record rejected: {reason}")]
    Rejected { reason: String },
}

/// Per-record results of a batch call, in request order.
pub type BatchOutcome<T> = Vec<Result<T, RecordFailure>>;

/// The record-storage backend.
///
/// Batch calls only fail as a whole when the store itself is unreachable;
/// otherwise each record gets its own outcome and callers decide what to do
/// with the failed ones.
pub trait RecordStore<R: Record> {
    /// Records matching every filter, in the query's sort order (id order when
    /// no sort is given).
    fn query(&self, query: &Query) -> Result<Vec<R>, StoreError>;

    fn get(&self, id: u64) -> Result<Option<R>, StoreError>;

    /// Stores new records. Incoming ids are ignored; the store assigns them.
    fn create_batch(&mut self, records: Vec<R>) -> Result<BatchOutcome<R>, StoreError>;

    /// Replaces stored records by id.
    fn update_batch(&mut self, records: Vec<R>) -> Result<BatchOutcome<R>, StoreError>;

    fn delete_batch(&mut self, ids: &[u64]) -> Result<BatchOutcome<u64>, StoreError>;
}

/// One store per record kind.
pub struct Stores {
    pub patients: Box<dyn RecordStore<Patient>>,
    pub appointments: Box<dyn RecordStore<Appointment>>,
    pub staff: Box<dyn RecordStore<StaffMember>>,
    pub departments: Box<dyn RecordStore<Department>>,
    pub admissions: Box<dyn RecordStore<Admission>>,
    pub queue: Box<dyn RecordStore<QueueEntry>>,
}

impl Stores {
    /// Empty in-memory stores.
    pub fn memory() -> Self {
        Self {
            patients: Box::new(MemoryStore::<Patient>::new()),
            appointments: Box::new(MemoryStore::<Appointment>::new()),
            staff: Box::new(MemoryStore::<StaffMember>::new()),
            departments: Box::new(MemoryStore::<Department>::new()),
            admissions: Box::new(MemoryStore::<Admission>::new()),
            queue: Box::new(MemoryStore::<QueueEntry>::new()),
        }
    }

    /// SQLite stores sharing one connection. The schema is created if missing.
    pub fn sqlite(conn: Connection) -> Result<Self, StoreError> {
        init_schema(&conn)?;
        let conn = Rc::new(conn);
        Ok(Self {
            patients: Box::new(SqliteStore::<Patient>::new(Rc::clone(&conn))),
            appointments: Box::new(SqliteStore::<Appointment>::new(Rc::clone(&conn))),
            staff: Box::new(SqliteStore::<StaffMember>::new(Rc::clone(&conn))),
            departments: Box::new(SqliteStore::<Department>::new(Rc::clone(&conn))),
            admissions: Box::new(SqliteStore::<Admission>::new(Rc::clone(&conn))),
            queue: Box::new(SqliteStore::<QueueEntry>::new(conn)),
        })
    }

    /// Opens the backend selected by the configuration and, when enabled, loads
    /// the demo dataset if every store is still empty.
    pub fn open(config: &AppConfig, today: Date) -> Result<Self> {
        let mut stores = match config.backend {
            Backend::Memory => Self::memory(),
            Backend::Sqlite => {
                let conn = Connection::open(&config.database_path).with_context(|| {
                    format!("Failed to open database {}", config.database_path.display())
                })?;
                Self::sqlite(conn).context("Failed to initialise database schema")?
            }
        };
        tracing::info!(backend = ?config.backend, "Record stores ready");

        if config.seed_demo_data {
            seed::seed_demo_data(&mut stores, today)?;
        }
        Ok(stores)
    }
}

/// Creates every record table if it does not exist yet, and registers the SQL
/// functions the stores' queries call.
pub fn init_schema(conn: &Connection) -> Result<(), StoreError> {
    register_functions(conn)?;
    let schema = include_str!("schema.sql");
    conn.execute_batch(schema)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// A store whose every call fails, for exercising degrade-to-empty paths.
    pub struct UnavailableStore;

    fn down() -> StoreError {
        StoreError::Unavailable("connection refused".into())
    }

    impl<R: Record> RecordStore<R> for UnavailableStore {
        fn query(&self, _query: &Query) -> Result<Vec<R>, StoreError> {
            Err(down())
        }

        fn get(&self, _id: u64) -> Result<Option<R>, StoreError> {
            Err(down())
        }

        fn create_batch(&mut self, _records: Vec<R>) -> Result<BatchOutcome<R>, StoreError> {
            Err(down())
        }

        fn update_batch(&mut self, _records: Vec<R>) -> Result<BatchOutcome<R>, StoreError> {
            Err(down())
        }

        fn delete_batch(&mut self, _ids: &[u64]) -> Result<BatchOutcome<u64>, StoreError> {
            Err(down())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_creates_a_table_per_record_kind() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        for kind in [
            Patient::KIND,
            Appointment::KIND,
            StaffMember::KIND,
            Department::KIND,
            Admission::KIND,
            QueueEntry::KIND,
        ] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [kind],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {kind}");
        }
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        assert!(init_schema(&conn).is_ok());
    }
}

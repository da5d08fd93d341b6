//! Generic repository contract and entity mapping.
//!
//! # Responsibility
//! - Declare the CRUD surface every repository exposes.
//! - Describe how an entity maps onto one SQLite table.
//! - Define the error type shared by all repositories.

use crate::db::DbError;
use crate::model::employee::EmployeeValidationError;
use rusqlite::types::{FromSql, ToSql, Value};
use rusqlite::Row;
use std::fmt::{Debug, Display};
use thiserror::Error;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for persistence and query operations.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error(transparent)]
    Validation(#[from] EmployeeValidationError),
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("{table} row not found: {id}")]
    NotFound { table: &'static str, id: String },
    #[error("invalid persisted data: {0}")]
    InvalidData(String),
    #[error("query on `{table}.{column}` expected at most one row but matched several")]
    NonUniqueResult {
        table: &'static str,
        column: String,
    },
    #[error("unknown column `{column}` for table `{table}`")]
    UnknownColumn {
        table: &'static str,
        column: String,
    },
    #[error(
        "connection schema version {actual_version} is older than required {expected_version}; open it through db::open_db"
    )]
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    #[error("required table `{0}` is missing")]
    MissingRequiredTable(&'static str),
    #[error("required column `{table}.{column}` is missing")]
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Table mapping for a persistable record.
///
/// Implementors describe their columns once; the generic SQLite repository
/// derives every statement from this description.
pub trait Entity: Sized + Clone {
    /// Identity type stored in `ID_COLUMN`.
    type Id: Copy + Ord + Debug + Display + ToSql + FromSql;

    const TABLE: &'static str;
    const ID_COLUMN: &'static str;
    /// Non-identity columns, in the order `column_values` yields them.
    const COLUMNS: &'static [&'static str];

    fn id(&self) -> Option<Self::Id>;

    /// Returns a copy carrying the storage-assigned identity.
    fn with_id(self, id: Self::Id) -> Self;

    fn column_values(&self) -> Vec<Value>;

    /// Decodes one row selected as `ID_COLUMN` followed by `COLUMNS`.
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;

    fn validate(&self) -> RepoResult<()> {
        Ok(())
    }
}

/// CRUD contract parameterized over entity `E` and identity `ID`.
pub trait CrudRepository<E, ID> {
    /// Inserts when `E` has no identity, upserts by identity otherwise.
    ///
    /// Returns the persisted copy with its identity populated.
    fn save(&self, entity: &E) -> RepoResult<E>;

    /// Saves every entity atomically; on error nothing is persisted.
    fn save_all(&self, entities: &[E]) -> RepoResult<Vec<E>>;

    fn find_by_id(&self, id: ID) -> RepoResult<Option<E>>;

    fn exists_by_id(&self, id: ID) -> RepoResult<bool>;

    /// Returns every row ordered by identity.
    fn find_all(&self) -> RepoResult<Vec<E>>;

    /// Returns the rows whose identity is in `ids`; unknown ids are skipped.
    fn find_all_by_id(&self, ids: &[ID]) -> RepoResult<Vec<E>>;

    fn count(&self) -> RepoResult<u64>;

    /// Removes the row with `id`. Missing rows are a no-op.
    fn delete_by_id(&self, id: ID) -> RepoResult<()>;

    /// Removes the row backing `entity`. Unsaved entities are a no-op.
    fn delete(&self, entity: &E) -> RepoResult<()>;

    fn delete_all(&self) -> RepoResult<()>;
}

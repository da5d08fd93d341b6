//! SQLite implementation of the generic CRUD contract.
//!
//! # Responsibility
//! - Derive every CRUD statement from an [`Entity`] table mapping.
//! - Provide column-keyed lookups that entity repositories build
//!   derived queries on.
//!
//! # Invariants
//! - Only column names declared by the mapping are interpolated into SQL;
//!   every value is bound as a parameter.
//! - The repository borrows a connection and never opens or commits an
//!   outer transaction, so it composes with a caller-owned
//!   `rusqlite::Transaction`.

use crate::db::migrations::{current_version, latest_version};
use crate::repo::crud::{CrudRepository, Entity, RepoError, RepoResult};
use log::{debug, error, warn};
use rusqlite::types::ToSql;
use rusqlite::{params, params_from_iter, Connection, Params};
use std::collections::{BTreeSet, HashSet};
use std::marker::PhantomData;

const SAVE_ALL_SAVEPOINT: &str = "repo_save_all";
/// Ids bound per `IN (...)` statement; stays below SQLite's variable limit.
const FIND_BY_IDS_CHUNK_SIZE: usize = 500;

/// Generic SQLite-backed repository for one mapped entity.
pub struct SqliteRepository<'conn, E> {
    conn: &'conn Connection,
    _entity: PhantomData<fn() -> E>,
}

impl<'conn, E: Entity> SqliteRepository<'conn, E> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema
    ///   does not match the entity mapping.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready::<E>(conn)?;
        Ok(Self {
            conn,
            _entity: PhantomData,
        })
    }

    /// Returns every row whose `column` equals `value`, ordered by identity.
    pub fn find_all_by(&self, column: &str, value: impl ToSql) -> RepoResult<Vec<E>> {
        let column = checked_column::<E>(column)?;
        let sql = format!(
            "{} WHERE {column} = ?1 ORDER BY {} ASC;",
            select_sql::<E>(),
            E::ID_COLUMN
        );
        self.query_rows(&sql, params![value])
    }

    /// Returns the single row whose `column` equals `value`.
    ///
    /// # Errors
    /// - `NonUniqueResult` when more than one row matches.
    pub fn find_one_by(&self, column: &str, value: impl ToSql) -> RepoResult<Option<E>> {
        let column = checked_column::<E>(column)?;
        let sql = format!(
            "{} WHERE {column} = ?1 ORDER BY {} ASC LIMIT 2;",
            select_sql::<E>(),
            E::ID_COLUMN
        );
        let mut rows = self.query_rows(&sql, params![value])?;
        if rows.len() > 1 {
            warn!(
                "event=repo_find_one module=repo status=error table={} column={column} error_code=non_unique",
                E::TABLE
            );
            return Err(RepoError::NonUniqueResult {
                table: E::TABLE,
                column: column.to_string(),
            });
        }
        Ok(rows.pop())
    }

    fn query_rows<P: Params>(&self, sql: &str, params: P) -> RepoResult<Vec<E>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut rows = stmt.query(params)?;
        let mut entities = Vec::new();

        while let Some(row) = rows.next()? {
            entities.push(E::from_row(row)?);
        }

        Ok(entities)
    }
}

impl<E: Entity> CrudRepository<E, E::Id> for SqliteRepository<'_, E> {
    fn save(&self, entity: &E) -> RepoResult<E> {
        entity.validate()?;

        let values = entity.column_values();
        let id: E::Id = match entity.id() {
            None => self
                .conn
                .query_row(&insert_sql::<E>(), params_from_iter(values.iter()), |row| {
                    row.get(0)
                })?,
            Some(id) => {
                let mut bind: Vec<&dyn ToSql> = Vec::with_capacity(values.len() + 1);
                bind.push(&id);
                bind.extend(values.iter().map(|value| value as &dyn ToSql));
                self.conn
                    .query_row(&upsert_sql::<E>(), bind.as_slice(), |row| row.get(0))?
            }
        };

        debug!(
            "event=repo_save module=repo status=ok table={} id={id} inserted={}",
            E::TABLE,
            entity.id().is_none()
        );
        Ok(entity.clone().with_id(id))
    }

    fn save_all(&self, entities: &[E]) -> RepoResult<Vec<E>> {
        self.conn
            .execute_batch(&format!("SAVEPOINT {SAVE_ALL_SAVEPOINT};"))?;

        let saved = entities
            .iter()
            .map(|entity| self.save(entity))
            .collect::<RepoResult<Vec<_>>>();

        match saved {
            Ok(saved) => {
                self.conn
                    .execute_batch(&format!("RELEASE {SAVE_ALL_SAVEPOINT};"))?;
                Ok(saved)
            }
            Err(err) => {
                warn!(
                    "event=repo_save_all module=repo status=rollback table={} error={err}",
                    E::TABLE
                );
                // ROLLBACK TO leaves the savepoint on the stack.
                if let Err(rollback_err) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO {SAVE_ALL_SAVEPOINT}; RELEASE {SAVE_ALL_SAVEPOINT};"
                )) {
                    error!(
                        "event=repo_save_all module=repo status=error table={} error_code=rollback_failed error={rollback_err}",
                        E::TABLE
                    );
                }
                Err(err)
            }
        }
    }

    fn find_by_id(&self, id: E::Id) -> RepoResult<Option<E>> {
        let sql = format!("{} WHERE {} = ?1;", select_sql::<E>(), E::ID_COLUMN);
        let mut rows = self.query_rows(&sql, params![id])?;
        Ok(rows.pop())
    }

    fn exists_by_id(&self, id: E::Id) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            &format!(
                "SELECT EXISTS(SELECT 1 FROM {} WHERE {} = ?1);",
                E::TABLE,
                E::ID_COLUMN
            ),
            params![id],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }

    fn find_all(&self) -> RepoResult<Vec<E>> {
        let sql = format!("{} ORDER BY {} ASC;", select_sql::<E>(), E::ID_COLUMN);
        self.query_rows(&sql, [])
    }

    fn find_all_by_id(&self, ids: &[E::Id]) -> RepoResult<Vec<E>> {
        // Sorted and distinct, so per-chunk results concatenate in id order.
        let ids: Vec<E::Id> = ids
            .iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let mut entities = Vec::with_capacity(ids.len());

        for chunk in ids.chunks(FIND_BY_IDS_CHUNK_SIZE) {
            let placeholders = (1..=chunk.len())
                .map(|index| format!("?{index}"))
                .collect::<Vec<_>>()
                .join(", ");
            let sql = format!(
                "{} WHERE {id} IN ({placeholders}) ORDER BY {id} ASC;",
                select_sql::<E>(),
                id = E::ID_COLUMN
            );
            entities.extend(self.query_rows(&sql, params_from_iter(chunk.iter()))?);
        }

        Ok(entities)
    }

    fn count(&self) -> RepoResult<u64> {
        let count: i64 = self.conn.query_row(
            &format!("SELECT COUNT(*) FROM {};", E::TABLE),
            [],
            |row| row.get(0),
        )?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative row count `{count}`")))
    }

    fn delete_by_id(&self, id: E::Id) -> RepoResult<()> {
        let changed = self.conn.execute(
            &format!("DELETE FROM {} WHERE {} = ?1;", E::TABLE, E::ID_COLUMN),
            params![id],
        )?;
        debug!(
            "event=repo_delete module=repo status=ok table={} id={id} changed={changed}",
            E::TABLE
        );
        Ok(())
    }

    fn delete(&self, entity: &E) -> RepoResult<()> {
        match entity.id() {
            Some(id) => self.delete_by_id(id),
            None => Ok(()),
        }
    }

    fn delete_all(&self) -> RepoResult<()> {
        let changed = self
            .conn
            .execute(&format!("DELETE FROM {};", E::TABLE), [])?;
        debug!(
            "event=repo_delete_all module=repo status=ok table={} changed={changed}",
            E::TABLE
        );
        Ok(())
    }
}

fn select_sql<E: Entity>() -> String {
    format!(
        "SELECT {}, {} FROM {}",
        E::ID_COLUMN,
        E::COLUMNS.join(", "),
        E::TABLE
    )
}

fn insert_sql<E: Entity>() -> String {
    let placeholders = (1..=E::COLUMNS.len())
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING {};",
        E::TABLE,
        E::COLUMNS.join(", "),
        E::ID_COLUMN
    )
}

fn upsert_sql<E: Entity>() -> String {
    let placeholders = (1..=E::COLUMNS.len() + 1)
        .map(|index| format!("?{index}"))
        .collect::<Vec<_>>()
        .join(", ");
    let assignments = E::COLUMNS
        .iter()
        .map(|column| format!("{column} = excluded.{column}"))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "INSERT INTO {table} ({id}, {columns}) VALUES ({placeholders})
         ON CONFLICT({id}) DO UPDATE SET {assignments}
         RETURNING {id};",
        table = E::TABLE,
        id = E::ID_COLUMN,
        columns = E::COLUMNS.join(", "),
    )
}

fn checked_column<E: Entity>(column: &str) -> RepoResult<&'static str> {
    std::iter::once(E::ID_COLUMN)
        .chain(E::COLUMNS.iter().copied())
        .find(|known| *known == column)
        .ok_or_else(|| RepoError::UnknownColumn {
            table: E::TABLE,
            column: column.to_string(),
        })
}

fn ensure_connection_ready<E: Entity>(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [E::TABLE],
        |row| row.get(0),
    )?;
    if table_exists == 0 {
        return Err(RepoError::MissingRequiredTable(E::TABLE));
    }

    let mut stmt = conn.prepare("SELECT name FROM pragma_table_info(?1);")?;
    let present = stmt
        .query_map([E::TABLE], |row| row.get::<_, String>(0))?
        .collect::<Result<HashSet<_>, _>>()?;

    for column in std::iter::once(E::ID_COLUMN).chain(E::COLUMNS.iter().copied()) {
        if !present.contains(column) {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
    }

    Ok(())
}

//! Employee repository contract and SQLite mapping.
//!
//! # Responsibility
//! - Map [`Employee`] onto the `employees` table.
//! - Extend the generic CRUD contract with email and last-name lookups.
//!
//! # Invariants
//! - `email` is not unique in storage; single-result lookups report
//!   ambiguity instead of picking a row.

use crate::model::employee::{Employee, EmployeeId};
use crate::repo::crud::{CrudRepository, Entity, RepoError, RepoResult};
use crate::repo::sqlite::SqliteRepository;
use rusqlite::types::Value;
use rusqlite::Row;

/// SQLite-backed employee repository.
pub type SqliteEmployeeRepository<'conn> = SqliteRepository<'conn, Employee>;

/// Repository interface for employee persistence.
pub trait EmployeeRepository: CrudRepository<Employee, EmployeeId> {
    /// Returns the employee with exactly this email, or `None`.
    ///
    /// # Errors
    /// - `RepoError::NonUniqueResult` when several employees share the email.
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Employee>>;

    /// Returns every employee with this email, ordered by id.
    fn find_all_by_email(&self, email: &str) -> RepoResult<Vec<Employee>>;

    fn find_by_last_name(&self, last_name: &str) -> RepoResult<Vec<Employee>>;
}

impl Entity for Employee {
    type Id = EmployeeId;

    const TABLE: &'static str = "employees";
    const ID_COLUMN: &'static str = "id";
    const COLUMNS: &'static [&'static str] = &["first_name", "last_name", "email"];

    fn id(&self) -> Option<EmployeeId> {
        self.id
    }

    fn with_id(mut self, id: EmployeeId) -> Self {
        self.id = Some(id);
        self
    }

    fn column_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.first_name.clone()),
            Value::Text(self.last_name.clone()),
            Value::Text(self.email.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let employee = Employee {
            id: Some(row.get("id")?),
            first_name: row.get("first_name")?,
            last_name: row.get("last_name")?,
            email: row.get("email")?,
        };
        // Reject corrupt rows instead of handing them to callers.
        employee.validate().map_err(|err| {
            RepoError::InvalidData(format!("corrupt row in employees: {err}"))
        })?;
        Ok(employee)
    }

    fn validate(&self) -> RepoResult<()> {
        Employee::validate(self)?;
        Ok(())
    }
}

impl EmployeeRepository for SqliteRepository<'_, Employee> {
    fn find_by_email(&self, email: &str) -> RepoResult<Option<Employee>> {
        self.find_one_by("email", email)
    }

    fn find_all_by_email(&self, email: &str) -> RepoResult<Vec<Employee>> {
        self.find_all_by("email", email)
    }

    fn find_by_last_name(&self, last_name: &str) -> RepoResult<Vec<Employee>> {
        self.find_all_by("last_name", last_name)
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteEmployeeRepository;
    use crate::db::open_db_in_memory;
    use crate::model::employee::Employee;
    use crate::repo::crud::{CrudRepository, RepoError};

    #[test]
    fn unknown_lookup_column_is_rejected() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

        let err = repo.find_all_by("salary", 10).unwrap_err();
        assert!(matches!(
            err,
            RepoError::UnknownColumn { table: "employees", ref column } if column == "salary"
        ));
    }

    #[test]
    fn lookup_by_id_column_is_allowed() {
        let conn = open_db_in_memory().unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();
        let saved = repo
            .save(&Employee::new("Ada", "Lovelace", "ada@example.com"))
            .unwrap();

        let found = repo.find_one_by("id", saved.id).unwrap();
        assert_eq!(found, Some(saved));
    }

    #[test]
    fn corrupt_row_with_non_positive_id_is_reported() {
        let conn = open_db_in_memory().unwrap();
        conn.execute(
            "INSERT INTO employees (id, first_name, last_name, email) VALUES (0, 'a', 'b', 'c');",
            [],
        )
        .unwrap();
        let repo = SqliteEmployeeRepository::try_new(&conn).unwrap();

        let err = repo.find_all().unwrap_err();
        assert!(
            matches!(err, RepoError::InvalidData(ref message) if message.contains("must be positive")),
            "unexpected error: {err}"
        );
    }
}

//! Employee use-case service.
//!
//! # Responsibility
//! - Provide stable entry points for CLI and other core callers.
//! - Delegate persistence to any [`EmployeeRepository`] implementation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation.
//! - The service stays storage-agnostic.

use crate::model::employee::{Employee, EmployeeId};
use crate::repo::crud::{Entity, RepoError, RepoResult};
use crate::repo::employee_repo::EmployeeRepository;
use log::info;

/// Use-case wrapper for employee persistence.
pub struct EmployeeService<R: EmployeeRepository> {
    repo: R,
}

impl<R: EmployeeRepository> EmployeeService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists a new employee and returns it with its assigned id.
    pub fn register(
        &self,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> RepoResult<Employee> {
        let employee = Employee::builder()
            .first_name(first_name)
            .last_name(last_name)
            .email(email)
            .build();
        let saved = self.repo.save(&employee)?;
        info!(
            "event=employee_register module=service status=ok id={}",
            saved.id.unwrap_or_default()
        );
        Ok(saved)
    }

    pub fn get(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.repo.find_by_id(id)
    }

    /// Like [`Self::get`] but treats an absent row as `NotFound`.
    pub fn require(&self, id: EmployeeId) -> RepoResult<Employee> {
        self.repo.find_by_id(id)?.ok_or_else(|| not_found(id))
    }

    pub fn list(&self) -> RepoResult<Vec<Employee>> {
        self.repo.find_all()
    }

    pub fn find_by_email(&self, email: &str) -> RepoResult<Option<Employee>> {
        self.repo.find_by_email(email)
    }

    /// Loads, mutates and re-saves one employee's email.
    ///
    /// Returns `NotFound` when `id` has no row.
    pub fn change_email(&self, id: EmployeeId, email: impl Into<String>) -> RepoResult<Employee> {
        let mut employee = self.require(id)?;
        employee.email = email.into();
        let saved = self.repo.save(&employee)?;
        info!("event=employee_change_email module=service status=ok id={id}");
        Ok(saved)
    }

    /// Deletes one employee by id.
    ///
    /// Returns whether a row existed before the call.
    pub fn remove(&self, id: EmployeeId) -> RepoResult<bool> {
        let existed = self.repo.exists_by_id(id)?;
        self.repo.delete_by_id(id)?;
        info!("event=employee_remove module=service status=ok id={id} existed={existed}");
        Ok(existed)
    }
}

fn not_found(id: EmployeeId) -> RepoError {
    RepoError::NotFound {
        table: Employee::TABLE,
        id: id.to_string(),
    }
}

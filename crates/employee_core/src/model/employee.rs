//! Employee domain model.
//!
//! # Responsibility
//! - Define the employee record shared by repository, service and CLI.
//! - Provide a builder for records that have not been persisted yet.
//!
//! # Invariants
//! - `id` is `None` until the first successful save.
//! - An assigned `id` is always positive.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storage-assigned numeric identity.
///
/// Kept as a type alias to make semantic intent explicit in signatures.
pub type EmployeeId = i64;

/// Validation failures for employee records.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmployeeValidationError {
    #[error("employee id must be positive, got {0}")]
    NonPositiveId(EmployeeId),
}

/// One row of the `employees` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    /// Assigned by storage on insert; `None` for unsaved records.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EmployeeId>,
    pub first_name: String,
    pub last_name: String,
    /// Secondary lookup key. Not enforced unique.
    pub email: String,
}

impl Employee {
    /// Starts building an unsaved employee.
    pub fn builder() -> EmployeeBuilder {
        EmployeeBuilder::default()
    }

    /// Creates an unsaved employee from all mutable fields.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
        }
    }

    /// Returns whether this record has never been persisted.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Validates invariants that must hold before persistence.
    ///
    /// # Errors
    /// - Returns `NonPositiveId` when an assigned id is zero or negative.
    pub fn validate(&self) -> Result<(), EmployeeValidationError> {
        match self.id {
            Some(id) if id <= 0 => Err(EmployeeValidationError::NonPositiveId(id)),
            _ => Ok(()),
        }
    }
}

/// Named-field construction helper for [`Employee`].
///
/// Fields not set default to the empty string; the built record has no id.
#[derive(Debug, Clone, Default)]
pub struct EmployeeBuilder {
    id: Option<EmployeeId>,
    first_name: String,
    last_name: String,
    email: String,
}

impl EmployeeBuilder {
    /// Sets an explicit identity. Used by import paths where the id is known.
    pub fn id(mut self, id: EmployeeId) -> Self {
        self.id = Some(id);
        self
    }

    pub fn first_name(mut self, value: impl Into<String>) -> Self {
        self.first_name = value.into();
        self
    }

    pub fn last_name(mut self, value: impl Into<String>) -> Self {
        self.last_name = value.into();
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = value.into();
        self
    }

    pub fn build(self) -> Employee {
        Employee {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
        }
    }

    /// Builds and validates in one step.
    pub fn try_build(self) -> Result<Employee, EmployeeValidationError> {
        let employee = self.build();
        employee.validate()?;
        Ok(employee)
    }
}

//! Core persistence layer for employee records.
//! Owns the entity model, the generic repository contract and its SQLite
//! implementation.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{AppConfig, ConfigError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::employee::{Employee, EmployeeBuilder, EmployeeId, EmployeeValidationError};
pub use repo::crud::{CrudRepository, Entity, RepoError, RepoResult};
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::sqlite::SqliteRepository;
pub use service::employee_service::EmployeeService;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}

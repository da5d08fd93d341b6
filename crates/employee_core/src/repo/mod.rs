//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define a generic CRUD contract parameterized by entity and identity.
//! - Implement that contract once over SQLite for any mapped [`Entity`].
//! - Extend it per entity with derived lookups (`find_by_email`).
//!
//! # Invariants
//! - Write paths validate the entity before any SQL mutation.
//! - Missing rows are `Ok(None)` on reads and a no-op on deletes.

pub mod crud;
pub mod employee_repo;
pub mod sqlite;

pub use crud::{CrudRepository, Entity, RepoError, RepoResult};

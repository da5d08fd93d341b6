//! Domain model for employee records.
//!
//! # Responsibility
//! - Define the canonical employee record persisted by the repository layer.
//! - Provide construction helpers usable before an identity exists.
//!
//! # Invariants
//! - Identity is assigned by storage on first persist, never by callers.
//! - Email is a lookup key, not a uniqueness constraint.

pub mod employee;

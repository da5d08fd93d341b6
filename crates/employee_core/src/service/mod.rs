//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Turn absent values into errors where a use-case requires a row.

pub mod employee_service;

//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate record store calls into use-case level APIs.
//! - Own the assignment-change audit rule: closing history is written
//!   exactly when an employee's job or department changes.
//!
//! # See also
//! - `repo::record_store` for the persistence seam.

pub mod employee_service;
pub mod history_writer;

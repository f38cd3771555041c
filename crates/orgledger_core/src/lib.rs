//! Core domain logic for orgledger.
//! This crate is the single source of truth for assignment-history invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, FixedOffsetWallClock, SystemClock};
pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::employee::{Employee, EmployeeId, EmployeePatch, NewEmployee};
pub use model::job_history::{JobHistory, JobHistoryId, NewJobHistory};
pub use model::org::{
    Department, DepartmentId, Job, JobId, Location, LocationId, NewDepartment, NewJob,
    NewLocation,
};
pub use model::validation::ModelValidationError;
pub use repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
pub use repo::history_repo::{JobHistoryQuery, JobHistoryRepository, SqliteJobHistoryRepository};
pub use repo::org_repo::{OrgRepository, SqliteOrgRepository};
pub use repo::record_store::{RecordStore, SqliteRecordStore};
pub use repo::{RepoError, RepoResult};
pub use service::employee_service::{
    AssignmentUpdate, EmployeeService, EmployeeServiceError, EmployeeServiceResult,
};
pub use service::history_writer::HistoryWriter;

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

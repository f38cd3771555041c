//! Employee use-case service and assignment update engine.
//!
//! # Responsibility
//! - Apply full and partial employee updates from sparse payloads.
//! - Write one closing history record when a full update moves the employee
//!   to another job or department.
//!
//! # Invariants
//! - Payload validation happens before any store access.
//! - Change detection and the history snapshot use the pre-update state.
//! - History and employee writes share one store transaction; history is
//!   written first.
//! - A missing employee is an empty result, not an error.

use crate::clock::Clock;
use crate::model::employee::{Employee, EmployeeId, EmployeePatch, NewEmployee};
use crate::model::job_history::JobHistory;
use crate::model::validation::ModelValidationError;
use crate::repo::record_store::RecordStore;
use crate::repo::RepoError;
use crate::service::history_writer::HistoryWriter;
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Service error for employee use-cases.
#[derive(Debug)]
pub enum EmployeeServiceError {
    /// Update payload carries no employee identifier.
    MissingEmployeeId,
    /// Payload or snapshot failed model validation.
    Validation(ModelValidationError),
    /// Employee is still referenced by history and cannot be deleted.
    EmployeeHasHistory { id: EmployeeId, history_count: i64 },
    /// Persistence-layer failure, propagated unmodified.
    Store(RepoError),
}

impl Display for EmployeeServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingEmployeeId => write!(f, "employee id is required"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::EmployeeHasHistory { id, history_count } => write!(
                f,
                "employee {id} has {history_count} history record(s) and cannot be deleted"
            ),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EmployeeServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ModelValidationError> for EmployeeServiceError {
    fn from(value: ModelValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for EmployeeServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::Validation(err) => Self::Validation(err),
            RepoError::EmployeeHasHistory { id, history_count } => Self::EmployeeHasHistory {
                id: EmployeeId(id),
                history_count,
            },
            other => Self::Store(other),
        }
    }
}

impl EmployeeServiceError {
    fn code(&self) -> &'static str {
        match self {
            Self::MissingEmployeeId => "missing_employee_id",
            Self::Validation(_) => "validation_failed",
            Self::EmployeeHasHistory { .. } => "employee_has_history",
            Self::Store(_) => "store_failed",
        }
    }
}

pub type EmployeeServiceResult<T> = Result<T, EmployeeServiceError>;

/// Result of a full update that found its employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentUpdate {
    /// Employee as persisted after the update.
    pub employee: Employee,
    /// Closing record, present only when job or department changed.
    pub history: Option<JobHistory>,
}

/// Employee service facade over a record store.
pub struct EmployeeService<S: RecordStore, C: Clock> {
    store: S,
    history: HistoryWriter<C>,
}

impl<S: RecordStore, C: Clock> EmployeeService<S, C> {
    /// Creates a service using the provided store and history writer.
    pub fn new(store: S, history: HistoryWriter<C>) -> Self {
        Self { store, history }
    }

    /// Creates one employee from an administrative draft.
    pub fn create_employee(&self, employee: &NewEmployee) -> EmployeeServiceResult<Employee> {
        employee.validate()?;
        let created = self.store.create_employee(employee)?;
        info!(
            "event=employee_create module=service status=ok employee_id={}",
            created.id
        );
        Ok(created)
    }

    /// Gets one employee by id.
    pub fn get_employee(&self, id: EmployeeId) -> EmployeeServiceResult<Option<Employee>> {
        Ok(self.store.find_employee_by_id(id)?)
    }

    /// Applies a full update, closing the current assignment when job or
    /// department changes.
    ///
    /// # Contract
    /// - `patch.id` is required; absent fields leave stored values untouched.
    /// - Returns `Ok(None)` when the employee does not exist; nothing is
    ///   written in that case.
    /// - When `patch.job` or `patch.department` differs from the stored
    ///   value, exactly one history record is written holding the old job,
    ///   old department, old salary and old hire date.
    pub fn update_employee(
        &self,
        patch: &EmployeePatch,
    ) -> EmployeeServiceResult<Option<AssignmentUpdate>> {
        let started_at = Instant::now();
        let id = patch.id.ok_or(EmployeeServiceError::MissingEmployeeId)?;
        patch.validate()?;

        let outcome = self.store.in_transaction(|store| {
            let Some(existing) = store.find_employee_by_id(id)? else {
                return Ok(None);
            };

            let history = if patch.changes_assignment_of(&existing) {
                Some(self.history.write(store, &existing)?)
            } else {
                None
            };

            let mut updated = existing;
            patch.apply_profile(&mut updated);
            patch.apply_assignment(&mut updated);
            let employee = store.persist_employee(&updated)?;
            Ok(Some(AssignmentUpdate { employee, history }))
        });

        let outcome = outcome.map_err(EmployeeServiceError::from);
        log_update("employee_update", id, &outcome, started_at, |update| {
            update.history.as_ref().map(|record| record.id.get())
        });
        outcome
    }

    /// Applies a partial update of personal and compensation fields.
    ///
    /// Never writes history and never moves the employee: job and
    /// department in the patch are ignored. Returns `Ok(None)` when the
    /// employee does not exist.
    pub fn partial_update_employee(
        &self,
        patch: &EmployeePatch,
    ) -> EmployeeServiceResult<Option<Employee>> {
        let started_at = Instant::now();
        let id = patch.id.ok_or(EmployeeServiceError::MissingEmployeeId)?;
        patch.validate()?;
        if patch.touches_assignment() {
            warn!(
                "event=employee_partial_update module=service status=warn reason=assignment_fields_ignored employee_id={id}"
            );
        }

        let outcome = self
            .store
            .in_transaction(|store| {
                let Some(mut existing) = store.find_employee_by_id(id)? else {
                    return Ok(None);
                };
                patch.apply_profile(&mut existing);
                store.persist_employee(&existing).map(Some)
            })
            .map_err(EmployeeServiceError::from);

        log_update("employee_partial_update", id, &outcome, started_at, |_| None);
        outcome
    }

    /// Deletes one employee.
    ///
    /// Returns `Ok(false)` when the employee does not exist.
    ///
    /// # Errors
    /// - `EmployeeHasHistory` while history records reference the employee.
    pub fn delete_employee(&self, id: EmployeeId) -> EmployeeServiceResult<bool> {
        match self.store.delete_employee(id) {
            Ok(()) => {
                info!("event=employee_delete module=service status=ok employee_id={id}");
                Ok(true)
            }
            Err(RepoError::NotFound { .. }) => Ok(false),
            Err(err) => {
                let err = EmployeeServiceError::from(err);
                error!(
                    "event=employee_delete module=service status=error employee_id={} error_code={}",
                    id,
                    err.code()
                );
                Err(err)
            }
        }
    }

    /// Lists closed assignment periods of one employee, oldest first.
    pub fn employee_history(&self, id: EmployeeId) -> EmployeeServiceResult<Vec<JobHistory>> {
        Ok(self.store.history_of(id)?)
    }
}

fn log_update<T>(
    event: &str,
    id: EmployeeId,
    outcome: &EmployeeServiceResult<Option<T>>,
    started_at: Instant,
    history_id: impl Fn(&T) -> Option<i64>,
) {
    let duration_ms = started_at.elapsed().as_millis();
    match outcome {
        Ok(Some(value)) => match history_id(value) {
            Some(history_id) => info!(
                "event={event} module=service status=ok employee_id={id} history_id={history_id} duration_ms={duration_ms}"
            ),
            None => info!(
                "event={event} module=service status=ok employee_id={id} duration_ms={duration_ms}"
            ),
        },
        Ok(None) => info!(
            "event={event} module=service status=not_found employee_id={id} duration_ms={duration_ms}"
        ),
        Err(err) => error!(
            "event={event} module=service status=error employee_id={id} duration_ms={duration_ms} error_code={} error={err}",
            err.code()
        ),
    }
}

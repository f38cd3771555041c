//! Assignment history records.
//!
//! # Responsibility
//! - Define the closed interval written when an employee changes job or
//!   department.
//!
//! # Invariants
//! - A stored `JobHistory` is never mutated or deleted.
//! - `start_date <= end_date` whenever `start_date` is set.
//! - Referenced job, department and salary are snapshots of the assignment
//!   being closed, not of the one replacing it.

use crate::model::employee::{Employee, EmployeeId};
use crate::model::org::{DepartmentId, JobId};
use crate::model::validation::ModelValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Stable identifier of a stored history record.
    JobHistoryId
);

/// Stored, immutable history record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHistory {
    pub id: JobHistoryId,
    pub employee: EmployeeId,
    pub job: Option<JobId>,
    pub department: Option<DepartmentId>,
    /// `None` when the closed assignment had no recorded hire date.
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    pub salary: Option<i64>,
}

/// History record that has not been written yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJobHistory {
    pub employee: EmployeeId,
    pub job: Option<JobId>,
    pub department: Option<DepartmentId>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: DateTime<Utc>,
    pub salary: Option<i64>,
}

impl NewJobHistory {
    /// Builds the record closing `prior`'s current assignment at `end_date`.
    ///
    /// `prior` must be the employee state before any update is applied.
    ///
    /// # Errors
    /// - `InvertedHistoryInterval` when `prior.hire_date` is after `end_date`.
    pub fn closing(prior: &Employee, end_date: DateTime<Utc>) -> Result<Self, ModelValidationError> {
        let record = Self {
            employee: prior.id,
            job: prior.job,
            department: prior.department,
            start_date: prior.hire_date,
            end_date,
            salary: prior.salary,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        match self.start_date {
            Some(start) if start > self.end_date => {
                Err(ModelValidationError::InvertedHistoryInterval {
                    start,
                    end: self.end_date,
                })
            }
            _ => Ok(()),
        }
    }

    /// Returns whether the closed interval has no known start.
    pub fn has_open_start(&self) -> bool {
        self.start_date.is_none()
    }

    /// Attaches a storage identifier, producing the stored shape.
    pub fn into_history(self, id: JobHistoryId) -> JobHistory {
        JobHistory {
            id,
            employee: self.employee,
            job: self.job,
            department: self.department,
            start_date: self.start_date,
            end_date: self.end_date,
            salary: self.salary,
        }
    }
}

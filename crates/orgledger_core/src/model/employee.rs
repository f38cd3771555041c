//! Employee domain model and update payload.
//!
//! # Responsibility
//! - Define the stored employee record and its unsaved draft.
//! - Define `EmployeePatch`, the sparse payload accepted by update paths.
//!
//! # Invariants
//! - An employee has at most one current job and one current department.
//! - `hire_date` marks the start of the current assignment period.
//! - In a patch, `None` means "leave unchanged", never "clear".

use crate::model::org::{DepartmentId, JobId};
use crate::model::validation::{
    check_commission, check_email, check_non_negative, check_not_blank, ModelValidationError,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Stable identifier of a stored employee.
    EmployeeId
);

/// Stored employee with its current assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Employee {
    pub id: EmployeeId,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    /// Start of the current assignment period.
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub job: Option<JobId>,
    pub department: Option<DepartmentId>,
}

impl Employee {
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.email.as_deref(),
            self.salary,
            self.commission_pct,
        )
    }
}

/// Unsaved employee, created by an administrative action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEmployee {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub job: Option<JobId>,
    pub department: Option<DepartmentId>,
}

impl NewEmployee {
    /// Creates a draft with a first and last name and nothing else.
    pub fn named(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            first_name: Some(first_name.into()),
            last_name: Some(last_name.into()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.email.as_deref(),
            self.salary,
            self.commission_pct,
        )
    }

    /// Attaches a storage identifier, producing the stored shape.
    pub fn into_employee(self, id: EmployeeId) -> Employee {
        Employee {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone_number: self.phone_number,
            hire_date: self.hire_date,
            salary: self.salary,
            commission_pct: self.commission_pct,
            job: self.job,
            department: self.department,
        }
    }
}

/// Sparse update payload for one employee.
///
/// Absent fields leave the stored value untouched. The target identifier is
/// carried on the payload and must be present.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EmployeePatch {
    pub id: Option<EmployeeId>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub hire_date: Option<DateTime<Utc>>,
    pub salary: Option<i64>,
    pub commission_pct: Option<i64>,
    pub job: Option<JobId>,
    pub department: Option<DepartmentId>,
}

impl EmployeePatch {
    /// Creates an empty patch targeting `id`.
    pub fn for_employee(id: EmployeeId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// Validates the fields that are present.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        validate_fields(
            self.first_name.as_deref(),
            self.last_name.as_deref(),
            self.email.as_deref(),
            self.salary,
            self.commission_pct,
        )
    }

    /// Returns whether the patch carries a job or department.
    pub fn touches_assignment(&self) -> bool {
        self.job.is_some() || self.department.is_some()
    }

    /// Returns whether applying this patch would move `employee` to another
    /// job or department. Compares identifiers only.
    pub fn changes_assignment_of(&self, employee: &Employee) -> bool {
        let job_changed = self.job.is_some_and(|job| employee.job != Some(job));
        let department_changed = self
            .department
            .is_some_and(|department| employee.department != Some(department));
        job_changed || department_changed
    }

    /// Overwrites personal and compensation fields present in the patch.
    pub fn apply_profile(&self, employee: &mut Employee) {
        if let Some(first_name) = &self.first_name {
            employee.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &self.last_name {
            employee.last_name = Some(last_name.clone());
        }
        if let Some(email) = &self.email {
            employee.email = Some(email.clone());
        }
        if let Some(phone_number) = &self.phone_number {
            employee.phone_number = Some(phone_number.clone());
        }
        if let Some(hire_date) = self.hire_date {
            employee.hire_date = Some(hire_date);
        }
        if let Some(salary) = self.salary {
            employee.salary = Some(salary);
        }
        if let Some(commission_pct) = self.commission_pct {
            employee.commission_pct = Some(commission_pct);
        }
    }

    /// Overwrites job and department when present in the patch.
    pub fn apply_assignment(&self, employee: &mut Employee) {
        if let Some(job) = self.job {
            employee.job = Some(job);
        }
        if let Some(department) = self.department {
            employee.department = Some(department);
        }
    }
}

fn validate_fields(
    first_name: Option<&str>,
    last_name: Option<&str>,
    email: Option<&str>,
    salary: Option<i64>,
    commission_pct: Option<i64>,
) -> Result<(), ModelValidationError> {
    check_not_blank("first_name", first_name)?;
    check_not_blank("last_name", last_name)?;
    check_email(email)?;
    check_non_negative("salary", salary)?;
    check_commission(commission_pct)?;
    Ok(())
}

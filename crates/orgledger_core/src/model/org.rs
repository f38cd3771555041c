//! Organization reference data: locations, departments and jobs.
//!
//! # Invariants
//! - Department and job names are required and non-blank.
//! - Job salary band satisfies `min_salary <= max_salary` when both are set.
//! - A department points at its location and manager; neither side keeps a
//!   collection of the other.

use crate::model::employee::EmployeeId;
use crate::model::validation::{check_non_negative, check_not_blank, ModelValidationError};
use serde::{Deserialize, Serialize};

entity_id!(
    /// Stable identifier of a stored location.
    LocationId
);
entity_id!(
    /// Stable identifier of a stored department.
    DepartmentId
);
entity_id!(
    /// Stable identifier of a stored job title.
    JobId
);

/// Physical site that departments are attached to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
}

/// Unsaved location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLocation {
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
    pub state_province: Option<String>,
}

/// Organizational unit employees are assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Department {
    pub id: DepartmentId,
    pub department_name: String,
    pub location: Option<LocationId>,
    /// Cleared by storage when the managing employee is removed.
    pub manager: Option<EmployeeId>,
}

/// Unsaved department.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewDepartment {
    pub department_name: String,
    pub location: Option<LocationId>,
    pub manager: Option<EmployeeId>,
}

impl NewDepartment {
    /// Creates a department draft with no location or manager.
    pub fn named(department_name: impl Into<String>) -> Self {
        Self {
            department_name: department_name.into(),
            location: None,
            manager: None,
        }
    }

    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_not_blank("department_name", Some(self.department_name.as_str()))
    }
}

/// Job title with an optional salary band.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub job_title: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

/// Unsaved job title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewJob {
    pub job_title: String,
    pub min_salary: Option<i64>,
    pub max_salary: Option<i64>,
}

impl NewJob {
    /// Creates a job draft without a salary band.
    pub fn titled(job_title: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            min_salary: None,
            max_salary: None,
        }
    }

    /// Validates title and salary band.
    ///
    /// # Errors
    /// - `BlankField("job_title")` for blank titles.
    /// - `NegativeAmount` for negative band edges.
    /// - `InvertedSalaryRange` when `min_salary > max_salary`.
    pub fn validate(&self) -> Result<(), ModelValidationError> {
        check_not_blank("job_title", Some(self.job_title.as_str()))?;
        check_non_negative("min_salary", self.min_salary)?;
        check_non_negative("max_salary", self.max_salary)?;
        if let (Some(min), Some(max)) = (self.min_salary, self.max_salary) {
            if min > max {
                return Err(ModelValidationError::InvertedSalaryRange { min, max });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{NewDepartment, NewJob};
    use crate::model::validation::ModelValidationError;

    #[test]
    fn job_band_must_not_be_inverted() {
        let mut job = NewJob::titled("Analyst");
        job.min_salary = Some(60_000);
        job.max_salary = Some(40_000);
        assert_eq!(
            job.validate(),
            Err(ModelValidationError::InvertedSalaryRange {
                min: 60_000,
                max: 40_000
            })
        );
    }

    #[test]
    fn department_name_is_required() {
        assert_eq!(
            NewDepartment::named(" ").validate(),
            Err(ModelValidationError::BlankField("department_name"))
        );
        assert!(NewDepartment::named("Sales").validate().is_ok());
    }
}

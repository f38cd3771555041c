//! History writer: closes an employee's current assignment period.
//!
//! # Invariants
//! - Input is always the employee state before an update is applied.
//! - `start_date` comes from the prior `hire_date` and is never defaulted.
//! - `end_date` comes from the injected clock, raised to `start_date` when a
//!   lagging clock reads earlier than a hire date that has already passed.

use crate::clock::Clock;
use crate::model::employee::Employee;
use crate::model::job_history::{JobHistory, NewJobHistory};
use crate::model::validation::ModelValidationError;
use crate::repo::record_store::RecordStore;
use crate::repo::RepoResult;
use chrono::{DateTime, Utc};
use log::{info, warn};

/// Builds and persists closing history records.
pub struct HistoryWriter<C: Clock> {
    clock: C,
}

impl<C: Clock> HistoryWriter<C> {
    /// Creates a writer stamping `end_date` from `clock`.
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Builds the closing record for `prior` without writing it.
    ///
    /// A missing `hire_date` yields a record with an open start and a
    /// `missing_hire_date` warning event.
    ///
    /// # Errors
    /// - `InvertedHistoryInterval` when `prior.hire_date` lies after "now"
    ///   by more than the clock's lag.
    pub fn snapshot(&self, prior: &Employee) -> Result<NewJobHistory, ModelValidationError> {
        let record = NewJobHistory::closing(prior, self.end_date_for(prior))?;
        if record.has_open_start() {
            warn!(
                "event=history_snapshot module=service status=warn reason=missing_hire_date employee_id={}",
                prior.id
            );
        }
        Ok(record)
    }

    fn end_date_for(&self, prior: &Employee) -> DateTime<Utc> {
        let now = self.clock.now();
        match prior.hire_date {
            Some(start) if start > now && start <= now + self.clock.lag() => {
                warn!(
                    "event=history_snapshot module=service status=warn reason=end_date_clamped employee_id={}",
                    prior.id
                );
                start
            }
            _ => now,
        }
    }

    /// Builds the closing record for `prior` and persists it through `store`.
    pub fn write<S: RecordStore>(&self, store: &S, prior: &Employee) -> RepoResult<JobHistory> {
        let record = self.snapshot(prior)?;
        let stored = store.persist_history(&record)?;
        info!(
            "event=history_write module=service status=ok employee_id={} history_id={} open_start={}",
            stored.employee,
            stored.id,
            stored.start_date.is_none()
        );
        Ok(stored)
    }
}

//! Assignment record store: the persistence seam used by assignment
//! services.
//!
//! # Responsibility
//! - Bundle the employee and history operations the update engine needs.
//! - Provide a unit-of-work boundary so history and employee writes commit
//!   or roll back together.
//!
//! # Invariants
//! - `in_transaction` commits only when the work returns `Ok`.
//! - The store performs no optimistic concurrency check; concurrent writers
//!   on other connections are serialized by SQLite's write lock only.

use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::job_history::{JobHistory, NewJobHistory};
use crate::repo::employee_repo::{EmployeeRepository, SqliteEmployeeRepository};
use crate::repo::history_repo::{
    JobHistoryQuery, JobHistoryRepository, SqliteJobHistoryRepository,
};
use crate::repo::RepoResult;
use log::warn;
use rusqlite::{Connection, Transaction, TransactionBehavior};

/// Persistence operations consumed by the assignment update engine.
pub trait RecordStore {
    fn find_employee_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    fn persist_employee(&self, employee: &Employee) -> RepoResult<Employee>;
    fn persist_history(&self, record: &NewJobHistory) -> RepoResult<JobHistory>;
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee>;
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
    /// Lists history records of one employee, oldest closing first.
    fn history_of(&self, id: EmployeeId) -> RepoResult<Vec<JobHistory>>;
    /// Runs `work` as one atomic unit against this store.
    fn in_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>;
}

/// SQLite-backed record store over one migrated connection.
pub struct SqliteRecordStore<'conn> {
    conn: &'conn Connection,
    employees: SqliteEmployeeRepository<'conn>,
    history: SqliteJobHistoryRepository<'conn>,
}

impl<'conn> SqliteRecordStore<'conn> {
    /// Constructs a store from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            conn,
            employees: SqliteEmployeeRepository::try_new(conn)?,
            history: SqliteJobHistoryRepository::try_new(conn)?,
        })
    }
}

impl RecordStore for SqliteRecordStore<'_> {
    fn find_employee_by_id(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        self.employees.get_employee(id)
    }

    fn persist_employee(&self, employee: &Employee) -> RepoResult<Employee> {
        self.employees.update_employee(employee)
    }

    fn persist_history(&self, record: &NewJobHistory) -> RepoResult<JobHistory> {
        self.history.insert_history(record)
    }

    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        self.employees.create_employee(employee)
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        self.employees.delete_employee(id)
    }

    fn history_of(&self, id: EmployeeId) -> RepoResult<Vec<JobHistory>> {
        self.history.list_history(&JobHistoryQuery::for_employee(id))
    }

    fn in_transaction<T, F>(&self, work: F) -> RepoResult<T>
    where
        F: FnOnce(&Self) -> RepoResult<T>,
    {
        // Immediate: take the write lock before the first read so the
        // lookup-then-write sequence cannot interleave with another writer.
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;
        match work(self) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    warn!(
                        "event=store_rollback module=repo status=error error={}",
                        rollback_err
                    );
                }
                Err(err)
            }
        }
    }
}

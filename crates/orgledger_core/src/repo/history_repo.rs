//! Job history repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Append closed assignment intervals to `job_history`.
//! - Answer read-side history queries by employee, job or department.
//!
//! # Invariants
//! - There is no update or delete path; storage triggers reject both.
//! - Listing order is deterministic: `end_date ASC, id ASC`.

use crate::model::employee::EmployeeId;
use crate::model::job_history::{JobHistory, JobHistoryId, NewJobHistory};
use crate::model::org::{DepartmentId, JobId};
use crate::repo::{
    ensure_connection_ready, ensure_reference, from_epoch_ms, optional_from_epoch_ms, to_epoch_ms,
    RepoError, RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const HISTORY_SELECT_SQL: &str = "SELECT
    id,
    employee_id,
    job_id,
    department_id,
    start_date,
    end_date,
    salary
FROM job_history";

/// Filter options for history listing. Empty query lists everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobHistoryQuery {
    pub employee: Option<EmployeeId>,
    pub job: Option<JobId>,
    pub department: Option<DepartmentId>,
}

impl JobHistoryQuery {
    pub fn for_employee(employee: EmployeeId) -> Self {
        Self {
            employee: Some(employee),
            ..Self::default()
        }
    }
}

/// Repository interface for append-only history records.
pub trait JobHistoryRepository {
    fn insert_history(&self, record: &NewJobHistory) -> RepoResult<JobHistory>;
    fn get_history(&self, id: JobHistoryId) -> RepoResult<Option<JobHistory>>;
    fn list_history(&self, query: &JobHistoryQuery) -> RepoResult<Vec<JobHistory>>;
}

/// SQLite-backed history repository.
pub struct SqliteJobHistoryRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteJobHistoryRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["job_history", "employees", "jobs", "departments"])?;
        Ok(Self { conn })
    }
}

impl JobHistoryRepository for SqliteJobHistoryRepository<'_> {
    fn insert_history(&self, record: &NewJobHistory) -> RepoResult<JobHistory> {
        record.validate()?;
        ensure_reference(self.conn, "employees", "employee", record.employee.get())?;
        if let Some(job) = record.job {
            ensure_reference(self.conn, "jobs", "job", job.get())?;
        }
        if let Some(department) = record.department {
            ensure_reference(self.conn, "departments", "department", department.get())?;
        }

        self.conn.execute(
            "INSERT INTO job_history (
                employee_id,
                job_id,
                department_id,
                start_date,
                end_date,
                salary
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                record.employee.get(),
                record.job.map(JobId::get),
                record.department.map(DepartmentId::get),
                record.start_date.map(to_epoch_ms),
                to_epoch_ms(record.end_date),
                record.salary,
            ],
        )?;

        let id = JobHistoryId(self.conn.last_insert_rowid());
        self.get_history(id)?.ok_or(RepoError::NotFound {
            entity: "job history",
            id: id.get(),
        })
    }

    fn get_history(&self, id: JobHistoryId) -> RepoResult<Option<JobHistory>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{HISTORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_history_row(row)?));
        }
        Ok(None)
    }

    fn list_history(&self, query: &JobHistoryQuery) -> RepoResult<Vec<JobHistory>> {
        let mut sql = format!("{HISTORY_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(employee) = query.employee {
            sql.push_str(" AND employee_id = ?");
            bind_values.push(Value::Integer(employee.get()));
        }
        if let Some(job) = query.job {
            sql.push_str(" AND job_id = ?");
            bind_values.push(Value::Integer(job.get()));
        }
        if let Some(department) = query.department {
            sql.push_str(" AND department_id = ?");
            bind_values.push(Value::Integer(department.get()));
        }
        sql.push_str(" ORDER BY end_date ASC, id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut records = Vec::new();
        while let Some(row) = rows.next()? {
            records.push(parse_history_row(row)?);
        }
        Ok(records)
    }
}

fn parse_history_row(row: &Row<'_>) -> RepoResult<JobHistory> {
    let record = NewJobHistory {
        employee: EmployeeId(row.get("employee_id")?),
        job: row.get::<_, Option<i64>>("job_id")?.map(JobId),
        department: row.get::<_, Option<i64>>("department_id")?.map(DepartmentId),
        start_date: optional_from_epoch_ms("job_history.start_date", row.get("start_date")?)?,
        end_date: from_epoch_ms("job_history.end_date", row.get("end_date")?)?,
        salary: row.get("salary")?,
    };
    let id = JobHistoryId(row.get("id")?);
    record.validate().map_err(|err| {
        RepoError::InvalidData(format!("job history {id} failed validation: {err}"))
    })?;
    Ok(record.into_history(id))
}

//! Employee repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/read/update/delete over the `employees` table.
//! - Expose the read-side "employees of a department" query.
//!
//! # Invariants
//! - Writes validate the record and its job/department references first.
//! - Employees referenced by history rows are never deleted.
//! - Read paths reject invalid persisted state instead of masking it.

use crate::model::employee::{Employee, EmployeeId, NewEmployee};
use crate::model::org::{DepartmentId, JobId};
use crate::repo::{
    ensure_connection_ready, ensure_reference, optional_from_epoch_ms, to_epoch_ms, RepoError,
    RepoResult,
};
use rusqlite::{params, Connection, Row};

const EMPLOYEE_SELECT_SQL: &str = "SELECT
    id,
    first_name,
    last_name,
    email,
    phone_number,
    hire_date,
    salary,
    commission_pct,
    job_id,
    department_id
FROM employees";

/// Repository interface for employee records.
pub trait EmployeeRepository {
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee>;
    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>>;
    /// Overwrites every column of an existing employee and returns the
    /// stored read-back.
    fn update_employee(&self, employee: &Employee) -> RepoResult<Employee>;
    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()>;
    /// Lists employees currently assigned to `department`, ordered by id.
    fn list_employees_in_department(&self, department: DepartmentId) -> RepoResult<Vec<Employee>>;
}

/// SQLite-backed employee repository.
pub struct SqliteEmployeeRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEmployeeRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["employees", "jobs", "departments", "job_history"])?;
        Ok(Self { conn })
    }

    fn ensure_assignment_references(
        &self,
        job: Option<JobId>,
        department: Option<DepartmentId>,
    ) -> RepoResult<()> {
        if let Some(job) = job {
            ensure_reference(self.conn, "jobs", "job", job.get())?;
        }
        if let Some(department) = department {
            ensure_reference(self.conn, "departments", "department", department.get())?;
        }
        Ok(())
    }

    fn load_required(&self, id: EmployeeId) -> RepoResult<Employee> {
        self.get_employee(id)?.ok_or(RepoError::NotFound {
            entity: "employee",
            id: id.get(),
        })
    }
}

impl EmployeeRepository for SqliteEmployeeRepository<'_> {
    fn create_employee(&self, employee: &NewEmployee) -> RepoResult<Employee> {
        employee.validate()?;
        self.ensure_assignment_references(employee.job, employee.department)?;

        self.conn.execute(
            "INSERT INTO employees (
                first_name,
                last_name,
                email,
                phone_number,
                hire_date,
                salary,
                commission_pct,
                job_id,
                department_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9);",
            params![
                employee.first_name.as_deref(),
                employee.last_name.as_deref(),
                employee.email.as_deref(),
                employee.phone_number.as_deref(),
                employee.hire_date.map(to_epoch_ms),
                employee.salary,
                employee.commission_pct,
                employee.job.map(JobId::get),
                employee.department.map(DepartmentId::get),
            ],
        )?;

        self.load_required(EmployeeId(self.conn.last_insert_rowid()))
    }

    fn get_employee(&self, id: EmployeeId) -> RepoResult<Option<Employee>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EMPLOYEE_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_employee_row(row)?));
        }
        Ok(None)
    }

    fn update_employee(&self, employee: &Employee) -> RepoResult<Employee> {
        employee.validate()?;
        self.ensure_assignment_references(employee.job, employee.department)?;

        let changed = self.conn.execute(
            "UPDATE employees
             SET
                first_name = ?1,
                last_name = ?2,
                email = ?3,
                phone_number = ?4,
                hire_date = ?5,
                salary = ?6,
                commission_pct = ?7,
                job_id = ?8,
                department_id = ?9
             WHERE id = ?10;",
            params![
                employee.first_name.as_deref(),
                employee.last_name.as_deref(),
                employee.email.as_deref(),
                employee.phone_number.as_deref(),
                employee.hire_date.map(to_epoch_ms),
                employee.salary,
                employee.commission_pct,
                employee.job.map(JobId::get),
                employee.department.map(DepartmentId::get),
                employee.id.get(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: "employee",
                id: employee.id.get(),
            });
        }

        self.load_required(employee.id)
    }

    fn delete_employee(&self, id: EmployeeId) -> RepoResult<()> {
        let changed = self.conn.execute(
            "DELETE FROM employees
             WHERE id = ?1
               AND NOT EXISTS (SELECT 1 FROM job_history WHERE employee_id = ?1);",
            [id.get()],
        )?;
        if changed == 1 {
            return Ok(());
        }

        if self.get_employee(id)?.is_none() {
            return Err(RepoError::NotFound {
                entity: "employee",
                id: id.get(),
            });
        }
        let history_count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM job_history WHERE employee_id = ?1;",
            [id.get()],
            |row| row.get(0),
        )?;
        Err(RepoError::EmployeeHasHistory {
            id: id.get(),
            history_count,
        })
    }

    fn list_employees_in_department(&self, department: DepartmentId) -> RepoResult<Vec<Employee>> {
        let mut stmt = self.conn.prepare(&format!(
            "{EMPLOYEE_SELECT_SQL} WHERE department_id = ?1 ORDER BY id ASC;"
        ))?;
        let mut rows = stmt.query([department.get()])?;
        let mut employees = Vec::new();
        while let Some(row) = rows.next()? {
            employees.push(parse_employee_row(row)?);
        }
        Ok(employees)
    }
}

fn parse_employee_row(row: &Row<'_>) -> RepoResult<Employee> {
    let employee = Employee {
        id: EmployeeId(row.get("id")?),
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        email: row.get("email")?,
        phone_number: row.get("phone_number")?,
        hire_date: optional_from_epoch_ms("employees.hire_date", row.get("hire_date")?)?,
        salary: row.get("salary")?,
        commission_pct: row.get("commission_pct")?,
        job: row.get::<_, Option<i64>>("job_id")?.map(JobId),
        department: row.get::<_, Option<i64>>("department_id")?.map(DepartmentId),
    };
    employee.validate().map_err(|err| {
        RepoError::InvalidData(format!("employee {} failed validation: {err}", employee.id))
    })?;
    Ok(employee)
}

//! Organization reference data repository: locations, departments, jobs.
//!
//! # Invariants
//! - Department location and manager references must exist when set.
//! - Departments are found from a location by query; locations hold no
//!   department collection.

use crate::model::employee::EmployeeId;
use crate::model::org::{
    Department, DepartmentId, Job, JobId, Location, LocationId, NewDepartment, NewJob,
    NewLocation,
};
use crate::repo::{ensure_connection_ready, ensure_reference, RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension, Row};

/// Repository interface for organization reference data.
pub trait OrgRepository {
    fn create_location(&self, location: &NewLocation) -> RepoResult<Location>;
    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>>;
    fn create_department(&self, department: &NewDepartment) -> RepoResult<Department>;
    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>>;
    fn list_departments_at_location(&self, location: LocationId) -> RepoResult<Vec<Department>>;
    fn create_job(&self, job: &NewJob) -> RepoResult<Job>;
    fn get_job(&self, id: JobId) -> RepoResult<Option<Job>>;
}

/// SQLite-backed organization repository.
pub struct SqliteOrgRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteOrgRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn, &["locations", "departments", "jobs", "employees"])?;
        Ok(Self { conn })
    }
}

impl OrgRepository for SqliteOrgRepository<'_> {
    fn create_location(&self, location: &NewLocation) -> RepoResult<Location> {
        self.conn.execute(
            "INSERT INTO locations (street_address, postal_code, city, state_province)
             VALUES (?1, ?2, ?3, ?4);",
            params![
                location.street_address.as_deref(),
                location.postal_code.as_deref(),
                location.city.as_deref(),
                location.state_province.as_deref(),
            ],
        )?;
        let id = LocationId(self.conn.last_insert_rowid());
        self.get_location(id)?.ok_or(RepoError::NotFound {
            entity: "location",
            id: id.get(),
        })
    }

    fn get_location(&self, id: LocationId) -> RepoResult<Option<Location>> {
        let location = self
            .conn
            .query_row(
                "SELECT id, street_address, postal_code, city, state_province
                 FROM locations
                 WHERE id = ?1;",
                [id.get()],
                |row| {
                    Ok(Location {
                        id: LocationId(row.get("id")?),
                        street_address: row.get("street_address")?,
                        postal_code: row.get("postal_code")?,
                        city: row.get("city")?,
                        state_province: row.get("state_province")?,
                    })
                },
            )
            .optional()?;
        Ok(location)
    }

    fn create_department(&self, department: &NewDepartment) -> RepoResult<Department> {
        department.validate()?;
        if let Some(location) = department.location {
            ensure_reference(self.conn, "locations", "location", location.get())?;
        }
        if let Some(manager) = department.manager {
            ensure_reference(self.conn, "employees", "employee", manager.get())?;
        }

        self.conn.execute(
            "INSERT INTO departments (department_name, location_id, manager_id)
             VALUES (?1, ?2, ?3);",
            params![
                department.department_name.trim(),
                department.location.map(LocationId::get),
                department.manager.map(EmployeeId::get),
            ],
        )?;
        let id = DepartmentId(self.conn.last_insert_rowid());
        self.get_department(id)?.ok_or(RepoError::NotFound {
            entity: "department",
            id: id.get(),
        })
    }

    fn get_department(&self, id: DepartmentId) -> RepoResult<Option<Department>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, department_name, location_id, manager_id
             FROM departments
             WHERE id = ?1;",
        )?;
        let mut rows = stmt.query([id.get()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_department_row(row)?));
        }
        Ok(None)
    }

    fn list_departments_at_location(&self, location: LocationId) -> RepoResult<Vec<Department>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, department_name, location_id, manager_id
             FROM departments
             WHERE location_id = ?1
             ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([location.get()])?;
        let mut departments = Vec::new();
        while let Some(row) = rows.next()? {
            departments.push(parse_department_row(row)?);
        }
        Ok(departments)
    }

    fn create_job(&self, job: &NewJob) -> RepoResult<Job> {
        job.validate()?;
        self.conn.execute(
            "INSERT INTO jobs (job_title, min_salary, max_salary) VALUES (?1, ?2, ?3);",
            params![job.job_title.trim(), job.min_salary, job.max_salary],
        )?;
        let id = JobId(self.conn.last_insert_rowid());
        self.get_job(id)?.ok_or(RepoError::NotFound {
            entity: "job",
            id: id.get(),
        })
    }

    fn get_job(&self, id: JobId) -> RepoResult<Option<Job>> {
        let job = self
            .conn
            .query_row(
                "SELECT id, job_title, min_salary, max_salary FROM jobs WHERE id = ?1;",
                [id.get()],
                |row| {
                    Ok(Job {
                        id: JobId(row.get("id")?),
                        job_title: row.get("job_title")?,
                        min_salary: row.get("min_salary")?,
                        max_salary: row.get("max_salary")?,
                    })
                },
            )
            .optional()?;
        Ok(job)
    }
}

fn parse_department_row(row: &Row<'_>) -> RepoResult<Department> {
    let department_name: String = row.get("department_name")?;
    let id = DepartmentId(row.get("id")?);
    if department_name.trim().is_empty() {
        return Err(RepoError::InvalidData(format!(
            "blank department_name in departments row {id}"
        )));
    }
    Ok(Department {
        id,
        department_name,
        location: row.get::<_, Option<i64>>("location_id")?.map(LocationId),
        manager: row.get::<_, Option<i64>>("manager_id")?.map(EmployeeId),
    })
}

use chrono::{DateTime, TimeZone, Utc};
use orgledger_core::db::open_db_in_memory;
use orgledger_core::{
    Department, DepartmentId, Employee, EmployeeId, EmployeePatch, EmployeeService,
    EmployeeServiceError, FixedClock, HistoryWriter, Job, JobHistoryQuery, JobHistoryRepository,
    ModelValidationError, NewDepartment, NewEmployee, NewJob, OrgRepository, RepoError,
    SqliteJobHistoryRepository, SqliteOrgRepository, SqliteRecordStore,
};
use rusqlite::Connection;

struct Org {
    analyst: Job,
    senior_analyst: Job,
    sales: Department,
    support: Department,
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn hire_date() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap()
}

fn seed_org(conn: &Connection) -> Org {
    let repo = SqliteOrgRepository::try_new(conn).unwrap();
    Org {
        analyst: repo.create_job(&NewJob::titled("Analyst")).unwrap(),
        senior_analyst: repo.create_job(&NewJob::titled("Senior Analyst")).unwrap(),
        sales: repo.create_department(&NewDepartment::named("Sales")).unwrap(),
        support: repo.create_department(&NewDepartment::named("Support")).unwrap(),
    }
}

fn service(conn: &Connection) -> EmployeeService<SqliteRecordStore<'_>, FixedClock> {
    EmployeeService::new(
        SqliteRecordStore::try_new(conn).unwrap(),
        HistoryWriter::new(FixedClock(now())),
    )
}

fn hire(service: &EmployeeService<SqliteRecordStore<'_>, FixedClock>, org: &Org) -> Employee {
    let mut draft = NewEmployee::named("Ada", "Lovelace");
    draft.email = Some("ada@example.com".to_string());
    draft.hire_date = Some(hire_date());
    draft.salary = Some(50_000);
    draft.job = Some(org.analyst.id);
    draft.department = Some(org.sales.id);
    service.create_employee(&draft).unwrap()
}

fn history_count(conn: &Connection) -> usize {
    SqliteJobHistoryRepository::try_new(conn)
        .unwrap()
        .list_history(&JobHistoryQuery::default())
        .unwrap()
        .len()
}

#[test]
fn promotion_closes_previous_assignment() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    patch.salary = Some(60_000);
    let update = service.update_employee(&patch).unwrap().unwrap();

    assert_eq!(update.employee.job, Some(org.senior_analyst.id));
    assert_eq!(update.employee.salary, Some(60_000));
    assert_eq!(update.employee.department, Some(org.sales.id));

    let history = service.employee_history(employee.id).unwrap();
    assert_eq!(history.len(), 1);
    let record = &history[0];
    assert_eq!(Some(record), update.history.as_ref());
    assert_eq!(record.employee, employee.id);
    assert_eq!(record.job, Some(org.analyst.id));
    assert_eq!(record.department, Some(org.sales.id));
    assert_eq!(record.salary, Some(50_000));
    assert_eq!(record.start_date, Some(hire_date()));
    assert_eq!(record.end_date, now());
}

#[test]
fn history_keeps_old_hire_date_when_patch_also_moves_it() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);
    let rehired = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    patch.hire_date = Some(rehired);
    patch.salary = Some(60_000);
    let update = service.update_employee(&patch).unwrap().unwrap();

    let record = update.history.expect("job change writes history");
    assert_eq!(record.start_date, Some(hire_date()));
    assert_eq!(record.salary, Some(50_000));
    assert_eq!(record.job, Some(org.analyst.id));
    assert_eq!(update.employee.hire_date, Some(rehired));
    assert_eq!(update.employee.salary, Some(60_000));
}

#[test]
fn unchanged_or_absent_assignment_writes_no_history() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut same = EmployeePatch::for_employee(employee.id);
    same.job = Some(org.analyst.id);
    same.department = Some(org.sales.id);
    same.phone_number = Some("+84 555".to_string());
    let update = service.update_employee(&same).unwrap().unwrap();
    assert!(update.history.is_none());
    assert_eq!(update.employee.phone_number.as_deref(), Some("+84 555"));

    let mut absent = EmployeePatch::for_employee(employee.id);
    absent.salary = Some(55_000);
    let update = service.update_employee(&absent).unwrap().unwrap();
    assert!(update.history.is_none());

    assert_eq!(history_count(&conn), 0);
}

#[test]
fn department_transfer_captures_both_old_values() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.department = Some(org.support.id);
    let update = service.update_employee(&patch).unwrap().unwrap();

    let record = update.history.expect("department change writes history");
    assert_eq!(record.department, Some(org.sales.id));
    assert_eq!(record.job, Some(org.analyst.id));
    assert_eq!(record.start_date, Some(hire_date()));
    assert_eq!(record.salary, Some(50_000));
    assert_eq!(update.employee.department, Some(org.support.id));
    assert_eq!(update.employee.job, Some(org.analyst.id));
}

#[test]
fn job_and_department_changing_together_write_one_record() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    patch.department = Some(org.support.id);
    service.update_employee(&patch).unwrap().unwrap();

    assert_eq!(history_count(&conn), 1);
}

#[test]
fn absent_fields_keep_their_values() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.last_name = Some("King".to_string());
    patch.job = Some(org.senior_analyst.id);
    let updated = service.update_employee(&patch).unwrap().unwrap().employee;

    let expected = Employee {
        last_name: Some("King".to_string()),
        job: Some(org.senior_analyst.id),
        ..employee
    };
    assert_eq!(updated, expected);
    assert_eq!(service.get_employee(updated.id).unwrap(), Some(expected));
}

#[test]
fn unknown_employee_is_not_found_and_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);

    let mut patch = EmployeePatch::for_employee(EmployeeId(999));
    patch.job = Some(org.senior_analyst.id);
    patch.first_name = Some("Ghost".to_string());

    assert!(service.update_employee(&patch).unwrap().is_none());
    assert!(service.partial_update_employee(&EmployeePatch::for_employee(EmployeeId(999)))
        .unwrap()
        .is_none());
    assert_eq!(history_count(&conn), 0);
    let employees: i64 = conn
        .query_row("SELECT COUNT(*) FROM employees;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(employees, 0);
}

#[test]
fn reapplying_the_same_payload_writes_history_once() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    patch.department = Some(org.support.id);
    patch.salary = Some(70_000);

    let first = service.update_employee(&patch).unwrap().unwrap();
    let second = service.update_employee(&patch).unwrap().unwrap();

    assert!(first.history.is_some());
    assert!(second.history.is_none());
    assert_eq!(first.employee, second.employee);
    assert_eq!(history_count(&conn), 1);
}

#[test]
fn failed_employee_write_rolls_back_history() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.department = Some(DepartmentId(4242));
    let err = service.update_employee(&patch).unwrap_err();

    assert!(matches!(
        err,
        EmployeeServiceError::Store(RepoError::ReferenceNotFound {
            entity: "department",
            id: 4242
        })
    ));
    assert_eq!(history_count(&conn), 0);
    assert_eq!(service.get_employee(employee.id).unwrap(), Some(employee));
}

#[test]
fn missing_hire_date_keeps_history_start_open() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);

    let mut draft = NewEmployee::named("Joan", "Clarke");
    draft.job = Some(org.analyst.id);
    let employee = service.create_employee(&draft).unwrap();

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    let record = service
        .update_employee(&patch)
        .unwrap()
        .unwrap()
        .history
        .unwrap();

    assert_eq!(record.start_date, None);
    assert_eq!(record.end_date, now());
    assert_eq!(record.department, None);
}

#[test]
fn hire_date_after_now_rejects_assignment_change() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);

    let mut draft = NewEmployee::named("Future", "Hire");
    draft.hire_date = Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap());
    draft.job = Some(org.analyst.id);
    let employee = service.create_employee(&draft).unwrap();

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    let err = service.update_employee(&patch).unwrap_err();

    assert!(matches!(
        err,
        EmployeeServiceError::Validation(ModelValidationError::InvertedHistoryInterval { .. })
    ));
    assert_eq!(service.get_employee(employee.id).unwrap(), Some(employee));
}

#[test]
fn invalid_payload_is_rejected_before_lookup() {
    let conn = open_db_in_memory().unwrap();
    let service = service(&conn);

    let err = service
        .update_employee(&EmployeePatch {
            first_name: Some("NoId".to_string()),
            ..EmployeePatch::default()
        })
        .unwrap_err();
    assert!(matches!(err, EmployeeServiceError::MissingEmployeeId));

    let mut patch = EmployeePatch::for_employee(EmployeeId(999));
    patch.email = Some("broken".to_string());
    let err = service.update_employee(&patch).unwrap_err();
    assert!(matches!(
        err,
        EmployeeServiceError::Validation(ModelValidationError::InvalidEmail)
    ));
}

#[test]
fn partial_update_touches_profile_only() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.salary = Some(65_000);
    patch.commission_pct = Some(10);
    patch.hire_date = Some(now());
    let updated = service.partial_update_employee(&patch).unwrap().unwrap();

    assert_eq!(updated.salary, Some(65_000));
    assert_eq!(updated.commission_pct, Some(10));
    assert_eq!(updated.hire_date, Some(now()));
    assert_eq!(updated.job, employee.job);
    assert_eq!(updated.email, employee.email);
    assert_eq!(history_count(&conn), 0);
}

#[test]
fn partial_update_applies_profile_and_ignores_assignment() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);

    // Whole-record bodies carry the current assignment alongside the edit.
    let mut unchanged = EmployeePatch::for_employee(employee.id);
    unchanged.salary = Some(10);
    unchanged.job = employee.job;
    unchanged.department = employee.department;
    let updated = service.partial_update_employee(&unchanged).unwrap().unwrap();
    assert_eq!(updated.salary, Some(10));

    let mut moved = EmployeePatch::for_employee(employee.id);
    moved.phone_number = Some("+84 777".to_string());
    moved.job = Some(org.senior_analyst.id);
    moved.department = Some(org.support.id);
    let updated = service.partial_update_employee(&moved).unwrap().unwrap();

    assert_eq!(updated.phone_number.as_deref(), Some("+84 777"));
    assert_eq!(updated.job, Some(org.analyst.id));
    assert_eq!(updated.department, Some(org.sales.id));
    assert_eq!(service.get_employee(employee.id).unwrap(), Some(updated));
    assert_eq!(history_count(&conn), 0);
}

#[test]
fn employee_with_history_cannot_be_deleted() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let service = service(&conn);
    let employee = hire(&service, &org);
    let newcomer = service
        .create_employee(&NewEmployee::named("New", "Comer"))
        .unwrap();

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.department = Some(org.support.id);
    service.update_employee(&patch).unwrap();

    assert!(matches!(
        service.delete_employee(employee.id).unwrap_err(),
        EmployeeServiceError::EmployeeHasHistory {
            history_count: 1,
            ..
        }
    ));
    assert!(service.delete_employee(newcomer.id).unwrap());
    assert!(!service.delete_employee(newcomer.id).unwrap());
    assert_eq!(service.employee_history(employee.id).unwrap().len(), 1);
}

#[test]
fn configured_offset_clock_shifts_end_date() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let config = orgledger_core::CoreConfig::from_lookup(|name| {
        (name == "ORGLEDGER_END_DATE_OFFSET_HOURS").then(|| "7".to_string())
    })
    .unwrap();
    let service = EmployeeService::new(
        SqliteRecordStore::try_new(&conn).unwrap(),
        HistoryWriter::new(config.history_clock()),
    );

    let mut draft = NewEmployee::named("Ada", "Lovelace");
    draft.hire_date = Some(hire_date());
    draft.job = Some(org.analyst.id);
    let employee = service.create_employee(&draft).unwrap();

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    let before = Utc::now();
    let record = service
        .update_employee(&patch)
        .unwrap()
        .unwrap()
        .history
        .unwrap();
    let after = Utc::now();

    let shift = chrono::Duration::hours(7);
    let slack = chrono::Duration::seconds(1);
    assert!(record.end_date >= before - shift - slack);
    assert!(record.end_date <= after - shift + slack);
}

#[test]
fn configured_offset_clock_reassigns_same_day_hire() {
    let conn = open_db_in_memory().unwrap();
    let org = seed_org(&conn);
    let config = orgledger_core::CoreConfig::from_lookup(|name| {
        (name == "ORGLEDGER_END_DATE_OFFSET_HOURS").then(|| "7".to_string())
    })
    .unwrap();
    let service = EmployeeService::new(
        SqliteRecordStore::try_new(&conn).unwrap(),
        HistoryWriter::new(config.history_clock()),
    );

    let hired = DateTime::from_timestamp(Utc::now().timestamp() - 3600, 0).unwrap();
    let mut draft = NewEmployee::named("Same", "Day");
    draft.hire_date = Some(hired);
    draft.job = Some(org.analyst.id);
    let employee = service.create_employee(&draft).unwrap();

    let mut patch = EmployeePatch::for_employee(employee.id);
    patch.job = Some(org.senior_analyst.id);
    let update = service.update_employee(&patch).unwrap().unwrap();

    let record = update.history.expect("job change writes history");
    assert_eq!(record.start_date, Some(hired));
    assert_eq!(record.end_date, hired);
    assert_eq!(update.employee.job, Some(org.senior_analyst.id));
}

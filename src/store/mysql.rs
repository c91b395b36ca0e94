use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::MySqlPool;
use tracing::debug;

use super::{LeaveRevision, LeaveScope, Store};
use crate::error::{AppError, AppResult, classify_db_error};
use crate::model::{
    department::Department,
    employee::{Employee, EmployeeChanges, NewEmployee},
    leave_request::{LeaveRequest, LeaveRow, LeaveStatus, NewLeaveRequest},
    team::Team,
};
use crate::utils::db_utils::{build_update_sql, employee_columns, execute_update};

const EMPLOYEE_COLUMNS: &str = "id, first_name, last_name, email, password_hash, team_id, is_admin";
const LEAVE_COLUMNS: &str = "lr.id, lr.employee_id, lr.start_date, lr.end_date, lr.status, lr.reason";

const EMAIL_TAKEN: &str = "Email address is already registered.";
const LEAVE_DUPLICATE: &str = "A leave request for these dates already exists.";

pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }

    async fn fetch_leaves(&self, sql: &str, binds: LeaveBinds) -> AppResult<Vec<LeaveRequest>> {
        let mut query = sqlx::query_as::<_, LeaveRow>(sql);
        for id in binds.ids {
            query = query.bind(id);
        }
        for date in binds.dates {
            query = query.bind(date);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(LeaveRequest::try_from).collect()
    }
}

// Bind order for the leave queries: ids first, then dates.
#[derive(Default)]
struct LeaveBinds {
    ids: Vec<u64>,
    dates: Vec<NaiveDate>,
}

fn team_missing(team_id: u64) -> impl FnOnce() -> AppError {
    move || AppError::not_found(format!("Team ID {} does not exist.", team_id))
}

#[async_trait]
impl Store for MySqlStore {
    async fn insert_employee(&self, new: NewEmployee) -> AppResult<Employee> {
        let result = sqlx::query(
            r#"
            INSERT INTO employee
                (first_name, last_name, email, password_hash, team_id, is_admin)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&new.first_name)
        .bind(&new.last_name)
        .bind(&new.email)
        .bind(&new.password_hash)
        .bind(new.team_id)
        .bind(new.is_admin)
        .execute(&self.pool)
        .await
        .map_err(|e| classify_db_error(e, EMAIL_TAKEN, team_missing(new.team_id)))?;

        let id = result.last_insert_id();
        debug!(employee_id = id, "Employee row inserted");

        Ok(Employee {
            id,
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            team_id: new.team_id,
            is_admin: new.is_admin,
        })
    }

    async fn find_employee(&self, id: u64) -> AppResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employee WHERE id = ?", EMPLOYEE_COLUMNS);
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn find_employee_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        let sql = format!("SELECT {} FROM employee WHERE email = ?", EMPLOYEE_COLUMNS);
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(employee)
    }

    async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        let sql = format!("SELECT {} FROM employee ORDER BY id", EMPLOYEE_COLUMNS);
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> AppResult<Option<Employee>> {
        let team_id = changes.team_id;
        let mut tx = self.pool.begin().await?;

        if let Some(update) = build_update_sql("employee", employee_columns(changes), "id", id) {
            debug!(sql = %update.sql, employee_id = id, "Updating employee");
            execute_update(&mut tx, update).await.map_err(|e| {
                classify_db_error(e, EMAIL_TAKEN, team_missing(team_id.unwrap_or_default()))
            })?;
        }

        // rows_affected is 0 for unchanged values in MySQL, so re-read instead
        let sql = format!("SELECT {} FROM employee WHERE id = ?", EMPLOYEE_COLUMNS);
        let employee = sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(employee)
    }

    async fn set_admin(&self, id: u64, is_admin: bool) -> AppResult<bool> {
        let result = sqlx::query("UPDATE employee SET is_admin = ? WHERE id = ? AND is_admin <> ?")
            .bind(is_admin)
            .bind(id)
            .bind(is_admin)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() == 1)
    }

    async fn delete_employee(&self, id: u64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        let leaves = sqlx::query("DELETE FROM leave_request WHERE employee_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM employee WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        tx.commit().await?;
        debug!(
            employee_id = id,
            leave_requests = leaves.rows_affected(),
            "Employee deleted with leave requests"
        );
        Ok(true)
    }

    async fn insert_department(&self, name: &str) -> AppResult<Department> {
        let result = sqlx::query("INSERT INTO department (department_name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                classify_db_error(e, "Department name already exists.", || {
                    AppError::internal("unexpected foreign key on department insert")
                })
            })?;

        Ok(Department {
            id: result.last_insert_id(),
            department_name: name.to_string(),
        })
    }

    async fn find_department(&self, id: u64) -> AppResult<Option<Department>> {
        let department = sqlx::query_as::<_, Department>(
            "SELECT id, department_name FROM department WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(department)
    }

    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        let departments = sqlx::query_as::<_, Department>(
            "SELECT id, department_name FROM department ORDER BY department_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(departments)
    }

    async fn delete_department(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM department WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                classify_db_error(e, "Department name already exists.", || {
                    AppError::conflict(format!(
                        "Department ID {} still has teams; delete or move them first.",
                        id
                    ))
                })
            })?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_team(&self, name: &str, department_id: u64) -> AppResult<Team> {
        let result = sqlx::query("INSERT INTO team (team_name, department_id) VALUES (?, ?)")
            .bind(name)
            .bind(department_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                classify_db_error(e, "Team name already exists.", || {
                    AppError::not_found(format!(
                        "Department ID {} does not exist.",
                        department_id
                    ))
                })
            })?;

        Ok(Team {
            id: result.last_insert_id(),
            team_name: name.to_string(),
            department_id,
        })
    }

    async fn find_team(&self, id: u64) -> AppResult<Option<Team>> {
        let team = sqlx::query_as::<_, Team>(
            "SELECT id, team_name, department_id FROM team WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(team)
    }

    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        let teams = sqlx::query_as::<_, Team>(
            "SELECT id, team_name, department_id FROM team ORDER BY team_name ASC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(teams)
    }

    async fn delete_team(&self, id: u64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM team WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                classify_db_error(e, "Team name already exists.", || {
                    AppError::conflict(format!(
                        "Team ID {} still has employees; reassign or delete them first.",
                        id
                    ))
                })
            })?;
        Ok(result.rows_affected() == 1)
    }

    async fn insert_leave(&self, new: NewLeaveRequest) -> AppResult<LeaveRequest> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_request
                (employee_id, start_date, end_date, status, reason)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(new.employee_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .bind(LeaveStatus::Pending.as_ref())
        .bind(&new.reason)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            classify_db_error(e, LEAVE_DUPLICATE, || {
                AppError::not_found(format!("Employee ID {} not found.", new.employee_id))
            })
        })?;

        Ok(LeaveRequest {
            id: result.last_insert_id(),
            employee_id: new.employee_id,
            start_date: new.start_date,
            end_date: new.end_date,
            status: LeaveStatus::Pending,
            reason: new.reason,
        })
    }

    async fn find_leave(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        let sql = format!("SELECT {} FROM leave_request lr WHERE lr.id = ?", LEAVE_COLUMNS);
        let row = sqlx::query_as::<_, LeaveRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(LeaveRequest::try_from).transpose()
    }

    async fn list_leaves_for_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            "SELECT {} FROM leave_request lr WHERE lr.employee_id = ? ORDER BY lr.start_date, lr.id",
            LEAVE_COLUMNS
        );
        self.fetch_leaves(
            &sql,
            LeaveBinds {
                ids: vec![employee_id],
                ..Default::default()
            },
        )
        .await
    }

    async fn list_leaves_starting(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let sql = format!(
            r#"
            SELECT {}
            FROM leave_request lr
            WHERE lr.start_date >= ? AND lr.start_date < ?
            ORDER BY lr.start_date, lr.id
            "#,
            LEAVE_COLUMNS
        );
        self.fetch_leaves(
            &sql,
            LeaveBinds {
                dates: vec![from, until],
                ..Default::default()
            },
        )
        .await
    }

    async fn revise_pending_leave(
        &self,
        id: u64,
        owner_id: u64,
        revision: LeaveRevision,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_request
            SET start_date = ?, end_date = ?, reason = ?
            WHERE id = ?
            AND employee_id = ?
            AND status = ?
            "#,
        )
        .bind(revision.start_date)
        .bind(revision.end_date)
        .bind(&revision.reason)
        .bind(id)
        .bind(owner_id)
        .bind(LeaveStatus::Pending.as_ref())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            classify_db_error(e, LEAVE_DUPLICATE, || {
                AppError::internal("unexpected foreign key on leave update")
            })
        })?;

        // a no-op rewrite reports 0 rows in MySQL; confirm the row still qualifies
        if result.rows_affected() == 0 {
            let still_pending = sqlx::query_scalar::<_, i64>(
                "SELECT COUNT(*) FROM leave_request WHERE id = ? AND employee_id = ? AND status = ?",
            )
            .bind(id)
            .bind(owner_id)
            .bind(LeaveStatus::Pending.as_ref())
            .fetch_one(&self.pool)
            .await?;
            return Ok(still_pending == 1);
        }

        Ok(true)
    }

    async fn transition_leave(
        &self,
        id: u64,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> AppResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE leave_request
            SET status = ?
            WHERE id = ?
            AND status = ?
            "#,
        )
        .bind(to.as_ref())
        .bind(id)
        .bind(from.as_ref())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn approved_leaves(
        &self,
        scope: LeaveScope,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let (join, filter, scope_id) = match scope {
            LeaveScope::Employee(id) => ("", "lr.employee_id = ?", id),
            LeaveScope::Team(id) => (
                "JOIN employee e ON e.id = lr.employee_id",
                "e.team_id = ?",
                id,
            ),
            LeaveScope::Department(id) => (
                "JOIN employee e ON e.id = lr.employee_id JOIN team t ON t.id = e.team_id",
                "t.department_id = ?",
                id,
            ),
        };

        let sql = format!(
            r#"
            SELECT {}
            FROM leave_request lr
            {}
            WHERE {}
            AND lr.status = 'approved'
            AND lr.start_date BETWEEN ? AND ?
            ORDER BY lr.start_date, lr.id
            "#,
            LEAVE_COLUMNS, join, filter
        );

        self.fetch_leaves(
            &sql,
            LeaveBinds {
                ids: vec![scope_id],
                dates: vec![from, to],
            },
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::testing::days_from_today as day;

    struct Seed {
        department_id: u64,
        team_id: u64,
        employee_id: u64,
    }

    async fn seed(store: &MySqlStore) -> Seed {
        let department = store.insert_department("Engineering").await.unwrap();
        let team = store.insert_team("Platform", department.id).await.unwrap();
        let employee = store
            .insert_employee(employee("eve@x.com", team.id))
            .await
            .unwrap();
        Seed {
            department_id: department.id,
            team_id: team.id,
            employee_id: employee.id,
        }
    }

    fn employee(email: &str, team_id: u64) -> NewEmployee {
        NewEmployee {
            first_name: "Eve".into(),
            last_name: "Worker".into(),
            email: email.into(),
            password_hash: "hash".into(),
            team_id,
            is_admin: false,
        }
    }

    fn leave(employee_id: u64, start: i64, end: i64) -> NewLeaveRequest {
        NewLeaveRequest {
            employee_id,
            start_date: day(start),
            end_date: day(end),
            reason: Some("trip".into()),
        }
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires DATABASE_URL pointing at a MySQL server
    async fn status_change_is_compare_and_set(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let seed = seed(&store).await;
        let request = store.insert_leave(leave(seed.employee_id, 3, 4)).await.unwrap();

        assert!(
            store
                .transition_leave(request.id, LeaveStatus::Pending, LeaveStatus::Approved)
                .await
                .unwrap()
        );
        assert!(
            !store
                .transition_leave(request.id, LeaveStatus::Pending, LeaveStatus::Rejected)
                .await
                .unwrap()
        );

        let stored = store.find_leave(request.id).await.unwrap().unwrap();
        assert_eq!(stored.status, LeaveStatus::Approved);
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires DATABASE_URL pointing at a MySQL server
    async fn unchanged_revision_still_counts_as_applied(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let seed = seed(&store).await;
        let request = store.insert_leave(leave(seed.employee_id, 3, 4)).await.unwrap();

        let same = LeaveRevision {
            start_date: request.start_date,
            end_date: request.end_date,
            reason: request.reason.clone(),
        };
        assert!(
            store
                .revise_pending_leave(request.id, seed.employee_id, same.clone())
                .await
                .unwrap()
        );

        store
            .transition_leave(request.id, LeaveStatus::Pending, LeaveStatus::Cancelled)
            .await
            .unwrap();
        assert!(
            !store
                .revise_pending_leave(request.id, seed.employee_id, same)
                .await
                .unwrap()
        );
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires DATABASE_URL pointing at a MySQL server
    async fn unique_keys_surface_as_conflicts(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let seed = seed(&store).await;

        assert!(matches!(
            store.insert_employee(employee("eve@x.com", seed.team_id)).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            store.insert_department("Engineering").await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            store.insert_team("Platform", seed.department_id).await,
            Err(AppError::Conflict(_))
        ));

        store.insert_leave(leave(seed.employee_id, 3, 4)).await.unwrap();
        assert!(matches!(
            store.insert_leave(leave(seed.employee_id, 3, 4)).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires DATABASE_URL pointing at a MySQL server
    async fn missing_parents_surface_as_not_found(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let seed = seed(&store).await;

        assert!(matches!(
            store.insert_team("Orphans", seed.department_id + 100).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.insert_employee(employee("lost@x.com", seed.team_id + 100)).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            store.insert_leave(leave(seed.employee_id + 100, 3, 4)).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires DATABASE_URL pointing at a MySQL server
    async fn deletes_with_dependents_are_conflicts(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let seed = seed(&store).await;

        assert!(matches!(
            store.delete_department(seed.department_id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            store.delete_team(seed.team_id).await,
            Err(AppError::Conflict(_))
        ));
        assert!(!store.delete_team(seed.team_id + 100).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires DATABASE_URL pointing at a MySQL server
    async fn employee_delete_takes_leave_requests_along(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let seed = seed(&store).await;
        let request = store.insert_leave(leave(seed.employee_id, 3, 4)).await.unwrap();

        assert!(store.delete_employee(seed.employee_id).await.unwrap());
        assert!(store.find_leave(request.id).await.unwrap().is_none());
        assert!(store.find_employee(seed.employee_id).await.unwrap().is_none());
        assert!(!store.delete_employee(seed.employee_id).await.unwrap());

        // nothing references the team any more
        assert!(store.delete_team(seed.team_id).await.unwrap());
        assert!(store.delete_department(seed.department_id).await.unwrap());
    }

    #[sqlx::test(migrations = "./migrations")]
    #[ignore] // Requires DATABASE_URL pointing at a MySQL server
    async fn approved_leaves_follow_team_and_department(pool: MySqlPool) {
        let store = MySqlStore::new(pool);
        let seed = seed(&store).await;

        let other_department = store.insert_department("Sales").await.unwrap();
        let other_team = store.insert_team("Field", other_department.id).await.unwrap();
        let outsider = store
            .insert_employee(employee("sam@x.com", other_team.id))
            .await
            .unwrap();

        let mine = store.insert_leave(leave(seed.employee_id, 3, 4)).await.unwrap();
        let theirs = store.insert_leave(leave(outsider.id, 3, 4)).await.unwrap();
        let pending = store.insert_leave(leave(seed.employee_id, 6, 7)).await.unwrap();
        let far = store.insert_leave(leave(seed.employee_id, 40, 41)).await.unwrap();
        for id in [mine.id, theirs.id, far.id] {
            store
                .transition_leave(id, LeaveStatus::Pending, LeaveStatus::Approved)
                .await
                .unwrap();
        }

        for scope in [
            LeaveScope::Employee(seed.employee_id),
            LeaveScope::Team(seed.team_id),
            LeaveScope::Department(seed.department_id),
        ] {
            let found = store.approved_leaves(scope, day(0), day(30)).await.unwrap();
            let ids: Vec<u64> = found.iter().map(|l| l.id).collect();
            assert_eq!(ids, vec![mine.id], "{:?}", scope);
            assert!(!ids.contains(&pending.id));
        }

        let window = store.list_leaves_starting(day(0), day(10)).await.unwrap();
        assert_eq!(window.len(), 3);
    }
}

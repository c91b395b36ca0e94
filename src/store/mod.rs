//! Persistence port. Services only ever talk to `dyn Store`; uniqueness and
//! referential rules are enforced by the implementation, not by callers.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::AppResult;
use crate::model::{
    department::Department,
    employee::{Employee, EmployeeChanges, NewEmployee},
    leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest},
    team::Team,
};

#[cfg(test)]
pub mod memory;
pub mod mysql;

/// Whose leave a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeaveScope {
    Employee(u64),
    Team(u64),
    Department(u64),
}

/// New dates and reason for a pending request.
#[derive(Debug, Clone)]
pub struct LeaveRevision {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: Option<String>,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Conflict on a taken email, NotFound when the team does not exist.
    async fn insert_employee(&self, new: NewEmployee) -> AppResult<Employee>;
    async fn find_employee(&self, id: u64) -> AppResult<Option<Employee>>;
    async fn find_employee_by_email(&self, email: &str) -> AppResult<Option<Employee>>;
    async fn list_employees(&self) -> AppResult<Vec<Employee>>;
    /// Returns `None` when the employee does not exist.
    async fn update_employee(&self, id: u64, changes: EmployeeChanges)
    -> AppResult<Option<Employee>>;
    /// Flips the admin flag; `false` when no row was in the opposite state.
    async fn set_admin(&self, id: u64, is_admin: bool) -> AppResult<bool>;
    /// Deletes the employee and all of their leave requests atomically.
    async fn delete_employee(&self, id: u64) -> AppResult<bool>;

    async fn insert_department(&self, name: &str) -> AppResult<Department>;
    async fn find_department(&self, id: u64) -> AppResult<Option<Department>>;
    async fn list_departments(&self) -> AppResult<Vec<Department>>;
    /// Conflict while teams still reference the department.
    async fn delete_department(&self, id: u64) -> AppResult<bool>;

    /// Conflict on a taken name, NotFound when the department does not exist.
    async fn insert_team(&self, name: &str, department_id: u64) -> AppResult<Team>;
    async fn find_team(&self, id: u64) -> AppResult<Option<Team>>;
    async fn list_teams(&self) -> AppResult<Vec<Team>>;
    /// Conflict while employees still belong to the team.
    async fn delete_team(&self, id: u64) -> AppResult<bool>;

    /// Conflict on a duplicate (employee, start, end) tuple.
    async fn insert_leave(&self, new: NewLeaveRequest) -> AppResult<LeaveRequest>;
    async fn find_leave(&self, id: u64) -> AppResult<Option<LeaveRequest>>;
    async fn list_leaves_for_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>>;
    /// Requests whose start date lies in `[from, until)`.
    async fn list_leaves_starting(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>>;
    /// Rewrites a request only if it is still pending and owned by `owner_id`.
    async fn revise_pending_leave(
        &self,
        id: u64,
        owner_id: u64,
        revision: LeaveRevision,
    ) -> AppResult<bool>;
    /// Compare-and-set on the status column.
    async fn transition_leave(&self, id: u64, from: LeaveStatus, to: LeaveStatus)
    -> AppResult<bool>;
    /// Approved requests in `scope` whose start date lies in `[from, to]`.
    async fn approved_leaves(
        &self,
        scope: LeaveScope,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>>;
}

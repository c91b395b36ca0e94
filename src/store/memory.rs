//! In-memory `Store` for tests. Mirrors the schema's unique, foreign key and
//! restrict rules so services behave the same as against MySQL.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::NaiveDate;

use super::{LeaveRevision, LeaveScope, Store};
use crate::error::{AppError, AppResult};
use crate::model::{
    department::Department,
    employee::{Employee, EmployeeChanges, NewEmployee},
    leave_request::{LeaveRequest, LeaveStatus, NewLeaveRequest},
    team::Team,
};

#[derive(Default)]
struct Tables {
    next_id: u64,
    departments: BTreeMap<u64, Department>,
    teams: BTreeMap<u64, Team>,
    employees: BTreeMap<u64, Employee>,
    leaves: BTreeMap<u64, LeaveRequest>,
}

impl Tables {
    fn next_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    fn email_taken(&self, email: &str, except: Option<u64>) -> bool {
        self.employees
            .values()
            .any(|e| e.email == email && Some(e.id) != except)
    }

    fn leave_taken(&self, employee_id: u64, start: NaiveDate, end: NaiveDate, except: Option<u64>) -> bool {
        self.leaves.values().any(|l| {
            l.employee_id == employee_id
                && l.start_date == start
                && l.end_date == end
                && Some(l.id) != except
        })
    }

    fn in_scope(&self, leave: &LeaveRequest, scope: LeaveScope) -> bool {
        let employee = self.employees.get(&leave.employee_id);
        match scope {
            LeaveScope::Employee(id) => leave.employee_id == id,
            LeaveScope::Team(id) => employee.is_some_and(|e| e.team_id == id),
            LeaveScope::Department(id) => employee
                .and_then(|e| self.teams.get(&e.team_id))
                .is_some_and(|t| t.department_id == id),
        }
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.tables.lock().expect("memory store poisoned")
    }
}

fn sorted_leaves<'a>(leaves: impl Iterator<Item = &'a LeaveRequest>) -> Vec<LeaveRequest> {
    let mut out: Vec<LeaveRequest> = leaves.cloned().collect();
    out.sort_by_key(|l| (l.start_date, l.id));
    out
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert_employee(&self, new: NewEmployee) -> AppResult<Employee> {
        let mut t = self.lock();
        if t.email_taken(&new.email, None) {
            return Err(AppError::conflict("Email address is already registered."));
        }
        if !t.teams.contains_key(&new.team_id) {
            return Err(AppError::not_found(format!(
                "Team ID {} does not exist.",
                new.team_id
            )));
        }

        let employee = Employee {
            id: t.next_id(),
            first_name: new.first_name,
            last_name: new.last_name,
            email: new.email,
            password_hash: new.password_hash,
            team_id: new.team_id,
            is_admin: new.is_admin,
        };
        t.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn find_employee(&self, id: u64) -> AppResult<Option<Employee>> {
        Ok(self.lock().employees.get(&id).cloned())
    }

    async fn find_employee_by_email(&self, email: &str) -> AppResult<Option<Employee>> {
        Ok(self
            .lock()
            .employees
            .values()
            .find(|e| e.email == email)
            .cloned())
    }

    async fn list_employees(&self) -> AppResult<Vec<Employee>> {
        Ok(self.lock().employees.values().cloned().collect())
    }

    async fn update_employee(
        &self,
        id: u64,
        changes: EmployeeChanges,
    ) -> AppResult<Option<Employee>> {
        let mut t = self.lock();
        if !t.employees.contains_key(&id) {
            return Ok(None);
        }
        if let Some(email) = &changes.email {
            if t.email_taken(email, Some(id)) {
                return Err(AppError::conflict("Email address is already registered."));
            }
        }
        if let Some(team_id) = changes.team_id {
            if !t.teams.contains_key(&team_id) {
                return Err(AppError::not_found(format!(
                    "Team ID {} does not exist.",
                    team_id
                )));
            }
        }

        let Some(employee) = t.employees.get_mut(&id) else {
            return Ok(None);
        };
        if let Some(v) = changes.first_name {
            employee.first_name = v;
        }
        if let Some(v) = changes.last_name {
            employee.last_name = v;
        }
        if let Some(v) = changes.email {
            employee.email = v;
        }
        if let Some(v) = changes.password_hash {
            employee.password_hash = v;
        }
        if let Some(v) = changes.team_id {
            employee.team_id = v;
        }
        Ok(Some(employee.clone()))
    }

    async fn set_admin(&self, id: u64, is_admin: bool) -> AppResult<bool> {
        let mut t = self.lock();
        match t.employees.get_mut(&id) {
            Some(e) if e.is_admin != is_admin => {
                e.is_admin = is_admin;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_employee(&self, id: u64) -> AppResult<bool> {
        let mut t = self.lock();
        if t.employees.remove(&id).is_none() {
            return Ok(false);
        }
        t.leaves.retain(|_, l| l.employee_id != id);
        Ok(true)
    }

    async fn insert_department(&self, name: &str) -> AppResult<Department> {
        let mut t = self.lock();
        if t.departments.values().any(|d| d.department_name == name) {
            return Err(AppError::conflict("Department name already exists."));
        }
        let department = Department {
            id: t.next_id(),
            department_name: name.to_string(),
        };
        t.departments.insert(department.id, department.clone());
        Ok(department)
    }

    async fn find_department(&self, id: u64) -> AppResult<Option<Department>> {
        Ok(self.lock().departments.get(&id).cloned())
    }

    async fn list_departments(&self) -> AppResult<Vec<Department>> {
        let mut out: Vec<Department> = self.lock().departments.values().cloned().collect();
        out.sort_by(|a, b| a.department_name.cmp(&b.department_name));
        Ok(out)
    }

    async fn delete_department(&self, id: u64) -> AppResult<bool> {
        let mut t = self.lock();
        if !t.departments.contains_key(&id) {
            return Ok(false);
        }
        if t.teams.values().any(|team| team.department_id == id) {
            return Err(AppError::conflict(format!(
                "Department ID {} still has teams; delete or move them first.",
                id
            )));
        }
        t.departments.remove(&id);
        Ok(true)
    }

    async fn insert_team(&self, name: &str, department_id: u64) -> AppResult<Team> {
        let mut t = self.lock();
        if t.teams.values().any(|team| team.team_name == name) {
            return Err(AppError::conflict("Team name already exists."));
        }
        if !t.departments.contains_key(&department_id) {
            return Err(AppError::not_found(format!(
                "Department ID {} does not exist.",
                department_id
            )));
        }
        let team = Team {
            id: t.next_id(),
            team_name: name.to_string(),
            department_id,
        };
        t.teams.insert(team.id, team.clone());
        Ok(team)
    }

    async fn find_team(&self, id: u64) -> AppResult<Option<Team>> {
        Ok(self.lock().teams.get(&id).cloned())
    }

    async fn list_teams(&self) -> AppResult<Vec<Team>> {
        let mut out: Vec<Team> = self.lock().teams.values().cloned().collect();
        out.sort_by(|a, b| a.team_name.cmp(&b.team_name));
        Ok(out)
    }

    async fn delete_team(&self, id: u64) -> AppResult<bool> {
        let mut t = self.lock();
        if !t.teams.contains_key(&id) {
            return Ok(false);
        }
        if t.employees.values().any(|e| e.team_id == id) {
            return Err(AppError::conflict(format!(
                "Team ID {} still has employees; reassign or delete them first.",
                id
            )));
        }
        t.teams.remove(&id);
        Ok(true)
    }

    async fn insert_leave(&self, new: NewLeaveRequest) -> AppResult<LeaveRequest> {
        let mut t = self.lock();
        if t.leave_taken(new.employee_id, new.start_date, new.end_date, None) {
            return Err(AppError::conflict(
                "A leave request for these dates already exists.",
            ));
        }
        if !t.employees.contains_key(&new.employee_id) {
            return Err(AppError::not_found(format!(
                "Employee ID {} not found.",
                new.employee_id
            )));
        }
        let leave = LeaveRequest {
            id: t.next_id(),
            employee_id: new.employee_id,
            start_date: new.start_date,
            end_date: new.end_date,
            status: LeaveStatus::Pending,
            reason: new.reason,
        };
        t.leaves.insert(leave.id, leave.clone());
        Ok(leave)
    }

    async fn find_leave(&self, id: u64) -> AppResult<Option<LeaveRequest>> {
        Ok(self.lock().leaves.get(&id).cloned())
    }

    async fn list_leaves_for_employee(&self, employee_id: u64) -> AppResult<Vec<LeaveRequest>> {
        let t = self.lock();
        Ok(sorted_leaves(
            t.leaves.values().filter(|l| l.employee_id == employee_id),
        ))
    }

    async fn list_leaves_starting(
        &self,
        from: NaiveDate,
        until: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let t = self.lock();
        Ok(sorted_leaves(
            t.leaves
                .values()
                .filter(|l| l.start_date >= from && l.start_date < until),
        ))
    }

    async fn revise_pending_leave(
        &self,
        id: u64,
        owner_id: u64,
        revision: LeaveRevision,
    ) -> AppResult<bool> {
        let mut t = self.lock();
        let qualifies = t
            .leaves
            .get(&id)
            .is_some_and(|l| l.employee_id == owner_id && l.status == LeaveStatus::Pending);
        if !qualifies {
            return Ok(false);
        }
        if t.leave_taken(owner_id, revision.start_date, revision.end_date, Some(id)) {
            return Err(AppError::conflict(
                "A leave request for these dates already exists.",
            ));
        }
        if let Some(leave) = t.leaves.get_mut(&id) {
            leave.start_date = revision.start_date;
            leave.end_date = revision.end_date;
            leave.reason = revision.reason;
        }
        Ok(true)
    }

    async fn transition_leave(
        &self,
        id: u64,
        from: LeaveStatus,
        to: LeaveStatus,
    ) -> AppResult<bool> {
        let mut t = self.lock();
        match t.leaves.get_mut(&id) {
            Some(leave) if leave.status == from => {
                leave.status = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn approved_leaves(
        &self,
        scope: LeaveScope,
        from: NaiveDate,
        to: NaiveDate,
    ) -> AppResult<Vec<LeaveRequest>> {
        let t = self.lock();
        Ok(sorted_leaves(t.leaves.values().filter(|l| {
            l.status == LeaveStatus::Approved
                && l.start_date >= from
                && l.start_date <= to
                && t.in_scope(l, scope)
        })))
    }
}

//! Approved leave in an upcoming window, by employee, team or department.

use chrono::{Duration, NaiveDate};
use tracing::instrument;

use crate::error::{AppError, AppResult};
use crate::model::leave_request::LeaveRequest;
use crate::store::{LeaveScope, Store};

pub const DEFAULT_WINDOW_DAYS: u32 = 30;
pub const MAX_WINDOW_DAYS: u32 = 366;

/// `None` falls back to the default window.
pub fn window_days(requested: Option<u32>) -> AppResult<u32> {
    match requested {
        None => Ok(DEFAULT_WINDOW_DAYS),
        Some(days) if (1..=MAX_WINDOW_DAYS).contains(&days) => Ok(days),
        Some(_) => Err(AppError::validation(format!(
            "days must be between 1 and {}.",
            MAX_WINDOW_DAYS
        ))),
    }
}

async fn ensure_scope_exists(store: &dyn Store, scope: LeaveScope) -> AppResult<()> {
    let exists = match scope {
        LeaveScope::Employee(id) => store.find_employee(id).await?.is_some(),
        LeaveScope::Team(id) => store.find_team(id).await?.is_some(),
        LeaveScope::Department(id) => store.find_department(id).await?.is_some(),
    };

    if exists {
        return Ok(());
    }
    Err(AppError::not_found(match scope {
        LeaveScope::Employee(id) => format!("Employee ID {} not found.", id),
        LeaveScope::Team(id) => format!("Team ID {} not found.", id),
        LeaveScope::Department(id) => format!("Department ID {} not found.", id),
    }))
}

/// Approved requests starting in `[today, today + days]`. A scope with no
/// members or no leave yields an empty list.
#[instrument(name = "report_approved_leaves", skip(store))]
pub async fn approved_leaves(
    store: &dyn Store,
    scope: LeaveScope,
    today: NaiveDate,
    days: u32,
) -> AppResult<Vec<LeaveRequest>> {
    ensure_scope_exists(store, scope).await?;

    let until = today + Duration::days(i64::from(days));
    store.approved_leaves(scope, today, until).await
}

pub async fn for_employee(
    store: &dyn Store,
    employee_id: u64,
    today: NaiveDate,
    days: u32,
) -> AppResult<Vec<LeaveRequest>> {
    approved_leaves(store, LeaveScope::Employee(employee_id), today, days).await
}

pub async fn for_team(
    store: &dyn Store,
    team_id: u64,
    today: NaiveDate,
    days: u32,
) -> AppResult<Vec<LeaveRequest>> {
    approved_leaves(store, LeaveScope::Team(team_id), today, days).await
}

pub async fn for_department(
    store: &dyn Store,
    department_id: u64,
    today: NaiveDate,
    days: u32,
) -> AppResult<Vec<LeaveRequest>> {
    approved_leaves(store, LeaveScope::Department(department_id), today, days).await
}

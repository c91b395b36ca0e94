//! Leave request lifecycle: pending → approved | rejected | cancelled.
//!
//! Every status change goes through `Store::transition_leave`, a
//! compare-and-set on the current status, so two admins deciding the same
//! request cannot both win.

use chrono::NaiveDate;
use tracing::{info, instrument, warn};

use crate::auth::auth::{Access, AuthUser};
use crate::error::{AppError, AppResult};
use crate::model::leave_request::{
    CreateLeave, EditLeave, LeaveRequest, LeaveStatus, NewLeaveRequest,
};
use crate::store::{LeaveRevision, Store};

const NOT_FOUND: &str = "Leave request not found.";
pub const MAX_REASON_LEN: usize = 255;

fn validate_dates(start: NaiveDate, end: NaiveDate) -> AppResult<()> {
    if start > end {
        return Err(AppError::validation(
            "Start date must be before or the same as the end date.",
        ));
    }
    Ok(())
}

fn validate_not_past(start: NaiveDate, today: NaiveDate) -> AppResult<()> {
    if start < today {
        return Err(AppError::validation("Start date cannot be in the past."));
    }
    Ok(())
}

/// Blank reasons are stored as absent.
fn clean_reason(reason: Option<String>) -> AppResult<Option<String>> {
    let reason = reason
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());

    if reason.as_ref().is_some_and(|r| r.chars().count() > MAX_REASON_LEN) {
        return Err(AppError::validation(format!(
            "Reason must be at most {} characters.",
            MAX_REASON_LEN
        )));
    }
    Ok(reason)
}

/// `[first day of month, first day of next month)`.
pub fn month_window(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let invalid = || AppError::validation("Invalid month or year provided.");

    let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    let end = if month == 12 {
        year.checked_add(1)
            .and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1))
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .ok_or_else(invalid)?;

    Ok((start, end))
}

async fn find_owned(store: &dyn Store, caller: &AuthUser, id: u64) -> AppResult<LeaveRequest> {
    store
        .find_leave(id)
        .await?
        .filter(|l| l.employee_id == caller.employee_id)
        .ok_or_else(|| AppError::not_found(NOT_FOUND))
}

/// Explains why a guarded write touched nothing.
async fn explain_lost_race(store: &dyn Store, id: u64) -> AppError {
    match store.find_leave(id).await {
        Ok(Some(leave)) => {
            warn!(leave_id = id, status = %leave.status, "Leave request changed concurrently");
            AppError::invalid_transition(format!(
                "Leave request {} is already {}.",
                id, leave.status
            ))
        }
        Ok(None) => AppError::not_found(NOT_FOUND),
        Err(e) => e,
    }
}

async fn transition(
    store: &dyn Store,
    current: LeaveRequest,
    next: LeaveStatus,
) -> AppResult<LeaveRequest> {
    if !current.status.can_transition_to(next) {
        return Err(AppError::invalid_transition(format!(
            "Leave request {} is already {}; it cannot become {}.",
            current.id, current.status, next
        )));
    }

    if !store.transition_leave(current.id, current.status, next).await? {
        return Err(explain_lost_race(store, current.id).await);
    }

    info!(leave_id = current.id, from = %current.status, to = %next, "Leave status changed");
    Ok(LeaveRequest {
        status: next,
        ..current
    })
}

#[instrument(name = "leave_submit", skip(store, req), fields(employee_id = caller.employee_id))]
pub async fn submit(
    store: &dyn Store,
    caller: &AuthUser,
    req: CreateLeave,
    today: NaiveDate,
) -> AppResult<LeaveRequest> {
    validate_dates(req.start_date, req.end_date)?;
    validate_not_past(req.start_date, today)?;
    let reason = clean_reason(req.reason)?;

    let leave = store
        .insert_leave(NewLeaveRequest {
            employee_id: caller.employee_id,
            start_date: req.start_date,
            end_date: req.end_date,
            reason,
        })
        .await?;

    info!(leave_id = leave.id, email = %caller.email, "Leave request submitted");
    Ok(leave)
}

/// Owners see their own requests; admins see any.
pub async fn get(store: &dyn Store, caller: &AuthUser, id: u64) -> AppResult<LeaveRequest> {
    let leave = store
        .find_leave(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    caller.require(Access::Owner(leave.employee_id))?;
    Ok(leave)
}

/// Owner-only, and only while pending.
#[instrument(name = "leave_edit", skip(store, changes), fields(employee_id = caller.employee_id))]
pub async fn edit(
    store: &dyn Store,
    caller: &AuthUser,
    id: u64,
    changes: EditLeave,
    today: NaiveDate,
) -> AppResult<LeaveRequest> {
    let current = find_owned(store, caller, id).await?;

    if current.status.is_terminal() {
        return Err(AppError::invalid_transition(format!(
            "Leave request {} is already {}; only pending requests can be edited.",
            id, current.status
        )));
    }

    let start_date = changes.start_date.unwrap_or(current.start_date);
    let end_date = changes.end_date.unwrap_or(current.end_date);
    validate_dates(start_date, end_date)?;
    if changes.start_date.is_some() {
        validate_not_past(start_date, today)?;
    }

    let reason = match changes.reason {
        Some(r) => clean_reason(Some(r))?,
        None => current.reason.clone(),
    };

    let revision = LeaveRevision {
        start_date,
        end_date,
        reason: reason.clone(),
    };
    if !store
        .revise_pending_leave(id, caller.employee_id, revision)
        .await?
    {
        return Err(explain_lost_race(store, id).await);
    }

    info!(leave_id = id, "Leave request edited");
    Ok(LeaveRequest {
        start_date,
        end_date,
        reason,
        ..current
    })
}

/// Owner-only. The request is kept with status `cancelled`.
#[instrument(name = "leave_cancel", skip(store), fields(employee_id = caller.employee_id))]
pub async fn cancel(store: &dyn Store, caller: &AuthUser, id: u64) -> AppResult<LeaveRequest> {
    let current = find_owned(store, caller, id).await?;
    transition(store, current, LeaveStatus::Cancelled).await
}

#[instrument(name = "leave_decide", skip(store), fields(caller = caller.employee_id))]
async fn decide(
    store: &dyn Store,
    caller: &AuthUser,
    id: u64,
    decision: LeaveStatus,
) -> AppResult<LeaveRequest> {
    caller.require_admin()?;

    let current = store
        .find_leave(id)
        .await?
        .ok_or_else(|| AppError::not_found(NOT_FOUND))?;
    transition(store, current, decision).await
}

pub async fn approve(store: &dyn Store, caller: &AuthUser, id: u64) -> AppResult<LeaveRequest> {
    decide(store, caller, id, LeaveStatus::Approved).await
}

pub async fn reject(store: &dyn Store, caller: &AuthUser, id: u64) -> AppResult<LeaveRequest> {
    decide(store, caller, id, LeaveStatus::Rejected).await
}

pub async fn list_own(store: &dyn Store, caller: &AuthUser) -> AppResult<Vec<LeaveRequest>> {
    store.list_leaves_for_employee(caller.employee_id).await
}

/// Every request starting in the given calendar month. Admin-only.
pub async fn list_month(
    store: &dyn Store,
    caller: &AuthUser,
    year: i32,
    month: u32,
) -> AppResult<Vec<LeaveRequest>> {
    caller.require_admin()?;
    let (from, until) = month_window(year, month)?;
    store.list_leaves_starting(from, until).await
}

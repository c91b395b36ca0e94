//! Employee registration, login and account administration.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::{info, instrument};

use crate::auth::{
    auth::AuthUser,
    jwt::generate_access_token,
    password::{hash_password, verify_against_dummy, verify_password},
};
use crate::error::{AppError, AppResult};
use crate::model::employee::{
    AdminUpdate, Employee, EmployeeChanges, LoginRequest, NewEmployee, RegisterEmployee,
    SelfUpdate, Session,
};
use crate::store::Store;

pub const MIN_PASSWORD_LEN: usize = 6;
/// Column widths of `employees`.
pub const MAX_NAME_LEN: usize = 50;
pub const MAX_EMAIL_LEN: usize = 100;
const INVALID_CREDENTIALS: &str = "Invalid credentials";

const SELF_FIELDS: &[&str] = &["first_name", "last_name", "password"];
const ADMIN_FIELDS: &[&str] = &["first_name", "last_name", "email", "team_id"];

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\S+@\S+\.\S+$").unwrap());

pub fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn normalize_email(raw: &str) -> AppResult<String> {
    let email = raw.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AppError::validation("Invalid email format."));
    }
    if email.chars().count() > MAX_EMAIL_LEN {
        return Err(AppError::validation(format!(
            "email must be at most {} characters.",
            MAX_EMAIL_LEN
        )));
    }
    Ok(email)
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::validation(format!(
            "Password must be at least {} characters long.",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn required_name(field: &str, raw: &str) -> AppResult<String> {
    let value = raw.trim();
    if value.is_empty() {
        return Err(AppError::validation(format!("{} must not be empty.", field)));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters.",
            field, MAX_NAME_LEN
        )));
    }
    Ok(value.to_string())
}

/// Rejects any key outside `allowed` before the payload is interpreted.
fn reject_foreign_fields(payload: &Value, allowed: &[&str]) -> AppResult<()> {
    let obj = payload
        .as_object()
        .ok_or_else(|| AppError::validation("Payload must be a JSON object"))?;

    let mut foreign: Vec<&str> = obj
        .keys()
        .map(String::as_str)
        .filter(|k| !allowed.contains(k))
        .collect();

    if foreign.is_empty() {
        return Ok(());
    }

    foreign.sort_unstable();
    Err(AppError::ForbiddenField(format!(
        "Field(s) not allowed: {}. Allowed: {}.",
        foreign.join(", "),
        allowed.join(", ")
    )))
}

#[instrument(name = "identity_register", skip(store, req), fields(email = %req.email))]
pub async fn register(store: &dyn Store, req: RegisterEmployee) -> AppResult<Employee> {
    let first_name = required_name("first_name", &req.first_name)?;
    let last_name = required_name("last_name", &req.last_name)?;
    let email = normalize_email(&req.email)?;
    validate_password(&req.password)?;

    let password_hash = hash_password(&req.password)?;

    let employee = store
        .insert_employee(NewEmployee {
            first_name,
            last_name,
            email,
            password_hash,
            team_id: req.team_id,
            is_admin: req.is_admin.unwrap_or(false),
        })
        .await?;

    info!(employee_id = employee.id, "Employee registered");
    Ok(employee)
}

/// Unknown email and wrong password fail with the same message.
#[instrument(name = "identity_login", skip(store, secret, req), fields(email = %req.email))]
pub async fn authenticate(
    store: &dyn Store,
    secret: &str,
    ttl: usize,
    req: LoginRequest,
) -> AppResult<Session> {
    let email = req.email.trim().to_lowercase();

    let Some(employee) = store.find_employee_by_email(&email).await? else {
        verify_against_dummy(&req.password);
        info!("Invalid credentials: employee not found");
        return Err(AppError::auth(INVALID_CREDENTIALS));
    };

    if !verify_password(&req.password, &employee.password_hash) {
        info!(employee_id = employee.id, "Invalid credentials: password mismatch");
        return Err(AppError::auth(INVALID_CREDENTIALS));
    }

    let token = generate_access_token(employee.id, secret, ttl)?;

    info!(employee_id = employee.id, "Login successful");
    Ok(Session {
        email: employee.email,
        is_admin: employee.is_admin,
        token,
    })
}

/// Absent or null fields are left alone; a present but blank name is rejected.
#[instrument(name = "identity_update_self", skip(store, payload), fields(employee_id = caller.employee_id))]
pub async fn update_self(store: &dyn Store, caller: &AuthUser, payload: Value) -> AppResult<Employee> {
    reject_foreign_fields(&payload, SELF_FIELDS)?;
    let update: SelfUpdate =
        serde_json::from_value(payload).map_err(|e| AppError::validation(e.to_string()))?;

    let mut changes = EmployeeChanges::default();
    if let Some(v) = update.first_name {
        changes.first_name = Some(required_name("first_name", &v)?);
    }
    if let Some(v) = update.last_name {
        changes.last_name = Some(required_name("last_name", &v)?);
    }
    if let Some(p) = update.password {
        validate_password(&p)?;
        changes.password_hash = Some(hash_password(&p)?);
    }

    store
        .update_employee(caller.employee_id, changes)
        .await?
        .ok_or_else(|| AppError::not_found("Employee does not exist."))
}

#[instrument(name = "identity_admin_update", skip(store, payload), fields(caller = caller.employee_id))]
pub async fn admin_update(
    store: &dyn Store,
    caller: &AuthUser,
    target_id: u64,
    payload: Value,
) -> AppResult<Employee> {
    caller.require_admin()?;
    reject_foreign_fields(&payload, ADMIN_FIELDS)?;
    let update: AdminUpdate =
        serde_json::from_value(payload).map_err(|e| AppError::validation(e.to_string()))?;

    let changes = EmployeeChanges {
        first_name: update
            .first_name
            .map(|v| required_name("first_name", &v))
            .transpose()?,
        last_name: update
            .last_name
            .map(|v| required_name("last_name", &v))
            .transpose()?,
        email: update.email.map(|v| normalize_email(&v)).transpose()?,
        password_hash: None,
        team_id: update.team_id,
    };

    let employee = store
        .update_employee(target_id, changes)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Employee with id {} not found.", target_id)))?;

    info!(target_id, "Employee updated by admin");
    Ok(employee)
}

pub async fn list_employees(store: &dyn Store, caller: &AuthUser) -> AppResult<Vec<Employee>> {
    caller.require_admin()?;
    store.list_employees().await
}

/// Removes the employee together with their leave requests.
#[instrument(name = "identity_delete", skip(store), fields(caller = caller.employee_id))]
pub async fn delete_employee(store: &dyn Store, caller: &AuthUser, target_id: u64) -> AppResult<()> {
    caller.require_admin()?;

    if !store.delete_employee(target_id).await? {
        return Err(AppError::not_found(format!(
            "Employee with id {} not found.",
            target_id
        )));
    }

    info!(target_id, "Employee deleted");
    Ok(())
}

/// Grant or revoke admin rights. Asking for the current state is a conflict.
#[instrument(name = "identity_set_admin", skip(store), fields(caller = caller.employee_id))]
pub async fn set_admin(
    store: &dyn Store,
    caller: &AuthUser,
    target_id: u64,
    is_admin: bool,
) -> AppResult<()> {
    caller.require_admin()?;

    if store.set_admin(target_id, is_admin).await? {
        info!(target_id, is_admin, "Admin flag changed");
        return Ok(());
    }

    match store.find_employee(target_id).await? {
        None => Err(AppError::not_found(format!(
            "Employee with id {} not found.",
            target_id
        ))),
        Some(_) if is_admin => Err(AppError::conflict(format!(
            "Employee with id {} is already an admin.",
            target_id
        ))),
        Some(_) => Err(AppError::conflict(format!(
            "Employee with id {} is not an admin.",
            target_id
        ))),
    }
}

//! Departments and teams.

use tracing::{info, instrument};

use crate::auth::auth::AuthUser;
use crate::error::{AppError, AppResult};
use crate::model::{
    department::{Department, DepartmentWithTeams},
    team::{CreateTeam, Team},
};
use crate::store::Store;

/// Width of the department and team name columns.
pub const MAX_NAME_LEN: usize = 100;

fn required_name(field: &str, raw: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!("{} must not be empty.", field)));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{} must be at most {} characters.",
            field, MAX_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

#[instrument(name = "org_create_department", skip(store), fields(caller = caller.employee_id))]
pub async fn create_department(
    store: &dyn Store,
    caller: &AuthUser,
    name: &str,
) -> AppResult<Department> {
    caller.require_admin()?;
    let name = required_name("department_name", name)?;

    let department = store.insert_department(&name).await?;
    info!(department_id = department.id, "Department created");
    Ok(department)
}

/// Refused while the department still has teams.
#[instrument(name = "org_delete_department", skip(store), fields(caller = caller.employee_id))]
pub async fn delete_department(store: &dyn Store, caller: &AuthUser, id: u64) -> AppResult<()> {
    caller.require_admin()?;

    if !store.delete_department(id).await? {
        return Err(AppError::not_found(format!("Department ID {} not found.", id)));
    }

    info!(department_id = id, "Department deleted");
    Ok(())
}

#[instrument(name = "org_create_team", skip(store, req), fields(caller = caller.employee_id))]
pub async fn create_team(store: &dyn Store, caller: &AuthUser, req: CreateTeam) -> AppResult<Team> {
    caller.require_admin()?;

    let department_id = req
        .department_id
        .ok_or_else(|| AppError::validation("Department ID is required."))?;
    let name = required_name("team_name", &req.team_name)?;

    if store.find_department(department_id).await?.is_none() {
        return Err(AppError::not_found(format!(
            "Department ID {} does not exist.",
            department_id
        )));
    }

    let team = store.insert_team(&name, department_id).await?;
    info!(team_id = team.id, department_id, "Team created");
    Ok(team)
}

/// Refused while employees still belong to the team.
#[instrument(name = "org_delete_team", skip(store), fields(caller = caller.employee_id))]
pub async fn delete_team(store: &dyn Store, caller: &AuthUser, id: u64) -> AppResult<()> {
    caller.require_admin()?;

    if !store.delete_team(id).await? {
        return Err(AppError::not_found(format!("Team ID {} not found.", id)));
    }

    info!(team_id = id, "Team deleted");
    Ok(())
}

pub async fn list_departments(store: &dyn Store) -> AppResult<Vec<DepartmentWithTeams>> {
    let departments = store.list_departments().await?;
    let teams = store.list_teams().await?;

    Ok(departments
        .into_iter()
        .map(|d| DepartmentWithTeams {
            teams: teams
                .iter()
                .filter(|t| t.department_id == d.id)
                .cloned()
                .collect(),
            id: d.id,
            department_name: d.department_name,
        })
        .collect())
}

pub async fn list_teams(store: &dyn Store) -> AppResult<Vec<Team>> {
    store.list_teams().await
}

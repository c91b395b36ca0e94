use actix_web::{HttpResponse, Responder, web};

use crate::api::WindowQuery;
use crate::auth::auth::AuthUser;
use crate::service::{identity, leave, reporting, today};
use crate::store::Store;

#[utoipa::path(
    get,
    path = "/employee/list",
    responses(
        (status = 200, description = "All employees", body = [crate::model::employee::Employee]),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_employees(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    let employees = identity::list_employees(store.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(employees))
}

/// Upcoming approved leave of one employee.
#[utoipa::path(
    get,
    path = "/employee/{employee_id}",
    params(
        ("employee_id" = u64, Path, description = "Employee ID"),
        WindowQuery
    ),
    responses(
        (status = 200, description = "Approved leave starting within the window", body = [crate::model::leave_request::LeaveRequest]),
        (status = 400, description = "Window out of range"),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "error": "NotFoundError",
            "message": "Employee ID 999 not found."
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn employee_leaves(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    query: web::Query<WindowQuery>,
) -> actix_web::Result<impl Responder> {
    let leaves =
        reporting::for_employee(store.get_ref(), path.into_inner(), today(), query.days()?)
            .await?;
    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    get,
    path = "/employee/leaves/{year}/{month}",
    params(
        ("year" = i32, Path, description = "Calendar year", example = 2026),
        ("month" = u32, Path, description = "Month, 1-12", example = 1)
    ),
    responses(
        (status = 200, description = "Every leave request starting in the month", body = [crate::model::leave_request::LeaveRequest]),
        (status = 400, description = "Invalid month or year"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn monthly_leaves(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<(i32, u32)>,
) -> actix_web::Result<impl Responder> {
    let (year, month) = path.into_inner();
    let leaves = leave::list_month(store.get_ref(), &auth, year, month).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

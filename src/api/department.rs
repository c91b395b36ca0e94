use actix_web::{HttpResponse, Responder, web};
use serde_json::Value;

use crate::api::{WindowQuery, ack, parse_body};
use crate::auth::auth::AuthUser;
use crate::model::department::CreateDepartment;
use crate::service::{org, reporting, today};
use crate::store::Store;

#[utoipa::path(
    get,
    path = "/department/list",
    responses(
        (status = 200, description = "Departments with their teams, by name", body = [crate::model::department::DepartmentWithTeams]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn list_departments(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    let departments = org::list_departments(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(departments))
}

#[utoipa::path(
    post,
    path = "/department/add",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created", body = crate::model::department::Department),
        (status = 400, description = "Blank or duplicate name", body = Object, example = json!({
            "error": "ConflictError",
            "message": "Department name already exists."
        })),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn create_department(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payload: CreateDepartment = parse_body(body.into_inner())?;
    let department =
        org::create_department(store.get_ref(), &auth, &payload.department_name).await?;
    Ok(HttpResponse::Created().json(department))
}

#[utoipa::path(
    delete,
    path = "/department/delete/{department_id}",
    params(("department_id" = u64, Path, description = "Department ID")),
    responses(
        (status = 200, description = "Department deleted", body = crate::api::Ack),
        (status = 400, description = "Department still has teams"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn delete_department(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let department_id = path.into_inner();
    org::delete_department(store.get_ref(), &auth, department_id).await?;
    Ok(ack(format!("Department ID {} deleted.", department_id)))
}

#[utoipa::path(
    get,
    path = "/department/leaves/{department_id}",
    params(
        ("department_id" = u64, Path, description = "Department ID"),
        WindowQuery
    ),
    responses(
        (status = 200, description = "Approved leave starting within the window", body = [crate::model::leave_request::LeaveRequest]),
        (status = 400, description = "Window out of range"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Department"
)]
pub async fn department_leaves(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    query: web::Query<WindowQuery>,
) -> actix_web::Result<impl Responder> {
    let leaves =
        reporting::for_department(store.get_ref(), path.into_inner(), today(), query.days()?)
            .await?;
    Ok(HttpResponse::Ok().json(leaves))
}

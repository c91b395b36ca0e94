use actix_web::{HttpResponse, Responder, web};
use serde_json::Value;
use tracing::info;

use crate::api::ack;
use crate::auth::auth::AuthUser;
use crate::config::Config;
use crate::model::employee::{LoginRequest, RegisterEmployee};
use crate::service::identity;
use crate::store::Store;

// auth end points

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterEmployee,
    responses(
        (status = 201, description = "Employee registered", body = crate::model::employee::Employee),
        (status = 400, description = "Invalid payload or email already registered", body = Object, example = json!({
            "error": "ConflictError",
            "message": "Email address is already registered."
        })),
        (status = 404, description = "Team does not exist")
    ),
    tag = "Auth"
)]
pub async fn register(
    store: web::Data<dyn Store>,
    payload: web::Json<RegisterEmployee>,
) -> actix_web::Result<impl Responder> {
    let employee = identity::register(store.get_ref(), payload.into_inner()).await?;
    Ok(HttpResponse::Created().json(employee))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = crate::model::employee::Session),
        (status = 401, description = "Invalid credentials", body = Object, example = json!({
            "error": "AuthError",
            "message": "Invalid credentials"
        }))
    ),
    tag = "Auth"
)]
pub async fn login(
    store: web::Data<dyn Store>,
    config: web::Data<Config>,
    payload: web::Json<LoginRequest>,
) -> actix_web::Result<impl Responder> {
    info!("Login request received");

    let session = identity::authenticate(
        store.get_ref(),
        &config.jwt_secret,
        config.token_ttl,
        payload.into_inner(),
    )
    .await?;

    Ok(HttpResponse::Ok().json(session))
}

/// Update the caller's own name or password.
#[utoipa::path(
    put,
    path = "/auth/update",
    request_body = crate::model::employee::SelfUpdate,
    responses(
        (status = 200, description = "Employee updated", body = crate::model::employee::Employee),
        (status = 400, description = "Invalid value"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Payload contains a field employees may not change", body = Object, example = json!({
            "error": "ForbiddenFieldError",
            "message": "Field(s) not allowed: is_admin. Allowed: first_name, last_name, password."
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn update_self(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let employee = identity::update_self(store.get_ref(), &auth, body.into_inner()).await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    put,
    path = "/auth/update/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    request_body = crate::model::employee::AdminUpdate,
    responses(
        (status = 200, description = "Employee updated", body = crate::model::employee::Employee),
        (status = 400, description = "Invalid value or email taken"),
        (status = 403, description = "Not an admin, or a field admins may not change"),
        (status = 404, description = "Employee or team not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn admin_update(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    let employee =
        identity::admin_update(store.get_ref(), &auth, path.into_inner(), body.into_inner())
            .await?;
    Ok(HttpResponse::Ok().json(employee))
}

#[utoipa::path(
    delete,
    path = "/auth/delete/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee and their leave requests deleted", body = crate::api::Ack),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn delete(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    identity::delete_employee(store.get_ref(), &auth, employee_id).await?;
    Ok(ack(format!("Employee with id {} deleted.", employee_id)))
}

#[utoipa::path(
    post,
    path = "/auth/admin/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Admin rights granted", body = crate::api::Ack),
        (status = 400, description = "Already an admin"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn grant_admin(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    identity::set_admin(store.get_ref(), &auth, employee_id, true).await?;
    Ok(ack(format!("Employee with id {} is now an admin.", employee_id)))
}

#[utoipa::path(
    delete,
    path = "/auth/admin/{employee_id}",
    params(("employee_id" = u64, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Admin rights revoked", body = crate::api::Ack),
        (status = 400, description = "Not an admin"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Employee not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Auth"
)]
pub async fn revoke_admin(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let employee_id = path.into_inner();
    identity::set_admin(store.get_ref(), &auth, employee_id, false).await?;
    Ok(ack(format!("Employee with id {} is no longer an admin.", employee_id)))
}

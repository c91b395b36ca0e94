use actix_web::{HttpResponse, Responder, web};

use crate::auth::auth::AuthUser;
use crate::model::leave_request::{CreateLeave, EditLeave};
use crate::service::{leave, today};
use crate::store::Store;

/* =========================
Employee self-service
========================= */
#[utoipa::path(
    get,
    path = "/leave_request",
    responses(
        (status = 200, description = "The caller's leave requests, every status", body = [crate::model::leave_request::LeaveRequest]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_own(
    auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    let leaves = leave::list_own(store.get_ref(), &auth).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

#[utoipa::path(
    post,
    path = "/leave_request",
    request_body(
        content = CreateLeave,
        description = "Leave request payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave request submitted", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Invalid dates or duplicate request", body = Object, example = json!({
            "error": "ValidationError",
            "message": "Start date must be before or the same as the end date."
        })),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn submit(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    payload: web::Json<CreateLeave>,
) -> actix_web::Result<impl Responder> {
    let created = leave::submit(store.get_ref(), &auth, payload.into_inner(), today()).await?;
    Ok(HttpResponse::Created().json(created))
}

#[utoipa::path(
    get,
    path = "/leave_request/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request", body = crate::model::leave_request::LeaveRequest),
        (status = 403, description = "Neither the owner nor an admin"),
        (status = 404, description = "Leave request not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let found = leave::get(store.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(found))
}

#[utoipa::path(
    put,
    path = "/leave_request/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave request ID")),
    request_body = EditLeave,
    responses(
        (status = 200, description = "Leave request updated", body = crate::model::leave_request::LeaveRequest),
        (status = 400, description = "Invalid dates or duplicate request"),
        (status = 404, description = "No such request owned by the caller"),
        (status = 409, description = "Request already decided or cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn edit_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    payload: web::Json<EditLeave>,
) -> actix_web::Result<impl Responder> {
    let edited = leave::edit(
        store.get_ref(),
        &auth,
        path.into_inner(),
        payload.into_inner(),
        today(),
    )
    .await?;
    Ok(HttpResponse::Ok().json(edited))
}

#[utoipa::path(
    delete,
    path = "/leave_request/{leave_id}",
    params(("leave_id" = u64, Path, description = "Leave request ID")),
    responses(
        (status = 200, description = "Leave request cancelled; the record is kept", body = crate::model::leave_request::LeaveRequest),
        (status = 404, description = "No such request owned by the caller"),
        (status = 409, description = "Request already decided or cancelled")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn cancel_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let cancelled = leave::cancel(store.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(cancelled))
}

/* =========================
Admin decisions
========================= */
#[utoipa::path(
    post,
    path = "/leave_request/{leave_id}/approve",
    params(("leave_id" = u64, Path, description = "ID of the leave request to approve")),
    responses(
        (status = 200, description = "Leave approved", body = crate::model::leave_request::LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed", body = Object, example = json!({
            "error": "InvalidTransitionError",
            "message": "Leave request 1 is already approved; it cannot become approved."
        }))
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn approve_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let approved = leave::approve(store.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(approved))
}

#[utoipa::path(
    post,
    path = "/leave_request/{leave_id}/reject",
    params(("leave_id" = u64, Path, description = "ID of the leave request to reject")),
    responses(
        (status = 200, description = "Leave rejected", body = crate::model::leave_request::LeaveRequest),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave request not found"),
        (status = 409, description = "Leave request already processed")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn reject_leave(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let rejected = leave::reject(store.get_ref(), &auth, path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(rejected))
}

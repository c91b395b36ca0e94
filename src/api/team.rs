use actix_web::{HttpResponse, Responder, web};
use serde_json::Value;

use crate::api::{WindowQuery, ack, parse_body};
use crate::auth::auth::AuthUser;
use crate::model::team::CreateTeam;
use crate::service::{org, reporting, today};
use crate::store::Store;

#[utoipa::path(
    get,
    path = "/team/list",
    responses(
        (status = 200, description = "Teams ordered by name", body = [crate::model::team::Team]),
        (status = 401, description = "Unauthorized")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn list_teams(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
) -> actix_web::Result<impl Responder> {
    let teams = org::list_teams(store.get_ref()).await?;
    Ok(HttpResponse::Ok().json(teams))
}

#[utoipa::path(
    post,
    path = "/team/add",
    request_body = CreateTeam,
    responses(
        (status = 201, description = "Team created", body = crate::model::team::Team),
        (status = 400, description = "Missing department, blank or duplicate name"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Department not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn create_team(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    body: web::Json<Value>,
) -> actix_web::Result<impl Responder> {
    auth.require_admin()?;
    let payload: CreateTeam = parse_body(body.into_inner())?;
    let team = org::create_team(store.get_ref(), &auth, payload).await?;
    Ok(HttpResponse::Created().json(team))
}

#[utoipa::path(
    delete,
    path = "/team/delete/{team_id}",
    params(("team_id" = u64, Path, description = "Team ID")),
    responses(
        (status = 200, description = "Team deleted", body = crate::api::Ack),
        (status = 400, description = "Team still has employees"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn delete_team(
    auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
) -> actix_web::Result<impl Responder> {
    let team_id = path.into_inner();
    org::delete_team(store.get_ref(), &auth, team_id).await?;
    Ok(ack(format!("Team ID {} deleted.", team_id)))
}

#[utoipa::path(
    get,
    path = "/team/leaves/{team_id}",
    params(
        ("team_id" = u64, Path, description = "Team ID"),
        WindowQuery
    ),
    responses(
        (status = 200, description = "Approved leave starting within the window", body = [crate::model::leave_request::LeaveRequest]),
        (status = 400, description = "Window out of range"),
        (status = 404, description = "Team not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Team"
)]
pub async fn team_leaves(
    _auth: AuthUser,
    store: web::Data<dyn Store>,
    path: web::Path<u64>,
    query: web::Query<WindowQuery>,
) -> actix_web::Result<impl Responder> {
    let leaves =
        reporting::for_team(store.get_ref(), path.into_inner(), today(), query.days()?).await?;
    Ok(HttpResponse::Ok().json(leaves))
}

use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::{IntoParams, ToSchema};

use crate::auth::identity::TeamIdentity;
use crate::model::employee::Employee;
use crate::store::{Store, reconcile};

#[derive(Deserialize, IntoParams)]
pub struct RosterQuery {
    /// Team to list; ADMIN may omit to list everyone
    pub team: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct CreateEmployee {
    /// Required for ADMIN; other identities are pinned to their own team.
    #[schema(example = "Sede Norte")]
    pub team: Option<String>,
    #[schema(example = "Ana Torres")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "1032456789")]
    pub cedula: String,
}

/// A member row inside a team-replacement payload; the team comes from the
/// path.
#[derive(Deserialize, ToSchema)]
pub struct MemberRow {
    #[schema(example = "Ana Torres")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "1032456789")]
    pub cedula: String,
}

#[derive(Serialize, ToSchema)]
pub struct RosterListResponse {
    pub data: Vec<Employee>,
    #[schema(example = 1)]
    pub total: usize,
}

fn forbidden() -> actix_web::Error {
    actix_web::error::ErrorForbidden("Access key does not match the requested team")
}

fn store_failure(e: crate::store::StoreError, context: &str) -> actix_web::Error {
    error!(error = %e, context, "roster write failed");
    actix_web::error::ErrorInternalServerError("Internal Server Error")
}

/// List roster rows
#[utoipa::path(
    get,
    path = "/api/v1/roster",
    params(RosterQuery),
    responses(
        (status = 200, description = "Roster rows", body = RosterListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("api_key" = [])),
    tag = "Roster"
)]
pub async fn list_roster(
    identity: TeamIdentity,
    store: web::Data<Store>,
    query: web::Query<RosterQuery>,
) -> actix_web::Result<impl Responder> {
    let data = match &query.team {
        Some(team) => {
            if !identity.can_manage(team) {
                return Err(forbidden());
            }
            store.roster.team(team)
        }
        None if identity.is_admin => store.roster.load(),
        None => store.roster.team(&identity.team),
    };

    let total = data.len();
    Ok(HttpResponse::Ok().json(RosterListResponse { data, total }))
}

/// Add one employee
#[utoipa::path(
    post,
    path = "/api/v1/roster",
    request_body = CreateEmployee,
    responses(
        (status = 201, description = "Employee added", body = Object, example = json!({
            "message": "Employee added"
        })),
        (status = 200, description = "Employee already on the roster", body = Object, example = json!({
            "message": "Employee already on the roster"
        })),
        (status = 400, description = "Missing name"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Roster"
)]
pub async fn add_employee(
    identity: TeamIdentity,
    store: web::Data<Store>,
    payload: web::Json<CreateEmployee>,
) -> actix_web::Result<impl Responder> {
    let team = match payload.team.as_deref() {
        Some(team) if identity.can_manage(team) => team.to_string(),
        Some(_) => return Err(forbidden()),
        None if identity.is_admin => {
            return Err(actix_web::error::ErrorBadRequest(
                "Admin requests must name a team",
            ));
        }
        None => identity.team.clone(),
    };

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Employee name must not be empty"
        })));
    }

    let added = reconcile::merge_new_employee(&store.roster, &team, &payload.name, &payload.cedula)
        .map_err(|e| store_failure(e, "add_employee"))?;

    if added {
        Ok(HttpResponse::Created().json(json!({ "message": "Employee added" })))
    } else {
        Ok(HttpResponse::Ok().json(json!({ "message": "Employee already on the roster" })))
    }
}

/// Replace a team's members
///
/// Takes the complete desired member list; other teams' rows are untouched.
#[utoipa::path(
    put,
    path = "/api/v1/roster/{team}",
    params(("team", Path, description = "Team whose members are replaced")),
    request_body = Vec<MemberRow>,
    responses(
        (status = 200, description = "Team roster replaced", body = Object, example = json!({
            "message": "Team roster replaced",
            "count": 5
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Roster"
)]
pub async fn replace_team(
    identity: TeamIdentity,
    store: web::Data<Store>,
    path: web::Path<String>,
    payload: web::Json<Vec<MemberRow>>,
) -> actix_web::Result<impl Responder> {
    let team = path.into_inner();
    if !identity.can_manage(&team) {
        return Err(forbidden());
    }

    let mut employees: Vec<Employee> = store
        .roster
        .load()
        .into_iter()
        .filter(|e| e.team != team)
        .collect();
    let mut count = 0usize;
    for row in payload.iter().filter(|r| !r.name.trim().is_empty()) {
        employees.push(Employee {
            team: team.clone(),
            name: row.name.trim().to_string(),
            cedula: row.cedula.trim().to_string(),
        });
        count += 1;
    }

    store
        .roster
        .save(&employees)
        .map_err(|e| store_failure(e, "replace_team"))?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Team roster replaced",
        "count": count
    })))
}

/// Remove an employee
#[utoipa::path(
    delete,
    path = "/api/v1/roster/{team}/{name}",
    params(
        ("team", Path, description = "Team"),
        ("name", Path, description = "Employee name")
    ),
    responses(
        (status = 200, description = "Employee removed", body = Object, example = json!({
            "message": "Employee removed"
        })),
        (status = 404, description = "Employee not found", body = Object, example = json!({
            "message": "Employee not found"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Roster"
)]
pub async fn remove_employee(
    identity: TeamIdentity,
    store: web::Data<Store>,
    path: web::Path<(String, String)>,
) -> actix_web::Result<impl Responder> {
    let (team, name) = path.into_inner();
    if !identity.can_manage(&team) {
        return Err(forbidden());
    }

    let employees = store.roster.load();
    let kept: Vec<Employee> = employees
        .iter()
        .filter(|e| !(e.team == team && e.name == name))
        .cloned()
        .collect();

    if kept.len() == employees.len() {
        return Ok(HttpResponse::NotFound().json(json!({
            "message": "Employee not found"
        })));
    }

    store
        .roster
        .save(&kept)
        .map_err(|e| store_failure(e, "remove_employee"))?;

    Ok(HttpResponse::Ok().json(json!({ "message": "Employee removed" })))
}

use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};
use utoipa::{IntoParams, ToSchema};

use crate::auth::identity::{TeamIdentity, is_within_window};
use crate::model::attendance::{AttendanceRecord, Status};
use crate::model::employee::Employee;
use crate::store::{Store, reconcile};

/// One editable row of the daily form. Rows with an empty name are the
/// trailing blank line of the editor and are dropped, not rejected.
#[derive(Deserialize, ToSchema)]
pub struct SubmitRow {
    #[schema(example = "Ana Torres")]
    pub name: String,
    #[serde(default)]
    #[schema(example = "1032456789")]
    pub cedula: String,
    #[schema(example = "Presente")]
    pub status: Status,
    #[serde(default)]
    #[schema(example = "")]
    pub note: String,
    #[serde(default)]
    #[schema(example = "soportes/2024-01-01_Ana_Torres.pdf", nullable = true)]
    pub support_doc: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SubmitRequest {
    /// Required for ADMIN; other identities are pinned to their own team.
    #[schema(example = "Sede Norte")]
    pub team: Option<String>,
    /// Defaults to today, which is all the daily form ever submits.
    #[schema(example = "2024-01-01", value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    pub rows: Vec<SubmitRow>,
}

#[derive(Deserialize, IntoParams)]
pub struct PendingQuery {
    /// Team to reconcile; ADMIN must name one
    pub team: Option<String>,
    /// Defaults to today
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
}

#[derive(Deserialize, IntoParams)]
pub struct LedgerQuery {
    /// Filter by team; ADMIN may omit to see every team
    pub team: Option<String>,
    /// Inclusive start date
    #[param(value_type = Option<String>, format = "date")]
    pub from: Option<NaiveDate>,
    /// Inclusive end date
    #[param(value_type = Option<String>, format = "date")]
    pub to: Option<NaiveDate>,
}

#[derive(Serialize, ToSchema)]
pub struct PendingResponse {
    #[schema(example = "Sede Norte")]
    pub team: String,
    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub date: NaiveDate,
    pub data: Vec<Employee>,
}

#[derive(Serialize, ToSchema)]
pub struct LedgerListResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub total: usize,
}

/// Resolves which team a request acts on: admins say so explicitly, every
/// other identity is pinned to its own team.
fn resolve_team(identity: &TeamIdentity, requested: Option<&str>) -> actix_web::Result<String> {
    match requested {
        None if identity.is_admin => Err(actix_web::error::ErrorBadRequest(
            "Admin requests must name a team",
        )),
        None => Ok(identity.team.clone()),
        Some(team) if identity.can_manage(team) => Ok(team.to_string()),
        Some(_) => Err(actix_web::error::ErrorForbidden(
            "Access key does not match the requested team",
        )),
    }
}

/// Submit the daily attendance form
#[utoipa::path(
    post,
    path = "/api/v1/attendance",
    request_body = SubmitRequest,
    responses(
        (status = 200, description = "Attendance saved", body = Object, example = json!({
            "message": "Attendance saved",
            "count": 2
        })),
        (status = 400, description = "No usable rows in the submission"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Outside the team's allowed window"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Attendance"
)]
pub async fn submit(
    identity: TeamIdentity,
    store: web::Data<Store>,
    payload: web::Json<SubmitRequest>,
) -> actix_web::Result<impl Responder> {
    let team = resolve_team(&identity, payload.team.as_deref())?;

    let policies = store.policies.load();
    if !is_within_window(&policies, &identity.team, Local::now().time()) {
        return Ok(HttpResponse::Forbidden().json(json!({
            "message": "Submissions are closed for this team right now"
        })));
    }

    let date = payload.date.unwrap_or_else(|| Local::now().date_naive());

    let rows: Vec<&SubmitRow> = payload
        .rows
        .iter()
        .filter(|row| !row.name.trim().is_empty())
        .collect();
    if rows.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Nothing to save: every row is missing a name"
        })));
    }

    // names typed ad hoc into the form become roster rows, so tomorrow's
    // pending view knows about them
    for row in &rows {
        reconcile::merge_new_employee(&store.roster, &team, &row.name, &row.cedula).map_err(
            |e| {
                error!(error = %e, %team, "Failed to merge employee into roster");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            },
        )?;
    }

    let records: Vec<AttendanceRecord> = rows
        .iter()
        .map(|row| AttendanceRecord {
            date,
            team: team.clone(),
            name: row.name.trim().to_string(),
            cedula: row.cedula.trim().to_string(),
            status: row.status,
            note: row.note.clone(),
            support_doc: row.support_doc.clone(),
        })
        .collect();

    match store.ledger.append(&records) {
        Ok(count) => {
            info!(%team, %date, count, "attendance saved");
            Ok(HttpResponse::Ok().json(json!({
                "message": "Attendance saved",
                "count": count
            })))
        }
        Err(e) => {
            error!(error = %e, %team, "Failed to append attendance records");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Employees still without a record for the day
#[utoipa::path(
    get,
    path = "/api/v1/attendance/pending",
    params(PendingQuery),
    responses(
        (status = 200, description = "Employees still pending for the date", body = PendingResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("api_key" = [])),
    tag = "Attendance"
)]
pub async fn pending(
    identity: TeamIdentity,
    store: web::Data<Store>,
    query: web::Query<PendingQuery>,
) -> actix_web::Result<impl Responder> {
    let team = resolve_team(&identity, query.team.as_deref())?;
    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    let data = reconcile::pending_for(&store.roster, &store.ledger, &team, date);
    Ok(HttpResponse::Ok().json(PendingResponse { team, date, data }))
}

/// Ledger slice for the dashboard
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(LedgerQuery),
    responses(
        (status = 200, description = "Matching attendance records", body = LedgerListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("api_key" = [])),
    tag = "Attendance"
)]
pub async fn list_records(
    identity: TeamIdentity,
    store: web::Data<Store>,
    query: web::Query<LedgerQuery>,
) -> actix_web::Result<impl Responder> {
    // admins may view the whole ledger at once; teams only their own slice
    let team = match (&query.team, identity.is_admin) {
        (None, true) => None,
        (requested, _) => Some(resolve_team(&identity, requested.as_deref())?),
    };

    let data = store.ledger.slice(team.as_deref(), query.from, query.to);
    let total = data.len();
    Ok(HttpResponse::Ok().json(LedgerListResponse { data, total }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web::Data};
    use tempfile::TempDir;

    use crate::model::policy::{PolicySet, TeamPolicy};
    use crate::routes;

    fn test_config() -> crate::config::Config {
        crate::config::Config {
            server_addr: "127.0.0.1:0".to_string(),
            data_dir: String::new(),
            rate_login_per_min: 60,
            rate_protected_per_min: 1000,
            api_prefix: "/api/v1".to_string(),
        }
    }

    fn seeded_store(dir: &TempDir) -> Store {
        let store = crate::store::init_store(dir.path());

        let mut policies = PolicySet::new();
        policies.insert("A".to_string(), TeamPolicy::open("key-a"));
        store.policies.save(&policies).unwrap();

        store
            .roster
            .save(&[
                Employee {
                    team: "A".to_string(),
                    name: "Ana".to_string(),
                    cedula: "100".to_string(),
                },
                Employee {
                    team: "A".to_string(),
                    name: "Luis".to_string(),
                    cedula: String::new(),
                },
            ])
            .unwrap();
        store
    }

    fn with_peer(req: test::TestRequest) -> test::TestRequest {
        req.peer_addr("127.0.0.1:9999".parse().unwrap())
    }

    #[actix_web::test]
    async fn submit_removes_employee_from_pending() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .configure(|cfg| routes::configure(cfg, test_config())),
        )
        .await;

        let req = with_peer(test::TestRequest::post().uri("/api/v1/attendance"))
            .insert_header(("X-Access-Key", "key-a"))
            .set_json(serde_json::json!({
                "date": "2024-01-01",
                "rows": [
                    {"name": "Ana", "status": "Presente", "note": ""},
                    {"name": "", "status": "Presente"}
                ]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let req = with_peer(test::TestRequest::get()
            .uri("/api/v1/attendance/pending?date=2024-01-01"))
            .insert_header(("X-Access-Key", "key-a"))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, ["Luis"]);
    }

    #[actix_web::test]
    async fn ad_hoc_name_joins_the_roster() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let roster = store.roster.clone();
        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .configure(|cfg| routes::configure(cfg, test_config())),
        )
        .await;

        let req = with_peer(test::TestRequest::post().uri("/api/v1/attendance"))
            .insert_header(("X-Access-Key", "key-a"))
            .set_json(serde_json::json!({
                "date": "2024-01-01",
                "rows": [{"name": "Nueva Persona", "cedula": "777", "status": "Tarde"}]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        assert!(
            roster
                .team("A")
                .iter()
                .any(|e| e.name == "Nueva Persona" && e.cedula == "777")
        );
    }

    #[actix_web::test]
    async fn unknown_key_is_unauthorized() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .configure(|cfg| routes::configure(cfg, test_config())),
        )
        .await;

        let req = with_peer(test::TestRequest::get().uri("/api/v1/attendance/pending"))
            .insert_header(("X-Access-Key", "wrong"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn team_cannot_read_another_teams_slice() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir);
        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .configure(|cfg| routes::configure(cfg, test_config())),
        )
        .await;

        let req = with_peer(test::TestRequest::get().uri("/api/v1/attendance?team=B"))
            .insert_header(("X-Access-Key", "key-a"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }
}

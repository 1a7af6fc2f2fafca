use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use tracing::{error, warn};
use utoipa::ToSchema;

use crate::auth::identity::TeamIdentity;
use crate::model::attendance::AttendanceRecord;
use crate::model::policy::PolicySet;
use crate::store::Store;

/// The complete desired end state of the ledger. The correction editor
/// submits everything it wants kept; whatever it dropped is gone, with the
/// one-generation `.bak` as the only way back.
#[derive(Deserialize, ToSchema)]
pub struct OverwriteRequest {
    pub records: Vec<AttendanceRecord>,
}

/// Replace the whole ledger (correction flow)
#[utoipa::path(
    post,
    path = "/api/v1/admin/ledger",
    request_body = OverwriteRequest,
    responses(
        (status = 200, description = "Ledger replaced", body = Object, example = json!({
            "message": "Ledger replaced",
            "count": 41
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Admin"
)]
pub async fn overwrite_ledger(
    identity: TeamIdentity,
    store: web::Data<Store>,
    payload: web::Json<OverwriteRequest>,
) -> actix_web::Result<impl Responder> {
    identity.require_admin()?;

    match store.ledger.overwrite_all(&payload.records) {
        Ok(()) => {
            warn!(count = payload.records.len(), "ledger replaced by admin");
            Ok(HttpResponse::Ok().json(json!({
                "message": "Ledger replaced",
                "count": payload.records.len()
            })))
        }
        Err(e) => {
            error!(error = %e, "Failed to overwrite ledger");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Purge the ledger
#[utoipa::path(
    delete,
    path = "/api/v1/admin/ledger",
    responses(
        (status = 200, description = "Ledger purged", body = Object, example = json!({
            "message": "Ledger purged"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Admin"
)]
pub async fn purge_ledger(
    identity: TeamIdentity,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    identity.require_admin()?;

    match store.ledger.purge() {
        Ok(()) => {
            warn!("ledger purged by admin");
            Ok(HttpResponse::Ok().json(json!({ "message": "Ledger purged" })))
        }
        Err(e) => {
            error!(error = %e, "Failed to purge ledger");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

/// Current access policies
#[utoipa::path(
    get,
    path = "/api/v1/admin/policies",
    responses(
        (status = 200, description = "Policies keyed by team", body = Object, example = json!({
            "ADMIN": {"password": "Admin26", "inicio": "00:00", "fin": "23:59"},
            "Sede Norte": {"password": "norte2024", "inicio": "06:00", "fin": "22:00"}
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only")
    ),
    security(("api_key" = [])),
    tag = "Admin"
)]
pub async fn get_policies(
    identity: TeamIdentity,
    store: web::Data<Store>,
) -> actix_web::Result<impl Responder> {
    identity.require_admin()?;
    Ok(HttpResponse::Ok().json(store.policies.load()))
}

/// Replace the access policies
///
/// The ADMIN entry is re-inserted if the payload dropped it.
#[utoipa::path(
    put,
    path = "/api/v1/admin/policies",
    request_body = Object,
    responses(
        (status = 200, description = "Policies saved", body = Object, example = json!({
            "message": "Policies saved",
            "count": 3
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Admin only"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Admin"
)]
pub async fn update_policies(
    identity: TeamIdentity,
    store: web::Data<Store>,
    payload: web::Json<PolicySet>,
) -> actix_web::Result<impl Responder> {
    identity.require_admin()?;

    match store.policies.save(&payload) {
        Ok(()) => {
            let count = store.policies.load().len();
            Ok(HttpResponse::Ok().json(json!({
                "message": "Policies saved",
                "count": count
            })))
        }
        Err(e) => {
            error!(error = %e, "Failed to save policies");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, test, web::Data};
    use tempfile::TempDir;

    use crate::auth::identity::MASTER_KEY;
    use crate::model::attendance::Status;
    use crate::model::policy::{ADMIN_TEAM, TeamPolicy};
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

    fn record(date: &str, team: &str, name: &str) -> AttendanceRecord {
        AttendanceRecord {
            date: date.parse().unwrap(),
            team: team.to_string(),
            name: name.to_string(),
            cedula: String::new(),
            status: Status::Present,
            note: String::new(),
            support_doc: None,
        }
    }

    fn with_peer(req: test::TestRequest) -> test::TestRequest {
        req.peer_addr("127.0.0.1:9999".parse().unwrap())
    }

    #[actix_web::test]
    async fn overwrite_requires_admin() {
        let dir = TempDir::new().unwrap();
        let store = crate::store::init_store(dir.path());
        let mut policies = store.policies.load();
        policies.insert("A".to_string(), TeamPolicy::open("key-a"));
        store.policies.save(&policies).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .configure(|cfg| routes::configure(cfg, test_config())),
        )
        .await;

        let req = with_peer(test::TestRequest::post().uri("/api/v1/admin/ledger"))
            .insert_header(("X-Access-Key", "key-a"))
            .set_json(serde_json::json!({ "records": [] }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::FORBIDDEN);
    }

    #[actix_web::test]
    async fn master_key_replaces_ledger_and_keeps_backup() {
        let dir = TempDir::new().unwrap();
        let store = crate::store::init_store(dir.path());
        store
            .ledger
            .append(&[
                record("2024-01-01", "A", "Ana"),
                record("2024-01-01", "A", "Luis"),
            ])
            .unwrap();
        let ledger = store.ledger.clone();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .configure(|cfg| routes::configure(cfg, test_config())),
        )
        .await;

        // the corrected end state no longer carries the Luis row
        let req = with_peer(test::TestRequest::post().uri("/api/v1/admin/ledger"))
            .insert_header(("X-Access-Key", MASTER_KEY))
            .set_json(serde_json::json!({
                "records": [{
                    "date": "2024-01-01",
                    "team": "A",
                    "name": "Ana",
                    "status": "Presente"
                }]
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let names: Vec<String> = ledger.load().into_iter().map(|r| r.name).collect();
        assert_eq!(names, ["Ana"]);

        let backup =
            std::fs::read_to_string(crate::store::guard::backup_path(ledger.path())).unwrap();
        assert!(backup.contains("Luis"));
    }

    #[actix_web::test]
    async fn policy_editor_round_trips_and_reinserts_admin() {
        let dir = TempDir::new().unwrap();
        let store = crate::store::init_store(dir.path());
        let policies_store = store.policies.clone();

        let app = test::init_service(
            App::new()
                .app_data(Data::new(store))
                .configure(|cfg| routes::configure(cfg, test_config())),
        )
        .await;

        // payload without an ADMIN entry
        let req = with_peer(test::TestRequest::put().uri("/api/v1/admin/policies"))
            .insert_header(("X-Access-Key", MASTER_KEY))
            .set_json(serde_json::json!({
                "Sede Norte": {"password": "norte2024", "inicio": "06:00", "fin": "22:00"}
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let saved = policies_store.load();
        assert!(saved.contains_key(ADMIN_TEAM));
        assert_eq!(saved["Sede Norte"].fin, "22:00");

        let req = with_peer(test::TestRequest::get().uri("/api/v1/admin/policies"))
            .insert_header(("X-Access-Key", MASTER_KEY))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["Sede Norte"]["password"], "norte2024");
    }
}

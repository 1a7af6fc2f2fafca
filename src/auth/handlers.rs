use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde_json::json;
use tracing::info;

use crate::auth::identity::{authenticate, is_within_window};
use crate::models::LoginReq;
use crate::store::Store;

/// Credential probe
///
/// Not a session: clients keep sending the key on every request. This just
/// tells them up front which team the key maps to and whether the team's
/// window is currently open.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReq,
    responses(
        (status = 200, description = "Key accepted", body = Object, example = json!({
            "team": "Sede Norte",
            "is_admin": false,
            "within_window": true
        })),
        (status = 401, description = "Unknown access key", body = Object, example = json!({
            "error": "Invalid access key"
        }))
    ),
    tag = "Auth"
)]
pub async fn login(store: web::Data<Store>, payload: web::Json<LoginReq>) -> impl Responder {
    let policies = store.policies.load();

    match authenticate(&policies, payload.access_key.trim()) {
        Some(identity) => {
            let within = is_within_window(&policies, &identity.team, Local::now().time());
            info!(team = %identity.team, "access key accepted");
            HttpResponse::Ok().json(json!({
                "team": identity.team,
                "is_admin": identity.is_admin,
                "within_window": within
            }))
        }
        None => HttpResponse::Unauthorized().json(json!({
            "error": "Invalid access key"
        })),
    }
}

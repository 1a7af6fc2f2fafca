use actix_web::{HttpResponse, Responder, web};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tracing::error;
use utoipa::IntoParams;

use crate::auth::identity::TeamIdentity;
use crate::store::{Store, StoreError};

#[derive(Deserialize, IntoParams)]
pub struct UploadQuery {
    /// Defaults to today
    #[param(value_type = Option<String>, format = "date")]
    pub date: Option<NaiveDate>,
    /// Employee the document belongs to
    pub name: String,
    /// png, jpg, jpeg, or pdf
    pub ext: String,
}

/// Upload a support document
///
/// Raw body upload. The response carries the relative path to put into the
/// submitted row's `support_doc`.
#[utoipa::path(
    put,
    path = "/api/v1/documents",
    params(UploadQuery),
    request_body(content = Vec<u8>, content_type = "application/octet-stream"),
    responses(
        (status = 200, description = "Document stored", body = Object, example = json!({
            "support_doc": "soportes/2024-01-01_Ana_Torres.pdf"
        })),
        (status = 400, description = "Empty body or unsupported extension"),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(("api_key" = [])),
    tag = "Documents"
)]
pub async fn upload(
    _identity: TeamIdentity,
    store: web::Data<Store>,
    query: web::Query<UploadQuery>,
    body: web::Bytes,
) -> actix_web::Result<impl Responder> {
    if body.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Empty upload"
        })));
    }
    if query.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Employee name must not be empty"
        })));
    }

    let date = query.date.unwrap_or_else(|| Local::now().date_naive());

    match store
        .documents
        .save_document(date, &query.name, &query.ext, &body)
    {
        Ok(path) => Ok(HttpResponse::Ok().json(json!({ "support_doc": path }))),
        Err(StoreError::UnsupportedExtension(ext)) => {
            Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Unsupported document extension \"{ext}\"")
            })))
        }
        Err(e) => {
            error!(error = %e, "Failed to store support document");
            Err(actix_web::error::ErrorInternalServerError(
                "Internal Server Error",
            ))
        }
    }
}

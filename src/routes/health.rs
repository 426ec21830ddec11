use actix_web::{get, http::StatusCode, Responder};
use chrono::Utc;
use serde_json::json;

use crate::routes::respond;

/// Health check endpoint
///
/// Returns the current status of the API and timestamp.
#[get("/health")]
pub async fn health() -> impl Responder {
    respond(
        StatusCode::OK,
        json!({
            "state": "ok",
            "timestamp": Utc::now()
        }),
    )
}

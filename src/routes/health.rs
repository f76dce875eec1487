use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::config::get_config;

#[axum::debug_handler]
pub async fn health() -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "store": get_config().store_backend.as_str(),
    });
    (StatusCode::OK, Json(body))
}

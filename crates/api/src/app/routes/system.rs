use axum::{Json, extract::Extension, http::StatusCode, response::IntoResponse};

use crate::context::ClaimsContext;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// GET /whoami - echo the caller's validated identity.
pub async fn whoami(Extension(context): Extension<ClaimsContext>) -> impl IntoResponse {
    Json(serde_json::json!({
        "name": context.principal_name(),
        "roles": context.claims().roles(),
    }))
}

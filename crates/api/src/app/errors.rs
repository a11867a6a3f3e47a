use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use keyforge_accounts::AccountError;
use keyforge_auth::TokenError;
use keyforge_core::DomainError;

pub fn account_error_to_response(err: AccountError) -> axum::response::Response {
    match err {
        AccountError::Domain(e) => domain_error_to_response(e),
        AccountError::Token(e) => token_error_to_response(e),
    }
}

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    match err {
        DomainError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg)
        }
        DomainError::Validation(msg) => {
            json_error(StatusCode::BAD_REQUEST, "validation_error", msg)
        }
        DomainError::InvalidId(msg) => json_error(StatusCode::BAD_REQUEST, "invalid_id", msg),
        // Absent principals/roles surface as rejected requests, matching the
        // original API's 400 responses.
        DomainError::NotFound(msg) => json_error(StatusCode::BAD_REQUEST, "not_found", msg),
        DomainError::Unauthenticated => json_error(
            StatusCode::UNAUTHORIZED,
            "unauthenticated",
            DomainError::Unauthenticated.to_string(),
        ),
    }
}

pub fn token_error_to_response(err: TokenError) -> axum::response::Response {
    match err {
        TokenError::Configuration(msg) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "configuration_error", msg)
        }
        TokenError::InvalidArgument(msg) => {
            json_error(StatusCode::BAD_REQUEST, "invalid_argument", msg)
        }
        TokenError::SignatureInvalid
        | TokenError::Malformed
        | TokenError::IssuerMismatch
        | TokenError::AudienceMismatch
        | TokenError::Expired => {
            json_error(StatusCode::UNAUTHORIZED, "invalid_token", err.to_string())
        }
    }
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

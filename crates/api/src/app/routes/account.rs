//! Account endpoints: login/register, the role catalog, user roles and
//! claims, role claims, and the user listing.
//!
//! Bulk endpoints return HTTP 200 with a per-item outcome list; callers must
//! inspect the entries rather than assume every item succeeded.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use serde_json::json;

use keyforge_auth::roles;

use crate::app::{AppServices, dto, errors};
use crate::context::ClaimsContext;
use crate::guards::{self, policy_names};

// ─────────────────────────────────────────────────────────────────────────────
// Router
// ─────────────────────────────────────────────────────────────────────────────

/// Routes requiring a validated bearer token. Login/register are wired
/// separately, outside the auth middleware.
pub fn router() -> Router {
    Router::new()
        .route(
            "/roles",
            get(get_roles).post(add_roles).delete(delete_roles),
        )
        .route(
            "/user-roles",
            get(get_user_roles)
                .post(add_user_roles)
                .delete(delete_user_roles),
        )
        .route(
            "/user-claims",
            get(get_user_claims)
                .post(add_user_claims)
                .delete(delete_user_claims),
        )
        .route(
            "/role-claims",
            get(get_role_claims)
                .post(add_role_claims)
                .delete(delete_role_claims),
        )
        .route("/users", get(get_users))
}

// ─────────────────────────────────────────────────────────────────────────────
// Login / Register
// ─────────────────────────────────────────────────────────────────────────────

/// POST /api/account/login
pub async fn login(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::LoginRequest>,
) -> axum::response::Response {
    match services.accounts.login(&body.email, &body.password) {
        Ok(token) => (StatusCode::OK, Json(json!({ "token": token }))).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// POST /api/account/register
pub async fn register(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::RegisterRequest>,
) -> axum::response::Response {
    if body.password != body.confirm_password {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "validation_error",
            "passwords do not match",
        );
    }

    match services.accounts.register(&body.email, &body.password) {
        Ok(principal) => (
            StatusCode::OK,
            Json(json!({ "id": principal.id, "email": principal.email })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role catalog
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/account/roles
pub async fn get_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::ADMIN]) {
        return resp;
    }

    (
        StatusCode::OK,
        Json(json!({ "roles": services.accounts.roles() })),
    )
        .into_response()
}

/// POST /api/account/roles
pub async fn add_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(new_roles): Json<Vec<String>>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::ADMIN]) {
        return resp;
    }

    match services.accounts.create_roles(&new_roles) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/account/roles
///
/// Roles absent from the catalog are skipped without an output entry.
pub async fn delete_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(role_names): Json<Vec<String>>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::SUPER_ADMIN]) {
        return resp;
    }

    match services.accounts.delete_roles(&role_names) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User roles
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/account/user-roles?email=
pub async fn get_user_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EmailQuery>,
) -> axum::response::Response {
    if query.email.is_empty() {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_argument",
            "email cannot be empty",
        );
    }

    match services.accounts.principal_roles(&query.email) {
        Ok(user_roles) => (
            StatusCode::OK,
            Json(json!({ "email": query.email, "roles": user_roles })),
        )
            .into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// POST /api/account/user-roles
pub async fn add_user_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(body): Json<dto::ManageUserRolesRequest>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::ADMIN]) {
        return resp;
    }

    match services.accounts.add_user_roles(&body.email, &body.roles) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/account/user-roles
pub async fn delete_user_roles(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(body): Json<dto::ManageUserRolesRequest>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_policy(
        &services.policies,
        policy_names::CAN_DELETE_USER_ROLES,
        &context,
    ) {
        return resp;
    }

    match services.accounts.remove_user_roles(&body.email, &body.roles) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// User claims
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/account/user-claims?email=
pub async fn get_user_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::EmailQuery>,
) -> axum::response::Response {
    match services.accounts.principal_claims(&query.email) {
        Ok(claims) => (StatusCode::OK, Json(claims)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// POST /api/account/user-claims
pub async fn add_user_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(body): Json<dto::ManageUserClaimsRequest>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::ADMIN]) {
        return resp;
    }

    let claims = dto::claims_from_map(&body.claims);
    match services.accounts.add_user_claims(&body.email, &claims) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/account/user-claims
pub async fn delete_user_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(body): Json<dto::ManageUserClaimsRequest>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::SUPER_ADMIN]) {
        return resp;
    }

    let claims = dto::claims_from_map(&body.claims);
    match services.accounts.remove_user_claims(&body.email, &claims) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Role claims
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/account/role-claims
pub async fn get_role_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::ADMIN]) {
        return resp;
    }

    let catalog: Vec<_> = services
        .accounts
        .role_claim_catalog()
        .into_iter()
        .map(|(role, claims)| json!({ "role": role, "claims": claims }))
        .collect();

    (StatusCode::OK, Json(catalog)).into_response()
}

/// POST /api/account/role-claims
pub async fn add_role_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(body): Json<dto::ManageRoleClaimsRequest>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::ADMIN]) {
        return resp;
    }

    let claims = dto::claims_from_map(&body.claims);
    match services.accounts.add_role_claims(body.role_id, &claims) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

/// DELETE /api/account/role-claims
pub async fn delete_role_claims(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
    Json(body): Json<dto::ManageRoleClaimsRequest>,
) -> axum::response::Response {
    if let Err(resp) = guards::require_any_role(&context, &[roles::ADMIN]) {
        return resp;
    }

    let claims = dto::claims_from_map(&body.claims);
    match services.accounts.remove_role_claims(body.role_id, &claims) {
        Ok(outcomes) => (StatusCode::OK, Json(outcomes)).into_response(),
        Err(e) => errors::account_error_to_response(e),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Users
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/account/users
pub async fn get_users(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(context): Extension<ClaimsContext>,
) -> axum::response::Response {
    if let Err(resp) =
        guards::require_policy(&services.policies, policy_names::CAN_VIEW_USERS, &context)
    {
        return resp;
    }

    let users: Vec<_> = services
        .accounts
        .principals()
        .into_iter()
        .map(|p| json!({ "id": p.id, "email": p.email }))
        .collect();

    (StatusCode::OK, Json(json!({ "users": users }))).into_response()
}

//! HTTP API application wiring (Axum router + service wiring).
//!
//! This folder is structured like:
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{
    Extension, Router,
    routing::{get, post},
};

use keyforge_accounts::AccountService;
use keyforge_auth::{Policy, PolicyRegistry, TokenConfig, TokenFactory, TokenValidator, roles};
use keyforge_infra::{Directory, InMemoryCredentials, InMemoryDirectory};

use crate::guards::{app_claims, policy_names};
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;

/// Shared services available to every handler.
pub struct AppServices {
    pub accounts: AccountService,
    pub policies: PolicyRegistry,
}

/// Build the full HTTP router (public entrypoint used by `main.rs` and the
/// black-box tests).
pub fn build_app(config: TokenConfig) -> Router {
    let directory = Arc::new(InMemoryDirectory::new());
    seed_builtin_roles(directory.as_ref());

    let credentials = Arc::new(InMemoryCredentials::new());
    let accounts = AccountService::new(directory, credentials, TokenFactory::new(config.clone()));

    let services = Arc::new(AppServices {
        accounts,
        policies: default_policies(),
    });

    let auth_state = middleware::AuthState {
        validator: Arc::new(TokenValidator::new(config)),
    };

    // Login/register stay outside the auth middleware; everything else on
    // the account surface requires a validated bearer token.
    let account = Router::new()
        .route("/login", post(routes::account::login))
        .route("/register", post(routes::account::register))
        .layer(Extension(services.clone()))
        .merge(
            routes::account::router()
                .layer(Extension(services.clone()))
                .layer(axum::middleware::from_fn_with_state(
                    auth_state.clone(),
                    middleware::auth_middleware,
                )),
        );

    let whoami = Router::new()
        .route("/whoami", get(routes::system::whoami))
        .layer(axum::middleware::from_fn_with_state(
            auth_state,
            middleware::auth_middleware,
        ));

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api/account", account)
        .merge(whoami)
}

/// The immutable policy registry, built once at startup.
fn default_policies() -> PolicyRegistry {
    PolicyRegistry::builder()
        .policy(
            policy_names::CAN_DELETE_USER_ROLES,
            Policy::require_claim(app_claims::CAN_DELETE_USER_ROLES, "true"),
        )
        .policy(
            policy_names::CAN_VIEW_USERS,
            Policy::require_role([roles::ADMIN]),
        )
        .build()
}

fn seed_builtin_roles(directory: &dyn Directory) {
    for role in [
        roles::NORMAL_USER,
        roles::ADMIN,
        roles::SUPER_ADMIN,
        roles::DEV,
    ] {
        let outcome = directory.create_role(role);
        if !outcome.succeeded {
            tracing::warn!(role, errors = ?outcome.errors, "failed to seed built-in role");
        }
    }
}

//! Route-level authorization guards.
//!
//! Guards run inside handlers, after the auth middleware has attached the
//! request's [`ClaimsContext`]. A guard failure is an authorization outcome
//! and maps to 403; only a policy name missing from the registry is treated
//! as a server fault.

use axum::http::StatusCode;
use axum::response::Response;

use keyforge_auth::{Decision, PolicyError, PolicyRegistry};

use crate::app::errors;
use crate::context::ClaimsContext;

/// Policy names resolved against the process-wide registry at startup.
pub mod policy_names {
    pub const CAN_DELETE_USER_ROLES: &str = "canDeleteUserRoles";
    pub const CAN_VIEW_USERS: &str = "canViewUsers";
}

/// Claim types consulted by the built-in policies.
pub mod app_claims {
    pub const CAN_DELETE_USER_ROLES: &str = "can-delete-user-roles";
}

/// Allow the request iff the caller holds any one of `allowed` (logical OR,
/// case-sensitive exact match).
pub fn require_any_role(context: &ClaimsContext, allowed: &[&str]) -> Result<(), Response> {
    if context.claims().has_any_role(allowed) {
        return Ok(());
    }

    Err(errors::json_error(
        StatusCode::FORBIDDEN,
        "forbidden",
        format!("requires any of roles: {}", allowed.join(", ")),
    ))
}

/// Allow the request iff the named policy evaluates to `Allow`.
pub fn require_policy(
    policies: &PolicyRegistry,
    name: &str,
    context: &ClaimsContext,
) -> Result<(), Response> {
    match policies.evaluate(name, context.claims()) {
        Ok(Decision::Allow) => Ok(()),
        Ok(Decision::Deny) => Err(errors::json_error(
            StatusCode::FORBIDDEN,
            "forbidden",
            format!("policy '{name}' denied the request"),
        )),
        Err(PolicyError::UnknownPolicy(name)) => {
            tracing::error!(policy = %name, "route references an unregistered policy");
            Err(errors::json_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                "policy_misconfigured",
                format!("policy '{name}' is not registered"),
            ))
        }
    }
}

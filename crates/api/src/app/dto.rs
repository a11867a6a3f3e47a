use std::collections::BTreeMap;

use serde::Deserialize;

use keyforge_auth::Claim;
use keyforge_core::RoleId;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

#[derive(Debug, Deserialize)]
pub struct EmailQuery {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ManageUserRolesRequest {
    pub email: String,
    pub roles: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct ManageUserClaimsRequest {
    pub email: String,
    pub claims: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub struct ManageRoleClaimsRequest {
    pub role_id: RoleId,
    pub claims: BTreeMap<String, String>,
}

/// Map a request's claim dictionary to domain claims, preserving key order.
pub fn claims_from_map(claims: &BTreeMap<String, String>) -> Vec<Claim> {
    claims
        .iter()
        .map(|(claim_type, value)| Claim::new(claim_type.clone(), value.clone()))
        .collect()
}

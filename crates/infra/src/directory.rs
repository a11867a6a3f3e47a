//! Directory store and credential verifier interfaces.
//!
//! These traits are the boundary to durable storage. They are synchronous
//! and object-safe; implementations may block the calling worker while
//! awaiting IO. Every mutation returns one stable tagged shape,
//! [`MutationOutcome`], so callers depend on a single result contract rather
//! than per-backend result classes.

use serde::{Deserialize, Serialize};

use keyforge_auth::Claim;
use keyforge_core::{PrincipalId, RoleId};

/// A stored account identity.
///
/// The account name is the email; the normalized name (uppercased) is the
/// uniqueness key. The credential hash is owned by the verifier and never
/// appears on this record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    pub id: PrincipalId,
    pub name: String,
    pub email: String,
    pub normalized_name: String,
}

/// A role catalog entry. Name uniqueness is case-insensitive — the
/// normalized (uppercased) form is the comparison key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRecord {
    pub id: RoleId,
    pub name: String,
    pub normalized_name: String,
}

/// Uniform result of a store mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationOutcome {
    pub succeeded: bool,
    pub errors: Vec<String>,
}

impl MutationOutcome {
    pub fn ok() -> Self {
        Self {
            succeeded: true,
            errors: Vec::new(),
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            errors: vec![error.into()],
        }
    }

    pub fn failed_with(errors: Vec<String>) -> Self {
        Self {
            succeeded: false,
            errors,
        }
    }
}

/// Lookup and mutation of principals, roles, claims, and role membership.
pub trait Directory: Send + Sync {
    // Principals
    fn find_principal_by_name(&self, name: &str) -> Option<Principal>;
    fn list_principals(&self) -> Vec<Principal>;
    fn create_principal(&self, email: &str) -> MutationOutcome;

    /// Role names held by the principal. Unordered set semantics.
    fn principal_roles(&self, principal: &Principal) -> Vec<String>;
    fn principal_claims(&self, principal: &Principal) -> Vec<Claim>;

    // Role catalog
    fn role_exists(&self, name: &str) -> bool;
    fn find_role_by_name(&self, name: &str) -> Option<RoleRecord>;
    fn find_role_by_id(&self, id: RoleId) -> Option<RoleRecord>;
    fn list_roles(&self) -> Vec<RoleRecord>;
    fn create_role(&self, name: &str) -> MutationOutcome;
    fn delete_role(&self, role: &RoleRecord) -> MutationOutcome;
    fn role_claims(&self, role: &RoleRecord) -> Vec<Claim>;

    // Membership and claims
    fn add_role_to_principal(&self, principal: &Principal, role_name: &str) -> MutationOutcome;
    fn remove_role_from_principal(
        &self,
        principal: &Principal,
        role_name: &str,
    ) -> MutationOutcome;
    fn add_claim_to_principal(&self, principal: &Principal, claim: &Claim) -> MutationOutcome;
    fn remove_claim_from_principal(
        &self,
        principal: &Principal,
        claim: &Claim,
    ) -> MutationOutcome;
    fn add_claim_to_role(&self, role: &RoleRecord, claim: &Claim) -> MutationOutcome;
    fn remove_claim_from_role(&self, role: &RoleRecord, claim: &Claim) -> MutationOutcome;
}

/// Confirms a principal's password.
///
/// Hashing and comparison internals belong to the implementation; the core
/// never sees credential material beyond this boundary.
pub trait CredentialVerifier: Send + Sync {
    /// Record a credential at registration time.
    fn store(&self, principal_name: &str, password: &str);

    fn verify(&self, principal_name: &str, password: &str) -> bool;
}

/// Normalization applied to principal and role names before uniqueness
/// comparison.
pub fn normalize(name: &str) -> String {
    name.trim().to_uppercase()
}

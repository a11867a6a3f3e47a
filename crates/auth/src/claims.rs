use serde::{Deserialize, Serialize};

/// A single `(type, value)` assertion attached to a principal or role.
///
/// Claims are plain immutable pairs; there is no hierarchy. The same pair may
/// be attached to many holders — each attachment is a separate record owned
/// by exactly one holder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Claim {
    #[serde(rename = "type")]
    pub claim_type: String,
    pub value: String,
}

impl Claim {
    pub fn new(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }
}

impl core::fmt::Display for Claim {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}={}", self.claim_type, self.value)
    }
}

/// Claim types synthesized into every minted token.
pub mod claim_types {
    /// The principal's account name.
    pub const NAME: &str = "name";

    /// The principal's email. The account name is derived from the email, so
    /// both claims carry the same value.
    pub const EMAIL: &str = "email";

    /// One entry per role held by the principal at mint time.
    pub const ROLE: &str = "role";
}

/// Claim set reconstructed from a verified token.
///
/// Preserves the payload's claim order, including duplicates — the factory
/// emits the union of stored and synthesized claims without collapsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedClaims {
    claims: Vec<Claim>,
}

impl ValidatedClaims {
    pub fn new(claims: Vec<Claim>) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &[Claim] {
        &self.claims
    }

    pub fn into_claims(self) -> Vec<Claim> {
        self.claims
    }

    /// Values of all `role` claims, in payload order.
    pub fn roles(&self) -> Vec<&str> {
        self.claims
            .iter()
            .filter(|c| c.claim_type == claim_types::ROLE)
            .map(|c| c.value.as_str())
            .collect()
    }

    /// Value of the first `name` claim, if present.
    pub fn name(&self) -> Option<&str> {
        self.claims
            .iter()
            .find(|c| c.claim_type == claim_types::NAME)
            .map(|c| c.value.as_str())
    }

    /// Case-sensitive exact role membership check.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles().contains(&role)
    }

    /// Whether any of `roles` is held (logical OR, case-sensitive).
    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|r| self.has_role(r))
    }

    pub fn has_claim(&self, claim_type: &str, value: &str) -> bool {
        self.claims
            .iter()
            .any(|c| c.claim_type == claim_type && c.value == value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ValidatedClaims {
        ValidatedClaims::new(vec![
            Claim::new("department", "engineering"),
            Claim::new(claim_types::NAME, "ada@example.com"),
            Claim::new(claim_types::EMAIL, "ada@example.com"),
            Claim::new(claim_types::ROLE, "Admin"),
            Claim::new(claim_types::ROLE, "Dev"),
        ])
    }

    #[test]
    fn roles_are_extracted_in_order() {
        assert_eq!(sample().roles(), vec!["Admin", "Dev"]);
    }

    #[test]
    fn role_check_is_case_sensitive() {
        let claims = sample();
        assert!(claims.has_role("Admin"));
        assert!(!claims.has_role("admin"));
        assert!(claims.has_any_role(&["SuperAdmin", "Dev"]));
        assert!(!claims.has_any_role(&["SuperAdmin", "Normal User"]));
    }

    #[test]
    fn name_and_claim_lookup() {
        let claims = sample();
        assert_eq!(claims.name(), Some("ada@example.com"));
        assert!(claims.has_claim("department", "engineering"));
        assert!(!claims.has_claim("department", "sales"));
    }
}

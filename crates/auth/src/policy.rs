//! Named authorization policies evaluated over validated claim sets.
//!
//! Policies are registered once at process start into an immutable registry;
//! evaluation is a side-effect-free predicate check. A claim set lacking the
//! required evidence is **denied**, not errored — that is an authorization
//! outcome, not a fault.

use std::collections::HashMap;

use thiserror::Error;

use crate::claims::ValidatedClaims;

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }
}

/// A registered predicate over a claim set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Policy {
    /// Allow iff the claim set holds a `role` claim whose value is one of the
    /// allowed names (case-sensitive exact match, logical OR).
    RequireRole(Vec<String>),

    /// Allow iff the claim set holds a claim of this type with exactly this
    /// value.
    RequireClaim { claim_type: String, value: String },
}

impl Policy {
    pub fn require_role<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::RequireRole(allowed.into_iter().map(Into::into).collect())
    }

    pub fn require_claim(claim_type: impl Into<String>, value: impl Into<String>) -> Self {
        Self::RequireClaim {
            claim_type: claim_type.into(),
            value: value.into(),
        }
    }

    pub fn evaluate(&self, claims: &ValidatedClaims) -> Decision {
        let allowed = match self {
            Policy::RequireRole(roles) => roles.iter().any(|r| claims.has_role(r)),
            Policy::RequireClaim { claim_type, value } => claims.has_claim(claim_type, value),
        };

        if allowed { Decision::Allow } else { Decision::Deny }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    /// The routing layer referenced a policy name that was never registered.
    #[error("unknown policy '{0}'")]
    UnknownPolicy(String),
}

/// Immutable name → policy mapping, built once at startup.
#[derive(Debug, Clone, Default)]
pub struct PolicyRegistry {
    policies: HashMap<String, Policy>,
}

impl PolicyRegistry {
    pub fn builder() -> PolicyRegistryBuilder {
        PolicyRegistryBuilder::new()
    }

    pub fn get(&self, name: &str) -> Option<&Policy> {
        self.policies.get(name)
    }

    /// Evaluate the named policy. Unknown names are an error — policy names
    /// are process-wide configuration and must resolve at startup.
    pub fn evaluate(&self, name: &str, claims: &ValidatedClaims) -> Result<Decision, PolicyError> {
        let policy = self
            .policies
            .get(name)
            .ok_or_else(|| PolicyError::UnknownPolicy(name.to_string()))?;
        Ok(policy.evaluate(claims))
    }
}

/// Builder for [`PolicyRegistry`]. Registration happens here, once; the built
/// registry has no mutation path.
#[derive(Debug, Default)]
pub struct PolicyRegistryBuilder {
    policies: HashMap<String, Policy>,
}

impl PolicyRegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn policy(mut self, name: impl Into<String>, policy: Policy) -> Self {
        self.policies.insert(name.into(), policy);
        self
    }

    pub fn build(self) -> PolicyRegistry {
        PolicyRegistry {
            policies: self.policies,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claims::{Claim, claim_types};

    fn claims_with_role(role: &str) -> ValidatedClaims {
        ValidatedClaims::new(vec![
            Claim::new(claim_types::NAME, "ada@example.com"),
            Claim::new(claim_types::ROLE, role),
        ])
    }

    fn registry() -> PolicyRegistry {
        PolicyRegistry::builder()
            .policy(
                "canDeleteUserRoles",
                Policy::require_claim("can-delete-user-roles", "true"),
            )
            .policy("elevated", Policy::require_role(["Admin", "SuperAdmin"]))
            .build()
    }

    #[test]
    fn role_policy_allows_any_listed_role() {
        let registry = registry();
        assert_eq!(
            registry.evaluate("elevated", &claims_with_role("Admin")),
            Ok(Decision::Allow)
        );
        assert_eq!(
            registry.evaluate("elevated", &claims_with_role("SuperAdmin")),
            Ok(Decision::Allow)
        );
    }

    #[test]
    fn role_policy_denies_unlisted_role() {
        assert_eq!(
            registry().evaluate("elevated", &claims_with_role("Normal User")),
            Ok(Decision::Deny)
        );
    }

    #[test]
    fn role_policy_is_case_sensitive() {
        assert_eq!(
            registry().evaluate("elevated", &claims_with_role("admin")),
            Ok(Decision::Deny)
        );
    }

    #[test]
    fn claim_policy_requires_exact_pair() {
        let registry = registry();

        let entitled = ValidatedClaims::new(vec![Claim::new("can-delete-user-roles", "true")]);
        assert_eq!(
            registry.evaluate("canDeleteUserRoles", &entitled),
            Ok(Decision::Allow)
        );

        let wrong_value = ValidatedClaims::new(vec![Claim::new("can-delete-user-roles", "false")]);
        assert_eq!(
            registry.evaluate("canDeleteUserRoles", &wrong_value),
            Ok(Decision::Deny)
        );

        let missing = ValidatedClaims::new(vec![]);
        assert_eq!(
            registry.evaluate("canDeleteUserRoles", &missing),
            Ok(Decision::Deny)
        );
    }

    #[test]
    fn unknown_policy_is_an_error_not_a_deny() {
        assert_eq!(
            registry().evaluate("nonexistent", &claims_with_role("Admin")),
            Err(PolicyError::UnknownPolicy("nonexistent".to_string()))
        );
    }

    #[test]
    fn evaluation_is_idempotent() {
        let registry = registry();
        let claims = claims_with_role("Admin");

        let first = registry.evaluate("elevated", &claims);
        let second = registry.evaluate("elevated", &claims);
        assert_eq!(first, second);
    }
}

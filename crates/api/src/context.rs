use keyforge_auth::ValidatedClaims;

/// Validated claim set for a request (inserted by the auth middleware).
///
/// This is immutable and present for all protected routes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClaimsContext {
    claims: ValidatedClaims,
}

impl ClaimsContext {
    pub fn new(claims: ValidatedClaims) -> Self {
        Self { claims }
    }

    pub fn claims(&self) -> &ValidatedClaims {
        &self.claims
    }

    pub fn principal_name(&self) -> Option<&str> {
        self.claims.name()
    }
}

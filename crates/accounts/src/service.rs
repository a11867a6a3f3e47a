//! Account service: registration, login, and directory reads.

use std::sync::Arc;

use thiserror::Error;

use keyforge_auth::{Claim, Role, TokenError, TokenFactory};
use keyforge_core::{DomainError, RoleId};
use keyforge_infra::{CredentialVerifier, Directory, Principal, RoleRecord};

use crate::bulk::{self, ItemOutcome};

/// Account-layer error. Everything here is request-scoped.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Token(#[from] TokenError),
}

pub type AccountResult<T> = Result<T, AccountError>;

/// Orchestrates the directory store, credential verifier, and token factory.
///
/// Holds no mutable state of its own; safe to share behind an `Arc` across
/// request workers.
pub struct AccountService {
    directory: Arc<dyn Directory>,
    credentials: Arc<dyn CredentialVerifier>,
    tokens: TokenFactory,
}

impl AccountService {
    pub fn new(
        directory: Arc<dyn Directory>,
        credentials: Arc<dyn CredentialVerifier>,
        tokens: TokenFactory,
    ) -> Self {
        Self {
            directory,
            credentials,
            tokens,
        }
    }

    pub fn directory(&self) -> &dyn Directory {
        self.directory.as_ref()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Login / Register
    // ─────────────────────────────────────────────────────────────────────────

    /// Create a principal whose account name is its email.
    pub fn register(&self, email: &str, password: &str) -> AccountResult<Principal> {
        let email = email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(DomainError::validation("invalid email format").into());
        }
        if password.is_empty() {
            return Err(DomainError::validation("password cannot be empty").into());
        }

        let outcome = self.directory.create_principal(email);
        if !outcome.succeeded {
            return Err(DomainError::validation(outcome.errors.join(", ")).into());
        }

        let principal = self
            .directory
            .find_principal_by_name(email)
            .ok_or_else(|| DomainError::not_found(format!("no user with '{email}' email exists")))?;
        self.credentials.store(&principal.name, password);

        tracing::info!(user = %principal.name, "registered principal");
        Ok(principal)
    }

    /// Authenticate and mint a token for the principal's current roles and
    /// claims.
    ///
    /// An unknown user is reported as such; a wrong password is reported
    /// generically. The asymmetry is deliberate and load-bearing for existing
    /// clients.
    pub fn login(&self, email: &str, password: &str) -> AccountResult<String> {
        if email.is_empty() {
            return Err(DomainError::invalid_argument("email cannot be empty").into());
        }

        let principal = self
            .directory
            .find_principal_by_name(email)
            .ok_or_else(|| DomainError::not_found(format!("no user with '{email}' email exists")))?;

        if !self.credentials.verify(&principal.name, password) {
            tracing::warn!(user = %principal.name, "login rejected");
            return Err(DomainError::Unauthenticated.into());
        }

        let roles: Vec<Role> = self
            .directory
            .principal_roles(&principal)
            .into_iter()
            .map(Role::from)
            .collect();
        let claims = self.directory.principal_claims(&principal);

        let token = self.tokens.create(&principal.name, &roles, &claims)?;
        tracing::info!(user = %principal.name, roles = roles.len(), "login succeeded");
        Ok(token)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Directory reads
    // ─────────────────────────────────────────────────────────────────────────

    pub fn find_principal(&self, email: &str) -> AccountResult<Principal> {
        self.directory
            .find_principal_by_name(email)
            .ok_or_else(|| DomainError::not_found(format!("no user with '{email}' email exists")).into())
    }

    pub fn principal_roles(&self, email: &str) -> AccountResult<Vec<String>> {
        let principal = self.find_principal(email)?;
        Ok(self.directory.principal_roles(&principal))
    }

    pub fn principal_claims(&self, email: &str) -> AccountResult<Vec<Claim>> {
        let principal = self.find_principal(email)?;
        Ok(self.directory.principal_claims(&principal))
    }

    pub fn roles(&self) -> Vec<RoleRecord> {
        self.directory.list_roles()
    }

    /// The role catalog with each role's claims.
    pub fn role_claim_catalog(&self) -> Vec<(RoleRecord, Vec<Claim>)> {
        self.directory
            .list_roles()
            .into_iter()
            .map(|role| {
                let claims = self.directory.role_claims(&role);
                (role, claims)
            })
            .collect()
    }

    pub fn principals(&self) -> Vec<Principal> {
        self.directory.list_principals()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Bulk mutation
    // ─────────────────────────────────────────────────────────────────────────

    pub fn create_roles(&self, roles: &[String]) -> AccountResult<Vec<ItemOutcome>> {
        Ok(bulk::create_roles(self.directory.as_ref(), roles)?)
    }

    pub fn delete_roles(&self, roles: &[String]) -> AccountResult<Vec<ItemOutcome>> {
        Ok(bulk::delete_roles(self.directory.as_ref(), roles)?)
    }

    pub fn add_user_roles(&self, email: &str, roles: &[String]) -> AccountResult<Vec<ItemOutcome>> {
        let principal = self.find_principal(email)?;
        Ok(bulk::add_roles_to_principal(
            self.directory.as_ref(),
            &principal,
            roles,
        )?)
    }

    pub fn remove_user_roles(
        &self,
        email: &str,
        roles: &[String],
    ) -> AccountResult<Vec<ItemOutcome>> {
        let principal = self.find_principal(email)?;
        Ok(bulk::remove_roles_from_principal(
            self.directory.as_ref(),
            &principal,
            roles,
        )?)
    }

    pub fn add_user_claims(
        &self,
        email: &str,
        claims: &[Claim],
    ) -> AccountResult<Vec<ItemOutcome>> {
        let principal = self.find_principal(email)?;
        Ok(bulk::add_claims_to_principal(
            self.directory.as_ref(),
            &principal,
            claims,
        )?)
    }

    pub fn remove_user_claims(
        &self,
        email: &str,
        claims: &[Claim],
    ) -> AccountResult<Vec<ItemOutcome>> {
        let principal = self.find_principal(email)?;
        Ok(bulk::remove_claims_from_principal(
            self.directory.as_ref(),
            &principal,
            claims,
        )?)
    }

    pub fn add_role_claims(
        &self,
        role_id: RoleId,
        claims: &[Claim],
    ) -> AccountResult<Vec<ItemOutcome>> {
        let role = self.find_role(role_id)?;
        Ok(bulk::add_claims_to_role(
            self.directory.as_ref(),
            &role,
            claims,
        )?)
    }

    pub fn remove_role_claims(
        &self,
        role_id: RoleId,
        claims: &[Claim],
    ) -> AccountResult<Vec<ItemOutcome>> {
        let role = self.find_role(role_id)?;
        Ok(bulk::remove_claims_from_role(
            self.directory.as_ref(),
            &role,
            claims,
        )?)
    }

    fn find_role(&self, role_id: RoleId) -> AccountResult<RoleRecord> {
        self.directory
            .find_role_by_id(role_id)
            .ok_or_else(|| {
                DomainError::not_found(format!("role with id '{role_id}' does not exist")).into()
            })
    }
}

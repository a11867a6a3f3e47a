//! In-memory directory and credential store for tests and local development.

use std::collections::HashMap;
use std::sync::RwLock;

use keyforge_auth::Claim;
use keyforge_core::{PrincipalId, RoleId};

use crate::directory::{
    CredentialVerifier, Directory, MutationOutcome, Principal, RoleRecord, normalize,
};

#[derive(Debug, Default)]
struct DirectoryState {
    principals: HashMap<PrincipalId, Principal>,
    principals_by_name: HashMap<String, PrincipalId>,
    roles: HashMap<RoleId, RoleRecord>,
    roles_by_name: HashMap<String, RoleId>,
    memberships: HashMap<PrincipalId, Vec<RoleId>>,
    principal_claims: HashMap<PrincipalId, Vec<Claim>>,
    role_claims: HashMap<RoleId, Vec<Claim>>,
}

/// In-memory [`Directory`].
///
/// Enforces the store-level invariants: principal identifier and normalized
/// name are each globally unique; role name uniqueness is case-insensitive.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    inner: RwLock<DirectoryState>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Directory for InMemoryDirectory {
    fn find_principal_by_name(&self, name: &str) -> Option<Principal> {
        let state = self.inner.read().ok()?;
        let id = state.principals_by_name.get(&normalize(name))?;
        state.principals.get(id).cloned()
    }

    fn list_principals(&self) -> Vec<Principal> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        let mut principals: Vec<Principal> = state.principals.values().cloned().collect();
        principals.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        principals
    }

    fn create_principal(&self, email: &str) -> MutationOutcome {
        let normalized = normalize(email);
        if normalized.is_empty() {
            return MutationOutcome::failed("email cannot be empty");
        }

        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        if state.principals_by_name.contains_key(&normalized) {
            return MutationOutcome::failed(format!("user '{email}' already exists"));
        }

        let principal = Principal {
            id: PrincipalId::new(),
            name: email.trim().to_string(),
            email: email.trim().to_string(),
            normalized_name: normalized.clone(),
        };
        state.principals_by_name.insert(normalized, principal.id);
        state.principals.insert(principal.id, principal);
        MutationOutcome::ok()
    }

    fn principal_roles(&self, principal: &Principal) -> Vec<String> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        state
            .memberships
            .get(&principal.id)
            .into_iter()
            .flatten()
            .filter_map(|role_id| state.roles.get(role_id))
            .map(|role| role.name.clone())
            .collect()
    }

    fn principal_claims(&self, principal: &Principal) -> Vec<Claim> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        state
            .principal_claims
            .get(&principal.id)
            .cloned()
            .unwrap_or_default()
    }

    fn role_exists(&self, name: &str) -> bool {
        match self.inner.read() {
            Ok(state) => state.roles_by_name.contains_key(&normalize(name)),
            Err(_) => false,
        }
    }

    fn find_role_by_name(&self, name: &str) -> Option<RoleRecord> {
        let state = self.inner.read().ok()?;
        let id = state.roles_by_name.get(&normalize(name))?;
        state.roles.get(id).cloned()
    }

    fn find_role_by_id(&self, id: RoleId) -> Option<RoleRecord> {
        let state = self.inner.read().ok()?;
        state.roles.get(&id).cloned()
    }

    fn list_roles(&self) -> Vec<RoleRecord> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        let mut roles: Vec<RoleRecord> = state.roles.values().cloned().collect();
        roles.sort_by(|a, b| a.normalized_name.cmp(&b.normalized_name));
        roles
    }

    fn create_role(&self, name: &str) -> MutationOutcome {
        let normalized = normalize(name);
        if normalized.is_empty() {
            return MutationOutcome::failed("role name cannot be empty");
        }

        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        if state.roles_by_name.contains_key(&normalized) {
            return MutationOutcome::failed(format!("role '{name}' already exists"));
        }

        let role = RoleRecord {
            id: RoleId::new(),
            name: name.trim().to_string(),
            normalized_name: normalized.clone(),
        };
        state.roles_by_name.insert(normalized, role.id);
        state.roles.insert(role.id, role);
        MutationOutcome::ok()
    }

    fn delete_role(&self, role: &RoleRecord) -> MutationOutcome {
        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        if state.roles.remove(&role.id).is_none() {
            return MutationOutcome::failed(format!("role '{}' not found", role.name));
        }
        state.roles_by_name.remove(&role.normalized_name);
        state.role_claims.remove(&role.id);
        for members in state.memberships.values_mut() {
            members.retain(|id| *id != role.id);
        }
        MutationOutcome::ok()
    }

    fn role_claims(&self, role: &RoleRecord) -> Vec<Claim> {
        let state = match self.inner.read() {
            Ok(s) => s,
            Err(_) => return Vec::new(),
        };
        state.role_claims.get(&role.id).cloned().unwrap_or_default()
    }

    fn add_role_to_principal(&self, principal: &Principal, role_name: &str) -> MutationOutcome {
        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        let Some(role_id) = state.roles_by_name.get(&normalize(role_name)).copied() else {
            return MutationOutcome::failed(format!("role '{role_name}' not found"));
        };
        if !state.principals.contains_key(&principal.id) {
            return MutationOutcome::failed(format!("user '{}' not found", principal.name));
        }

        let members = state.memberships.entry(principal.id).or_default();
        if members.contains(&role_id) {
            return MutationOutcome::failed(format!(
                "user '{}' is already in role '{role_name}'",
                principal.name
            ));
        }
        members.push(role_id);
        MutationOutcome::ok()
    }

    fn remove_role_from_principal(
        &self,
        principal: &Principal,
        role_name: &str,
    ) -> MutationOutcome {
        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        let Some(role_id) = state.roles_by_name.get(&normalize(role_name)).copied() else {
            return MutationOutcome::failed(format!("role '{role_name}' not found"));
        };

        let members = state.memberships.entry(principal.id).or_default();
        let before = members.len();
        members.retain(|id| *id != role_id);
        if members.len() == before {
            return MutationOutcome::failed(format!(
                "user '{}' is not in role '{role_name}'",
                principal.name
            ));
        }
        MutationOutcome::ok()
    }

    fn add_claim_to_principal(&self, principal: &Principal, claim: &Claim) -> MutationOutcome {
        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        if !state.principals.contains_key(&principal.id) {
            return MutationOutcome::failed(format!("user '{}' not found", principal.name));
        }
        // Each attachment is its own record; duplicates are allowed.
        state
            .principal_claims
            .entry(principal.id)
            .or_default()
            .push(claim.clone());
        MutationOutcome::ok()
    }

    fn remove_claim_from_principal(
        &self,
        principal: &Principal,
        claim: &Claim,
    ) -> MutationOutcome {
        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        if !state.principals.contains_key(&principal.id) {
            return MutationOutcome::failed(format!("user '{}' not found", principal.name));
        }
        state
            .principal_claims
            .entry(principal.id)
            .or_default()
            .retain(|c| c != claim);
        MutationOutcome::ok()
    }

    fn add_claim_to_role(&self, role: &RoleRecord, claim: &Claim) -> MutationOutcome {
        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        if !state.roles.contains_key(&role.id) {
            return MutationOutcome::failed(format!("role '{}' not found", role.name));
        }
        state
            .role_claims
            .entry(role.id)
            .or_default()
            .push(claim.clone());
        MutationOutcome::ok()
    }

    fn remove_claim_from_role(&self, role: &RoleRecord, claim: &Claim) -> MutationOutcome {
        let mut state = match self.inner.write() {
            Ok(s) => s,
            Err(_) => return MutationOutcome::failed("store lock poisoned"),
        };

        if !state.roles.contains_key(&role.id) {
            return MutationOutcome::failed(format!("role '{}' not found", role.name));
        }
        state
            .role_claims
            .entry(role.id)
            .or_default()
            .retain(|c| c != claim);
        MutationOutcome::ok()
    }
}

/// In-memory [`CredentialVerifier`].
///
/// Stores secrets verbatim — acceptable only because this backs tests and
/// local development; production verification sits behind the same trait.
#[derive(Debug, Default)]
pub struct InMemoryCredentials {
    inner: RwLock<HashMap<String, String>>,
}

impl InMemoryCredentials {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialVerifier for InMemoryCredentials {
    fn store(&self, principal_name: &str, password: &str) {
        if let Ok(mut map) = self.inner.write() {
            map.insert(normalize(principal_name), password.to_string());
        }
    }

    fn verify(&self, principal_name: &str, password: &str) -> bool {
        match self.inner.read() {
            Ok(map) => map
                .get(&normalize(principal_name))
                .is_some_and(|stored| stored == password),
            Err(_) => false,
        }
    }
}

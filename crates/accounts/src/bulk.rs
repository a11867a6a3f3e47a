//! Bulk role/claim mutation with independent per-item outcomes.
//!
//! Every batch is processed strictly sequentially, preserving input order in
//! the result sequence. One item's failure never aborts the batch; callers
//! must inspect the per-item list rather than assume batch success.
//!
//! Two behavioral quirks are deliberate compatibility contracts:
//! - adding a nonexistent role fails the item with `"<role> NOT_FOUND"`
//!   without touching the store, while deleting a nonexistent role is
//!   silently skipped (no output entry);
//! - role batches join a store's error descriptions with `'\r'`, claim
//!   batches with `'|'`.

use serde::Serialize;

use keyforge_auth::Claim;
use keyforge_core::{DomainError, DomainResult};
use keyforge_infra::{Directory, MutationOutcome, Principal, RoleRecord};

const ROLE_ERROR_SEPARATOR: &str = "\r";
const CLAIM_ERROR_SEPARATOR: &str = "|";

/// Per-item result of a bulk mutation.
///
/// `id` carries the holder's role id for role-claim batches; `name` is the
/// role name for role batches and the claim type for claim batches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub succeeded: bool,
    pub error: String,
}

impl ItemOutcome {
    fn from_store(name: impl Into<String>, outcome: MutationOutcome, separator: &str) -> Self {
        Self {
            id: None,
            name: name.into(),
            succeeded: outcome.succeeded,
            error: outcome.errors.join(separator),
        }
    }

    fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

fn ensure_items<T>(items: &[T]) -> DomainResult<()> {
    if items.is_empty() {
        return Err(DomainError::invalid_argument(
            "items cannot be null or empty",
        ));
    }
    Ok(())
}

/// Grant each named role to `principal`.
///
/// A role absent from the catalog fails its item with `"<role> NOT_FOUND"`;
/// the store's add is never invoked for that item.
pub fn add_roles_to_principal(
    directory: &dyn Directory,
    principal: &Principal,
    roles: &[String],
) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(roles)?;

    let mut outcomes = Vec::with_capacity(roles.len());
    for role in roles {
        if !directory.role_exists(role) {
            outcomes.push(ItemOutcome {
                id: None,
                name: role.clone(),
                succeeded: false,
                error: format!("{role} NOT_FOUND"),
            });
            continue;
        }

        let result = directory.add_role_to_principal(principal, role);
        outcomes.push(ItemOutcome::from_store(role, result, ROLE_ERROR_SEPARATOR));
    }
    Ok(outcomes)
}

/// Revoke each named role from `principal`, recording the store's verdict
/// per item.
pub fn remove_roles_from_principal(
    directory: &dyn Directory,
    principal: &Principal,
    roles: &[String],
) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(roles)?;

    let mut outcomes = Vec::with_capacity(roles.len());
    for role in roles {
        let result = directory.remove_role_from_principal(principal, role);
        outcomes.push(ItemOutcome::from_store(role, result, ROLE_ERROR_SEPARATOR));
    }
    Ok(outcomes)
}

/// Create each named role in the catalog.
pub fn create_roles(directory: &dyn Directory, roles: &[String]) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(roles)?;

    let mut outcomes = Vec::with_capacity(roles.len());
    for role in roles {
        let result = directory.create_role(role);
        outcomes.push(ItemOutcome::from_store(role, result, ROLE_ERROR_SEPARATOR));
    }
    Ok(outcomes)
}

/// Delete each named role from the catalog.
///
/// A role absent from the catalog is silently skipped: it contributes no
/// entry to the result sequence. (The asymmetry with [`add_roles_to_principal`]
/// is an explicit compatibility contract.)
pub fn delete_roles(directory: &dyn Directory, roles: &[String]) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(roles)?;

    let mut outcomes = Vec::new();
    for role_name in roles {
        let Some(role) = directory.find_role_by_name(role_name) else {
            continue;
        };

        let result = directory.delete_role(&role);
        outcomes.push(ItemOutcome::from_store(
            role_name,
            result,
            ROLE_ERROR_SEPARATOR,
        ));
    }
    Ok(outcomes)
}

/// Attach each claim to `principal`.
pub fn add_claims_to_principal(
    directory: &dyn Directory,
    principal: &Principal,
    claims: &[Claim],
) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(claims)?;

    let mut outcomes = Vec::with_capacity(claims.len());
    for claim in claims {
        let result = directory.add_claim_to_principal(principal, claim);
        outcomes.push(ItemOutcome::from_store(
            claim.claim_type.clone(),
            result,
            CLAIM_ERROR_SEPARATOR,
        ));
    }
    Ok(outcomes)
}

/// Detach each claim from `principal`.
pub fn remove_claims_from_principal(
    directory: &dyn Directory,
    principal: &Principal,
    claims: &[Claim],
) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(claims)?;

    let mut outcomes = Vec::with_capacity(claims.len());
    for claim in claims {
        let result = directory.remove_claim_from_principal(principal, claim);
        outcomes.push(ItemOutcome::from_store(
            claim.claim_type.clone(),
            result,
            CLAIM_ERROR_SEPARATOR,
        ));
    }
    Ok(outcomes)
}

/// Attach each claim to `role`.
pub fn add_claims_to_role(
    directory: &dyn Directory,
    role: &RoleRecord,
    claims: &[Claim],
) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(claims)?;

    let mut outcomes = Vec::with_capacity(claims.len());
    for claim in claims {
        let result = directory.add_claim_to_role(role, claim);
        outcomes.push(
            ItemOutcome::from_store(claim.claim_type.clone(), result, CLAIM_ERROR_SEPARATOR)
                .with_id(role.id.to_string()),
        );
    }
    Ok(outcomes)
}

/// Detach each claim from `role`.
pub fn remove_claims_from_role(
    directory: &dyn Directory,
    role: &RoleRecord,
    claims: &[Claim],
) -> DomainResult<Vec<ItemOutcome>> {
    ensure_items(claims)?;

    let mut outcomes = Vec::with_capacity(claims.len());
    for claim in claims {
        let result = directory.remove_claim_from_role(role, claim);
        outcomes.push(
            ItemOutcome::from_store(claim.claim_type.clone(), result, CLAIM_ERROR_SEPARATOR)
                .with_id(role.id.to_string()),
        );
    }
    Ok(outcomes)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use keyforge_core::{PrincipalId, RoleId};
    use keyforge_infra::InMemoryDirectory;

    use super::*;

    fn principal() -> Principal {
        Principal {
            id: PrincipalId::new(),
            name: "ada@example.com".to_string(),
            email: "ada@example.com".to_string(),
            normalized_name: "ADA@EXAMPLE.COM".to_string(),
        }
    }

    /// Directory double that records which mutations were invoked.
    #[derive(Default)]
    struct RecordingDirectory {
        existing_roles: Vec<String>,
        add_calls: Mutex<Vec<String>>,
        delete_calls: Mutex<Vec<String>>,
        fail_deletes_with: Option<Vec<String>>,
    }

    impl Directory for RecordingDirectory {
        fn find_principal_by_name(&self, _name: &str) -> Option<Principal> {
            unimplemented!("not used by bulk coordination")
        }

        fn list_principals(&self) -> Vec<Principal> {
            unimplemented!("not used by bulk coordination")
        }

        fn create_principal(&self, _email: &str) -> MutationOutcome {
            unimplemented!("not used by bulk coordination")
        }

        fn principal_roles(&self, _principal: &Principal) -> Vec<String> {
            unimplemented!("not used by bulk coordination")
        }

        fn principal_claims(&self, _principal: &Principal) -> Vec<Claim> {
            unimplemented!("not used by bulk coordination")
        }

        fn role_exists(&self, name: &str) -> bool {
            self.existing_roles.iter().any(|r| r.as_str() == name)
        }

        fn find_role_by_name(&self, name: &str) -> Option<RoleRecord> {
            self.existing_roles
                .iter()
                .find(|r| r.as_str() == name)
                .map(|r| RoleRecord {
                    id: RoleId::new(),
                    name: r.clone(),
                    normalized_name: r.to_uppercase(),
                })
        }

        fn find_role_by_id(&self, _id: RoleId) -> Option<RoleRecord> {
            unimplemented!("not used by bulk coordination")
        }

        fn list_roles(&self) -> Vec<RoleRecord> {
            unimplemented!("not used by bulk coordination")
        }

        fn create_role(&self, _name: &str) -> MutationOutcome {
            unimplemented!("not used by bulk coordination")
        }

        fn delete_role(&self, role: &RoleRecord) -> MutationOutcome {
            self.delete_calls.lock().unwrap().push(role.name.clone());
            match &self.fail_deletes_with {
                Some(errors) => MutationOutcome::failed_with(errors.clone()),
                None => MutationOutcome::ok(),
            }
        }

        fn role_claims(&self, _role: &RoleRecord) -> Vec<Claim> {
            unimplemented!("not used by bulk coordination")
        }

        fn add_role_to_principal(
            &self,
            _principal: &Principal,
            role_name: &str,
        ) -> MutationOutcome {
            self.add_calls.lock().unwrap().push(role_name.to_string());
            MutationOutcome::ok()
        }

        fn remove_role_from_principal(
            &self,
            _principal: &Principal,
            _role_name: &str,
        ) -> MutationOutcome {
            MutationOutcome::ok()
        }

        fn add_claim_to_principal(
            &self,
            _principal: &Principal,
            _claim: &Claim,
        ) -> MutationOutcome {
            MutationOutcome::ok()
        }

        fn remove_claim_from_principal(
            &self,
            _principal: &Principal,
            _claim: &Claim,
        ) -> MutationOutcome {
            MutationOutcome::ok()
        }

        fn add_claim_to_role(&self, _role: &RoleRecord, _claim: &Claim) -> MutationOutcome {
            MutationOutcome::failed_with(vec![
                "first reason".to_string(),
                "second reason".to_string(),
            ])
        }

        fn remove_claim_from_role(&self, _role: &RoleRecord, _claim: &Claim) -> MutationOutcome {
            MutationOutcome::ok()
        }
    }

    #[test]
    fn role_add_skips_the_store_for_unknown_roles() {
        let directory = RecordingDirectory {
            existing_roles: vec!["Admin".to_string()],
            ..Default::default()
        };
        let items = vec!["Admin".to_string(), "Ghost".to_string()];

        let outcomes = add_roles_to_principal(&directory, &principal(), &items).unwrap();

        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0].name, "Admin");
        assert!(outcomes[0].succeeded);
        assert_eq!(outcomes[1].name, "Ghost");
        assert!(!outcomes[1].succeeded);
        assert_eq!(outcomes[1].error, "Ghost NOT_FOUND");

        // The store's add ran exactly once, and never for "Ghost".
        assert_eq!(*directory.add_calls.lock().unwrap(), vec!["Admin"]);
    }

    #[test]
    fn role_delete_silently_skips_unknown_roles() {
        let directory = RecordingDirectory {
            existing_roles: vec![],
            ..Default::default()
        };

        let outcomes = delete_roles(&directory, &["Ghost".to_string()]).unwrap();

        assert!(outcomes.is_empty());
        assert!(directory.delete_calls.lock().unwrap().is_empty());
    }

    #[test]
    fn role_delete_reports_store_failures() {
        let directory = RecordingDirectory {
            existing_roles: vec!["Admin".to_string()],
            fail_deletes_with: Some(vec![
                "role is protected".to_string(),
                "role has members".to_string(),
            ]),
            ..Default::default()
        };

        let outcomes = delete_roles(&directory, &["Admin".to_string()]).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert!(!outcomes[0].succeeded);
        // Role batches join error descriptions with a carriage return.
        assert_eq!(outcomes[0].error, "role is protected\rrole has members");
    }

    #[test]
    fn empty_batch_is_rejected_upfront() {
        let directory = RecordingDirectory::default();

        let err = add_roles_to_principal(&directory, &principal(), &[]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));

        let err = delete_roles(&directory, &[]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));

        let err = add_claims_to_principal(&directory, &principal(), &[]).unwrap_err();
        assert!(matches!(err, DomainError::InvalidArgument(_)));
    }

    #[test]
    fn claim_batches_join_errors_with_pipes_and_carry_the_role_id() {
        let directory = RecordingDirectory {
            existing_roles: vec!["Admin".to_string()],
            ..Default::default()
        };
        let role = directory.find_role_by_name("Admin").unwrap();
        let claims = vec![Claim::new("can-delete-user-roles", "true")];

        let outcomes = add_claims_to_role(&directory, &role, &claims).unwrap();

        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].id.as_deref(), Some(role.id.to_string().as_str()));
        assert_eq!(outcomes[0].name, "can-delete-user-roles");
        assert!(!outcomes[0].succeeded);
        assert_eq!(outcomes[0].error, "first reason|second reason");
    }

    #[test]
    fn batches_preserve_input_order_against_a_real_store() {
        let directory = InMemoryDirectory::new();
        directory.create_principal("ada@example.com");
        let ada = directory.find_principal_by_name("ada@example.com").unwrap();
        directory.create_role("Dev");
        directory.create_role("Admin");

        let items = vec![
            "Admin".to_string(),
            "Missing".to_string(),
            "Dev".to_string(),
        ];
        let outcomes = add_roles_to_principal(&directory, &ada, &items).unwrap();

        let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, vec!["Admin", "Missing", "Dev"]);
        assert_eq!(
            outcomes.iter().map(|o| o.succeeded).collect::<Vec<_>>(),
            vec![true, false, true]
        );
    }
}

//! `keyforge-accounts` — account operations composed from auth + infra.
//!
//! Registration, login (credential check → token mint), directory reads, and
//! bulk role/claim mutation with independent per-item outcomes.

pub mod bulk;
pub mod service;

pub use bulk::{
    ItemOutcome, add_claims_to_principal, add_claims_to_role, add_roles_to_principal,
    create_roles, delete_roles, remove_claims_from_principal, remove_claims_from_role,
    remove_roles_from_principal,
};
pub use service::{AccountError, AccountService};

//! `keyforge-auth` — pure claims/token/policy boundary.
//!
//! This crate is intentionally decoupled from HTTP and storage. Everything
//! here is a deterministic function of its inputs plus immutable
//! configuration loaded once at startup.

pub mod claims;
pub mod policy;
pub mod roles;
pub mod token;

pub use claims::{Claim, ValidatedClaims, claim_types};
pub use policy::{Decision, Policy, PolicyError, PolicyRegistry, PolicyRegistryBuilder};
pub use roles::Role;
pub use token::{
    DEFAULT_TTL_HOURS, MIN_SECRET_BYTES, TokenConfig, TokenError, TokenFactory, TokenValidator,
};

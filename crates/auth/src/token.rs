//! Token minting and validation.
//!
//! A token is a compact three-part HMAC-SHA256 string: the header declares
//! HS256, the payload carries issuer, audience, expiry, and the aggregated
//! claim sequence. The factory and validator share one immutable
//! [`TokenConfig`]; neither holds session state, so both are safe to use
//! concurrently behind an `Arc`.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::claims::{Claim, ValidatedClaims, claim_types};
use crate::roles::Role;

/// Default token lifetime, in hours.
pub const DEFAULT_TTL_HOURS: u32 = 1;

/// Minimum signing-secret length accepted for HMAC-SHA256.
pub const MIN_SECRET_BYTES: usize = 16;

/// Immutable signing configuration shared by factory and validator.
///
/// Passed in explicitly at construction — never read from ambient state — so
/// tests can supply fixture keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    pub secret_key: String,

    /// Tolerance added to the expiry check, in seconds. Zero by default:
    /// a token is invalid at its expiry instant.
    #[serde(default)]
    pub clock_skew_seconds: u64,
}

impl TokenConfig {
    pub fn new(
        issuer: impl Into<String>,
        audience: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        Self {
            issuer: issuer.into(),
            audience: audience.into(),
            secret_key: secret_key.into(),
            clock_skew_seconds: 0,
        }
    }

    pub fn with_clock_skew(mut self, seconds: u64) -> Self {
        self.clock_skew_seconds = seconds;
        self
    }
}

/// Token-layer error. Validation failures are distinct so callers can log or
/// retry-with-refresh appropriately.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// Signing secret missing or below the algorithm's minimum key size.
    #[error("token configuration invalid: {0}")]
    Configuration(String),

    /// Malformed caller input (empty principal name, zero TTL).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("token signature is invalid")]
    SignatureInvalid,

    #[error("token is malformed")]
    Malformed,

    #[error("token issuer mismatch")]
    IssuerMismatch,

    #[error("token audience mismatch")]
    AudienceMismatch,

    #[error("token has expired")]
    Expired,
}

/// Wire payload. `claims` preserves emit order and duplicates.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TokenPayload {
    iss: String,
    aud: String,
    exp: i64,
    claims: Vec<Claim>,
}

fn signing_secret(config: &TokenConfig) -> Result<&[u8], TokenError> {
    let secret = config.secret_key.as_bytes();
    if secret.len() < MIN_SECRET_BYTES {
        return Err(TokenError::Configuration(format!(
            "signing secret must be at least {MIN_SECRET_BYTES} bytes"
        )));
    }
    Ok(secret)
}

// ─────────────────────────────────────────────────────────────────────────────
// Factory
// ─────────────────────────────────────────────────────────────────────────────

/// Mints signed, time-bounded tokens from a principal snapshot.
///
/// Minting is pure: a deterministic function of (principal name, role set,
/// claim sequence, current time, configuration). The factory persists nothing
/// and holds no session.
#[derive(Debug, Clone)]
pub struct TokenFactory {
    config: TokenConfig,
}

impl TokenFactory {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Mint a token with the default one-hour lifetime.
    pub fn create(
        &self,
        principal_name: &str,
        roles: &[Role],
        claims: &[Claim],
    ) -> Result<String, TokenError> {
        self.create_with_ttl(principal_name, roles, claims, DEFAULT_TTL_HOURS)
    }

    pub fn create_with_ttl(
        &self,
        principal_name: &str,
        roles: &[Role],
        claims: &[Claim],
        ttl_hours: u32,
    ) -> Result<String, TokenError> {
        self.create_at(Utc::now(), principal_name, roles, claims, ttl_hours)
    }

    /// Mint at an explicit instant. Exposed so the expiry boundary is
    /// deterministic under test.
    pub fn create_at(
        &self,
        now: DateTime<Utc>,
        principal_name: &str,
        roles: &[Role],
        claims: &[Claim],
        ttl_hours: u32,
    ) -> Result<String, TokenError> {
        let secret = signing_secret(&self.config)?;

        if principal_name.is_empty() {
            return Err(TokenError::InvalidArgument(
                "principal name cannot be empty".to_string(),
            ));
        }
        if ttl_hours == 0 {
            return Err(TokenError::InvalidArgument(
                "ttl_hours must be greater than zero".to_string(),
            ));
        }

        let expires_at = now + Duration::hours(i64::from(ttl_hours));
        let payload = TokenPayload {
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            exp: expires_at.timestamp(),
            claims: aggregate_claims(principal_name, roles, claims),
        };

        let key = EncodingKey::from_secret(secret);
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &payload, &key)
            .map_err(|e| TokenError::Configuration(e.to_string()))
    }
}

/// Union of the stored claims plus the synthesized name/email/role claims.
///
/// No de-duplication: if the same pair appears in both the input and a
/// synthesized entry, both are emitted.
fn aggregate_claims(principal_name: &str, roles: &[Role], claims: &[Claim]) -> Vec<Claim> {
    let mut out = Vec::with_capacity(claims.len() + roles.len() + 2);
    out.extend_from_slice(claims);

    out.push(Claim::new(claim_types::NAME, principal_name));
    out.push(Claim::new(claim_types::EMAIL, principal_name));

    for role in roles {
        out.push(Claim::new(claim_types::ROLE, role.as_str()));
    }

    out
}

// ─────────────────────────────────────────────────────────────────────────────
// Validator
// ─────────────────────────────────────────────────────────────────────────────

/// Verifies inbound tokens and reconstructs their claim sets.
#[derive(Debug, Clone)]
pub struct TokenValidator {
    config: TokenConfig,
}

impl TokenValidator {
    pub fn new(config: TokenConfig) -> Self {
        Self { config }
    }

    /// Verify signature, issuer, audience, and expiry at `now`.
    ///
    /// Issuer and audience are exact string comparisons against the
    /// configured values. A token is valid strictly before its expiry
    /// instant, extended by the configured clock skew.
    pub fn validate(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<ValidatedClaims, TokenError> {
        let secret = signing_secret(&self.config)?;

        // Signature and shape only; issuer/audience/expiry are checked below
        // deterministically against the supplied `now`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims = HashSet::new();

        let key = DecodingKey::from_secret(secret);
        let data = jsonwebtoken::decode::<TokenPayload>(token, &key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    TokenError::SignatureInvalid
                }
                _ => TokenError::Malformed,
            }
        })?;

        let payload = data.claims;
        if payload.iss != self.config.issuer {
            return Err(TokenError::IssuerMismatch);
        }
        if payload.aud != self.config.audience {
            return Err(TokenError::AudienceMismatch);
        }

        let cutoff = payload.exp.saturating_add(self.config.clock_skew_seconds as i64);
        if now.timestamp() >= cutoff {
            return Err(TokenError::Expired);
        }

        Ok(ValidatedClaims::new(payload.claims))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn config() -> TokenConfig {
        TokenConfig::new("keyforge-tests", "keyforge-clients", SECRET)
    }

    fn factory() -> TokenFactory {
        TokenFactory::new(config())
    }

    fn validator() -> TokenValidator {
        TokenValidator::new(config())
    }

    #[test]
    fn round_trip_reconstructs_claim_set() {
        let now = Utc::now();
        let roles = vec![Role::new("Admin"), Role::new("Dev")];
        let stored = vec![
            Claim::new("department", "engineering"),
            // Collides with a synthesized claim; both must survive.
            Claim::new(claim_types::NAME, "shadow"),
        ];

        let token = factory()
            .create_at(now, "ada@example.com", &roles, &stored, 1)
            .unwrap();
        let validated = validator().validate(&token, now).unwrap();

        let expected = vec![
            Claim::new("department", "engineering"),
            Claim::new(claim_types::NAME, "shadow"),
            Claim::new(claim_types::NAME, "ada@example.com"),
            Claim::new(claim_types::EMAIL, "ada@example.com"),
            Claim::new(claim_types::ROLE, "Admin"),
            Claim::new(claim_types::ROLE, "Dev"),
        ];
        assert_eq!(validated.claims(), expected.as_slice());
        assert_eq!(validated.roles(), vec!["Admin", "Dev"]);
    }

    #[test]
    fn expired_at_the_expiry_instant() {
        let now = Utc::now();
        let token = factory().create_at(now, "ada@example.com", &[], &[], 1).unwrap();

        // Strictly before expiry: valid.
        let just_before = now + Duration::seconds(3599);
        assert!(validator().validate(&token, just_before).is_ok());

        // At the expiry instant: invalid ("issued-for-duration" semantics).
        let at_expiry = now + Duration::hours(1);
        assert_eq!(
            validator().validate(&token, at_expiry),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn clock_skew_extends_the_expiry_check() {
        let now = Utc::now();
        let token = factory().create_at(now, "ada@example.com", &[], &[], 1).unwrap();

        let slightly_late = now + Duration::seconds(3700);
        assert_eq!(
            validator().validate(&token, slightly_late),
            Err(TokenError::Expired)
        );

        let lenient = TokenValidator::new(config().with_clock_skew(300));
        assert!(lenient.validate(&token, slightly_late).is_ok());
        assert_eq!(
            lenient.validate(&token, now + Duration::seconds(3900)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn different_secret_fails_signature() {
        let now = Utc::now();
        let token = factory().create_at(now, "ada@example.com", &[], &[], 1).unwrap();

        let other = TokenValidator::new(TokenConfig::new(
            "keyforge-tests",
            "keyforge-clients",
            "ffffffffffffffffffffffffffffffff",
        ));
        assert_eq!(
            other.validate(&token, now),
            Err(TokenError::SignatureInvalid)
        );
    }

    #[test]
    fn issuer_and_audience_mismatch_are_distinct() {
        let now = Utc::now();
        let token = factory().create_at(now, "ada@example.com", &[], &[], 1).unwrap();

        let wrong_issuer = TokenValidator::new(TokenConfig::new(
            "someone-else",
            "keyforge-clients",
            SECRET,
        ));
        assert_eq!(
            wrong_issuer.validate(&token, now),
            Err(TokenError::IssuerMismatch)
        );

        let wrong_audience = TokenValidator::new(TokenConfig::new(
            "keyforge-tests",
            "other-clients",
            SECRET,
        ));
        assert_eq!(
            wrong_audience.validate(&token, now),
            Err(TokenError::AudienceMismatch)
        );
    }

    #[test]
    fn malformed_token_is_rejected() {
        assert_eq!(
            validator().validate("not-a-token", Utc::now()),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn short_secret_is_a_configuration_error() {
        let weak = TokenFactory::new(TokenConfig::new("iss", "aud", "short"));
        assert!(matches!(
            weak.create("ada@example.com", &[], &[]),
            Err(TokenError::Configuration(_))
        ));

        let weak = TokenValidator::new(TokenConfig::new("iss", "aud", ""));
        assert!(matches!(
            weak.validate("whatever", Utc::now()),
            Err(TokenError::Configuration(_))
        ));
    }

    #[test]
    fn empty_principal_name_is_rejected() {
        assert!(matches!(
            factory().create("", &[], &[]),
            Err(TokenError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_ttl_is_rejected() {
        assert!(matches!(
            factory().create_with_ttl("ada@example.com", &[], &[], 0),
            Err(TokenError::InvalidArgument(_))
        ));
    }

    proptest! {
        /// For any principal/roles/claims, the reconstructed claim set is the
        /// input claims (order and duplicates preserved) plus the synthesized
        /// name/email claims plus one role claim per input role.
        #[test]
        fn round_trip_preserves_union(
            name in "[a-z]{1,16}@[a-z]{1,8}\\.com",
            roles in proptest::collection::vec("[A-Za-z ]{1,12}", 0..4),
            pairs in proptest::collection::vec(("[a-z-]{1,12}", "[a-zA-Z0-9 ]{0,12}"), 0..4),
        ) {
            let now = Utc::now();
            let roles: Vec<Role> = roles.into_iter().map(Role::from).collect();
            let stored: Vec<Claim> = pairs
                .into_iter()
                .map(|(t, v)| Claim::new(t, v))
                .collect();

            let token = factory().create_at(now, &name, &roles, &stored, 1).unwrap();
            let validated = validator().validate(&token, now).unwrap();

            let mut expected = stored.clone();
            expected.push(Claim::new(claim_types::NAME, name.clone()));
            expected.push(Claim::new(claim_types::EMAIL, name.clone()));
            for role in &roles {
                expected.push(Claim::new(claim_types::ROLE, role.as_str()));
            }
            prop_assert_eq!(validated.claims(), expected.as_slice());
        }
    }
}

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Role name used for role-based access checks.
///
/// Roles are intentionally opaque strings at this layer; the directory store
/// owns the catalog and its case-insensitive uniqueness rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(Cow<'static, str>);

impl Role {
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Self(Cow::Owned(value))
    }
}

/// Built-in administrative tiers.
///
/// Comparisons against these are case-sensitive exact matches; route guards
/// may accept any one of a supplied list (logical OR).
pub const NORMAL_USER: &str = "Normal User";
pub const ADMIN: &str = "Admin";
pub const SUPER_ADMIN: &str = "SuperAdmin";
pub const DEV: &str = "Dev";

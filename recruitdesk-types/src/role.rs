//! The three-tier role model.

use crate::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Account role, fixed at account creation.
///
/// Variants are declared in ascending authority so the derived `Ord` is the
/// authority order: `Staff < Admin < SuperAdmin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Staff,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Returns the wire/storage name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Admin => "admin",
            Self::SuperAdmin => "super_admin",
        }
    }

    /// True for roles that may edit other users' permissions.
    pub fn is_privileged(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// True if `self` holds strictly more authority than `other`.
    pub fn outranks(&self, other: Role) -> bool {
        *self > other
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staff" => Ok(Self::Staff),
            "admin" => Ok(Self::Admin),
            "super_admin" | "superadmin" | "super-admin" => Ok(Self::SuperAdmin),
            _ => Err(Error::UnknownRole(s.to_string())),
        }
    }
}

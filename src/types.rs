//! Shared types used across the codebase

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Role claim attached to an identity and mirrored on the profile document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Musician,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Musician => "musician",
            Role::Admin => "admin",
        }
    }

    /// Elevated roles bypass ownership checks
    pub fn is_elevated(&self) -> bool {
        matches!(self, Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "client" => Ok(Role::Client),
            "musician" => Ok(Role::Musician),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Collection names shared by services, pagination listings and the identity provider
pub mod collections {
    pub const APPOINTMENTS: &str = "appointments";
    pub const INCIDENTS: &str = "incidencias";
    pub const USERS: &str = "users";
    pub const REVIEWS: &str = "reviews";
    pub const SERVICES: &str = "services";
    pub const ACCOUNTS: &str = "accounts";
}

/// Field names that carry meaning outside a single record type
pub mod fields {
    pub const CREATED_AT: &str = "createdAt";
    pub const OWNER: &str = "userId";
    pub const ROLE: &str = "role";
    pub const EMAIL: &str = "email";
    pub const MUSICIAN_ID: &str = "musicianId";
}

use tracing::warn;

use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::types::Role;

/// Capability an operation requires of the authenticated subject
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access<'a> {
    /// Any verified subject
    Authenticated,
    /// Subject holds exactly this role
    Role(Role),
    /// Subject is the given owner
    Owner(&'a str),
    /// Subject is the given owner or holds an elevated role
    OwnerOrElevated(&'a str),
}

impl AuthUser {
    pub fn is_elevated(&self) -> bool {
        self.role.is_some_and(|role| role.is_elevated())
    }

    pub fn allows(&self, access: Access<'_>) -> bool {
        match access {
            Access::Authenticated => true,
            Access::Role(role) => self.role == Some(role),
            Access::Owner(owner) => self.subject == owner,
            Access::OwnerOrElevated(owner) => self.subject == owner || self.is_elevated(),
        }
    }

    /// `Forbidden` unless [`AuthUser::allows`] the capability
    pub fn require(&self, access: Access<'_>) -> Result<(), ApiError> {
        if self.allows(access) {
            return Ok(());
        }
        warn!(subject = %self.subject, ?access, "Access denied");
        Err(match access {
            Access::Role(role) => ApiError::forbidden(format!("Requires the {} role", role)),
            Access::Owner(_) => ApiError::forbidden("Only the owner can do this"),
            _ => ApiError::forbidden("Not allowed"),
        })
    }
}

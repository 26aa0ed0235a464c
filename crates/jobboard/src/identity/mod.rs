//! Principal identity and role resolution.
//!
//! Raw role references arrive in whatever casing the upstream user directory
//! stored them (`"jobseeker"`, `"Job Seeker"`, `"Employer"`, ...). They are
//! normalized into the closed [`Role`] enum here, at one boundary; nothing
//! deeper in the system compares role strings.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier wrapper for authenticated principals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub String);

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Closed set of roles recognized by the authorization layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    JobSeeker,
    Employer,
    Admin,
}

impl Role {
    /// Normalize a raw role reference. Comparison ignores case and interior
    /// whitespace/punctuation so `"Job Seeker"`, `"job-seeker"`, and
    /// `"JobSeeker"` all resolve to the same variant.
    pub fn parse(raw: &str) -> Option<Self> {
        let normalized: String = raw
            .trim()
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();

        match normalized.as_str() {
            "jobseeker" => Some(Role::JobSeeker),
            "employer" => Some(Role::Employer),
            "admin" | "administrator" => Some(Role::Admin),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Role::JobSeeker => "jobseeker",
            Role::Employer => "employer",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// An authenticated actor with a resolved role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub id: PrincipalId,
    pub role: Role,
}

/// Display projection of a principal, used for denormalized views.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrincipalIdentity {
    pub id: PrincipalId,
    pub username: String,
    pub email: String,
}

/// What the auth provider knows about a token holder. The role reference is
/// raw; [`RoleResolver`] turns it into a [`Role`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: PrincipalId,
    pub username: String,
    pub email: String,
    pub raw_role: Option<String>,
}

impl AuthenticatedUser {
    pub fn identity(&self) -> PrincipalIdentity {
        PrincipalIdentity {
            id: self.id.clone(),
            username: self.username.clone(),
            email: self.email.clone(),
        }
    }
}

/// Errors raised while resolving identity or role.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("principal {principal} has no assigned role")]
    RoleNotFound { principal: PrincipalId },
    #[error("unrecognized role reference: {raw}")]
    UnknownRole { raw: String },
    #[error("identity provider unavailable: {0}")]
    Provider(String),
}

/// Token validation seam. Issuance, password hashing, and JWT internals live
/// behind this trait in the hosting service.
pub trait IdentityProvider: Send + Sync {
    fn authenticate(&self, token: &str) -> Result<Option<AuthenticatedUser>, IdentityError>;
}

/// Resolves a raw role reference into the closed [`Role`] enum.
#[derive(Debug, Clone, Copy, Default)]
pub struct RoleResolver;

impl RoleResolver {
    /// A missing role is an authorization failure for the caller, never a
    /// crash; so is a role string outside the closed set.
    pub fn resolve(&self, user: &AuthenticatedUser) -> Result<Role, IdentityError> {
        let raw = user
            .raw_role
            .as_deref()
            .ok_or_else(|| IdentityError::RoleNotFound {
                principal: user.id.clone(),
            })?;

        Role::parse(raw).ok_or_else(|| IdentityError::UnknownRole {
            raw: raw.to_string(),
        })
    }
}

/// Authentication failure surfaced to HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("authentication required")]
    Unauthenticated,
    #[error(transparent)]
    Identity(#[from] IdentityError),
}

/// Extract and authenticate the bearer principal from request headers.
pub fn authenticate<I>(provider: &I, headers: &HeaderMap) -> Result<Principal, AuthError>
where
    I: IdentityProvider + ?Sized,
{
    let token = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::Unauthenticated)?;

    let user = provider
        .authenticate(token)?
        .ok_or(AuthError::Unauthenticated)?;

    let role = RoleResolver.resolve(&user)?;

    Ok(Principal { id: user.id, role })
}

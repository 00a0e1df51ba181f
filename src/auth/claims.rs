// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! JWT claims and authenticated user representation.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::roles::Role;

/// Claims extracted from an identity-platform JWT.
///
/// The platform issues standard OIDC claims plus a metadata object
/// carrying the backoffice role.
#[derive(Debug, Clone, Deserialize)]
pub struct IdentityClaims {
    /// Subject (user ID) - the canonical platform user identifier
    pub sub: String,

    /// Issued at timestamp
    #[serde(default)]
    #[allow(dead_code)]
    pub iat: i64,

    /// Expiration timestamp
    #[serde(default)]
    pub exp: i64,

    /// Issuer (the identity platform instance URL)
    #[serde(default)]
    pub iss: String,

    /// Audience (validated by the jsonwebtoken crate, not read directly)
    #[serde(default)]
    #[allow(dead_code)]
    pub aud: Option<serde_json::Value>,

    /// Platform session ID
    #[serde(default)]
    pub sid: Option<String>,

    /// Public metadata containing the backoffice role
    #[serde(default, rename = "publicMetadata")]
    pub public_metadata: Option<PublicMetadata>,
}

/// Public metadata attached to the user by the identity platform.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PublicMetadata {
    /// Backoffice role (set in the platform's dashboard)
    #[serde(default)]
    pub role: Option<String>,
}

/// Authenticated staff member extracted from a verified JWT.
///
/// This is the primary type used throughout the application to represent
/// the authenticated user making a backoffice request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Canonical user ID (`sub` claim)
    pub user_id: String,

    /// Backoffice role
    pub role: Role,

    /// Session ID (if available)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,

    /// Original issuer (used for validation, not serialized)
    #[serde(skip)]
    pub issuer: String,

    /// Token expiration (Unix timestamp, used for validation, not serialized)
    #[serde(skip)]
    pub expires_at: i64,
}

impl AuthenticatedUser {
    /// Create from verified claims.
    pub fn from_claims(claims: IdentityClaims) -> Self {
        let role = claims
            .public_metadata
            .as_ref()
            .and_then(|m| m.role.as_ref())
            .and_then(|r| Role::from_str(r))
            .unwrap_or(Role::Handler);

        Self {
            user_id: claims.sub,
            role,
            session_id: claims.sid,
            issuer: claims.iss,
            expires_at: claims.exp,
        }
    }

    /// Check if the user has the required role.
    pub fn has_role(&self, required: Role) -> bool {
        self.role.has_privilege(required)
    }

    /// Check if this user is an admin.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_claims() -> IdentityClaims {
        IdentityClaims {
            sub: "user_123".to_string(),
            iat: 1700000000,
            exp: 1700003600,
            iss: "https://id.example.com".to_string(),
            aud: None,
            sid: Some("sess_abc".to_string()),
            public_metadata: Some(PublicMetadata {
                role: Some("admin".to_string()),
            }),
        }
    }

    #[test]
    fn from_claims_extracts_user_id() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.user_id, "user_123");
    }

    #[test]
    fn from_claims_extracts_role_from_metadata() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn from_claims_defaults_to_handler_role() {
        let mut claims = sample_claims();
        claims.public_metadata = None;
        let user = AuthenticatedUser::from_claims(claims);
        assert_eq!(user.role, Role::Handler);
    }

    #[test]
    fn has_role_checks_privilege() {
        let user = AuthenticatedUser::from_claims(sample_claims());
        assert!(user.has_role(Role::Admin));
        assert!(user.has_role(Role::Handler));
        assert!(user.is_admin());
    }
}

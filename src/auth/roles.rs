// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Backoffice roles for authorization.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Backoffice roles for authorization.
///
/// ## Role Hierarchy
///
/// - `Admin` - Full access, including identity disclosure on any case
/// - `Handler` - Case triage; identity disclosure only on assigned cases
/// - `Auditor` - Read-only access to audit logs, never identity data
///
/// Submitters have no role: the intake and lookup endpoints are
/// anonymous by design.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full administrative access
    Admin,
    /// Case handler (triage, assigned-case disclosure)
    Handler,
    /// Auditor (read-only audit logs)
    Auditor,
}

impl Role {
    /// Check if this role has at least the privileges of the required role.
    pub fn has_privilege(&self, required: Role) -> bool {
        match (self, required) {
            // Admin can do anything
            (Role::Admin, _) => true,
            (Role::Handler, Role::Handler) => true,
            (Role::Auditor, Role::Auditor) => true,
            _ => false,
        }
    }

    /// Parse role from string (case-insensitive).
    /// Used when extracting roles from identity-platform metadata.
    pub fn from_str(s: &str) -> Option<Role> {
        match s.to_lowercase().as_str() {
            "admin" => Some(Role::Admin),
            "handler" => Some(Role::Handler),
            "auditor" => Some(Role::Auditor),
            _ => None,
        }
    }
}

impl Default for Role {
    /// Default role is Handler (least privilege for authenticated staff).
    fn default() -> Self {
        Role::Handler
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Admin => write!(f, "admin"),
            Role::Handler => write!(f, "handler"),
            Role::Auditor => write!(f, "auditor"),
        }
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Disclosure authorization for submitter identity data.
//!
//! Decrypting a case's contact fields is the most sensitive operation in
//! the service. Every disclosure must pass through these checks: admins
//! may disclose any case, handlers only cases assigned to them, and no
//! other role may disclose at all. The cipher itself performs no
//! authorization; this is the single place the decision is made.

use crate::auth::{AuthenticatedUser, Role};

use super::{StorageError, StorageResult};

/// Trait for resources whose identity data can be disclosed to an
/// assigned handler.
pub trait AssignableResource {
    /// Internal identifier, used in denial errors.
    fn resource_id(&self) -> &str;

    /// The handler currently assigned, if any.
    fn assigned_user_id(&self) -> Option<&str>;
}

/// Trait for enforcing disclosure authorization.
pub trait DisclosureEnforcer {
    /// Verify that the user may view this resource's identity data.
    ///
    /// # Errors
    /// Returns `StorageError::PermissionDenied` if the user may not.
    fn verify_disclosure(&self, user: &AuthenticatedUser) -> StorageResult<()>;
}

impl<T: AssignableResource> DisclosureEnforcer for T {
    fn verify_disclosure(&self, user: &AuthenticatedUser) -> StorageResult<()> {
        let allowed = match user.role {
            Role::Admin => true,
            Role::Handler => self.assigned_user_id() == Some(user.user_id.as_str()),
            Role::Auditor => false,
        };

        if allowed {
            Ok(())
        } else {
            Err(StorageError::PermissionDenied {
                user_id: user.user_id.clone(),
                resource: format!("identity of case {}", self.resource_id()),
            })
        }
    }
}

impl AssignableResource for super::repository::StoredCase {
    fn resource_id(&self) -> &str {
        &self.id
    }

    fn assigned_user_id(&self) -> Option<&str> {
        self.assigned_to.as_deref()
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Case repository.
//!
//! Each case is stored as a separate JSON file under `<data>/cases/`.
//! The tracking code is the public lookup handle; its uniqueness is
//! enforced here at creation time (the generator alone cannot guarantee
//! it), and the intake handler retries code generation when `create`
//! reports a collision.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::crypto::{EncryptedField, TrackingCode};

use super::super::{FileStorage, StorageError, StorageResult};

/// Lifecycle status of a case.
///
/// `Closed` is terminal; there is no reopen transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    /// Submitted, not yet triaged.
    Pending,
    /// A handler has been assigned.
    Assigned,
    /// Under active investigation.
    InProgress,
    /// Resolved or dismissed.
    Closed,
}

impl CaseStatus {
    /// Whether a transition from `self` to `next` is allowed.
    pub fn can_transition_to(self, next: CaseStatus) -> bool {
        use CaseStatus::*;
        matches!(
            (self, next),
            (Pending, Assigned) | (Pending, Closed) | (Assigned, InProgress) | (Assigned, Closed) | (InProgress, Closed)
        )
    }
}

impl std::fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CaseStatus::Pending => "pending",
            CaseStatus::Assigned => "assigned",
            CaseStatus::InProgress => "in_progress",
            CaseStatus::Closed => "closed",
        };
        write!(f, "{label}")
    }
}

/// Encrypted submitter contact data.
///
/// Every present field is an independently encrypted value with its own
/// IV. Replaced as a whole when contact data changes; individual values
/// are never mutated in place.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq, Eq, Default)]
pub struct EncryptedContact {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<EncryptedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<EncryptedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<EncryptedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<EncryptedField>,
}

impl EncryptedContact {
    /// Whether any contact field is present.
    pub fn is_empty(&self) -> bool {
        self.email.is_none()
            && self.full_name.is_none()
            && self.phone.is_none()
            && self.address.is_none()
    }
}

/// A case stored in the case store.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, PartialEq)]
pub struct StoredCase {
    /// Unique case identifier (UUID).
    pub id: String,
    /// Public tracking code (unique, immutable, assigned once).
    pub tracking_code: TrackingCode,
    /// Report category label.
    pub category: String,
    /// Report body as submitted.
    pub description: String,
    /// Lifecycle status.
    pub status: CaseStatus,
    /// Handler user ID, once assigned.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Encrypted contact data; absent for fully anonymous submissions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<EncryptedContact>,
    /// True only on records imported from the historical plain-Base64
    /// path; cleared by the legacy-upgrade maintenance operation.
    #[serde(default)]
    pub legacy_encoding: bool,
    /// When the case was submitted.
    pub created_at: DateTime<Utc>,
    /// When the case last changed.
    pub updated_at: DateTime<Utc>,
    /// When the case was closed (if it has been).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

/// Repository for case operations on the file store.
pub struct CaseRepository<'a> {
    storage: &'a FileStorage,
}

impl<'a> CaseRepository<'a> {
    /// Create a new CaseRepository.
    pub fn new(storage: &'a FileStorage) -> Self {
        Self { storage }
    }

    /// Check if a case exists.
    pub fn exists(&self, case_id: &str) -> bool {
        self.storage.exists(self.storage.paths().case(case_id))
    }

    /// Get a case by ID.
    pub fn get(&self, case_id: &str) -> StorageResult<StoredCase> {
        let path = self.storage.paths().case(case_id);
        if !self.storage.exists(&path) {
            return Err(StorageError::NotFound(format!("Case {case_id}")));
        }
        self.storage.read_json(path)
    }

    /// Get a case by its tracking code (exact match).
    pub fn find_by_tracking_code(&self, code: &TrackingCode) -> StorageResult<StoredCase> {
        let case_ids = self
            .storage
            .list_files(self.storage.paths().cases_dir(), "json")?;

        for id in case_ids {
            if let Ok(case) = self.get(&id) {
                if case.tracking_code == *code {
                    return Ok(case);
                }
            }
        }

        Err(StorageError::NotFound(format!(
            "Case with tracking code {code}"
        )))
    }

    /// Create a new case.
    ///
    /// Rejects a duplicate tracking code with `AlreadyExists`; the
    /// intake flow treats that as a collision and retries with a freshly
    /// generated code.
    pub fn create(&self, case: &StoredCase) -> StorageResult<()> {
        let case_id = &case.id;

        if self.exists(case_id) {
            return Err(StorageError::AlreadyExists(format!("Case {case_id}")));
        }

        if self.find_by_tracking_code(&case.tracking_code).is_ok() {
            return Err(StorageError::AlreadyExists(format!(
                "Case with tracking code {}",
                case.tracking_code
            )));
        }

        self.storage
            .write_json(self.storage.paths().case(case_id), case)
    }

    /// Update an existing case.
    pub fn update(&self, case: &StoredCase) -> StorageResult<()> {
        let case_id = &case.id;

        if !self.exists(case_id) {
            return Err(StorageError::NotFound(format!("Case {case_id}")));
        }

        self.storage
            .write_json(self.storage.paths().case(case_id), case)
    }

    /// Advance a case's lifecycle status.
    ///
    /// Returns `SerializationError` for an invalid transition so the API
    /// layer can report it as caller-correctable.
    pub fn set_status(&self, case_id: &str, next: CaseStatus) -> StorageResult<StoredCase> {
        let mut case = self.get(case_id)?;

        if !case.status.can_transition_to(next) {
            return Err(StorageError::SerializationError(format!(
                "invalid status transition {} -> {next}",
                case.status
            )));
        }

        case.status = next;
        case.updated_at = Utc::now();
        if next == CaseStatus::Closed {
            case.closed_at = Some(case.updated_at);
        }

        self.update(&case)?;
        Ok(case)
    }

    /// Assign a handler to a case.
    ///
    /// A pending case moves to `Assigned` automatically; a closed case
    /// cannot be assigned.
    pub fn assign(&self, case_id: &str, handler_user_id: &str) -> StorageResult<StoredCase> {
        let mut case = self.get(case_id)?;

        if case.status == CaseStatus::Closed {
            return Err(StorageError::SerializationError(
                "cannot assign a closed case".to_string(),
            ));
        }

        case.assigned_to = Some(handler_user_id.to_string());
        if case.status == CaseStatus::Pending {
            case.status = CaseStatus::Assigned;
        }
        case.updated_at = Utc::now();

        self.update(&case)?;
        Ok(case)
    }

    /// List all cases.
    pub fn list_all(&self) -> StorageResult<Vec<StoredCase>> {
        let case_ids = self
            .storage
            .list_files(self.storage.paths().cases_dir(), "json")?;

        let mut cases = Vec::new();
        for id in case_ids {
            if let Ok(case) = self.get(&id) {
                cases.push(case);
            }
        }

        // Newest first for backoffice listings.
        cases.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(cases)
    }

    /// List cases with a specific status.
    pub fn list_by_status(&self, status: CaseStatus) -> StorageResult<Vec<StoredCase>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|c| c.status == status)
            .collect())
    }

    /// List cases still carrying the historical plain-Base64 encoding.
    pub fn list_legacy(&self) -> StorageResult<Vec<StoredCase>> {
        Ok(self
            .list_all()?
            .into_iter()
            .filter(|c| c.legacy_encoding)
            .collect())
    }
}

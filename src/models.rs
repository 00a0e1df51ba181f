// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! # API Data Models
//!
//! Request and response data structures used by the REST API. All types
//! derive `Serialize`, `Deserialize`, and `ToSchema` for automatic JSON
//! handling and OpenAPI documentation.
//!
//! ## Model Categories
//!
//! - **Intake**: anonymous report submission
//! - **Lookup**: public status query by tracking code
//! - **Cases**: backoffice views (summaries, detail, identity disclosure)
//!
//! Identity data appears in exactly one response type,
//! [`CaseIdentityResponse`], which only the disclosure endpoint returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::crypto::TrackingCode;
use crate::storage::{CaseStatus, StoredCase};

// =============================================================================
// Intake Models
// =============================================================================

/// Plaintext contact details supplied by a submitter.
///
/// All fields are optional; a submission with none (or no `contact`
/// object at all) is fully anonymous. Values exist in memory only until
/// they are encrypted.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema, Default)]
pub struct ContactDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Request to submit a new report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportRequest {
    /// Report category label.
    pub category: String,
    /// Report body.
    pub description: String,
    /// Optional contact details (encrypted before storage).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactDetails>,
}

/// Response after submitting a report.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct SubmitReportResponse {
    /// The tracking code for anonymous status lookup. Shown exactly
    /// once; it cannot be recovered later.
    pub tracking_code: TrackingCode,
    /// Message indicating success.
    pub message: String,
}

// =============================================================================
// Lookup Models
// =============================================================================

/// Public status of a case, keyed by tracking code.
///
/// Deliberately contains no identity data and no report content: the
/// tracking code alone must never unlock more than lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PublicStatusResponse {
    /// The tracking code that was looked up (normalized form).
    pub tracking_code: TrackingCode,
    /// Current lifecycle status.
    pub status: CaseStatus,
    /// When the case was submitted.
    pub submitted_at: DateTime<Utc>,
    /// When the case last changed.
    pub last_update: DateTime<Utc>,
}

// =============================================================================
// Backoffice Models
// =============================================================================

/// Case summary for backoffice listings.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseSummary {
    /// Internal case identifier.
    pub id: String,
    /// Public tracking code.
    pub tracking_code: TrackingCode,
    /// Report category.
    pub category: String,
    /// Lifecycle status.
    pub status: CaseStatus,
    /// Assigned handler, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Whether encrypted contact data exists for this case.
    pub has_contact: bool,
    /// When the case was submitted.
    pub created_at: DateTime<Utc>,
}

impl From<StoredCase> for CaseSummary {
    fn from(case: StoredCase) -> Self {
        let has_contact = case.contact.as_ref().is_some_and(|c| !c.is_empty());
        Self {
            id: case.id,
            tracking_code: case.tracking_code,
            category: case.category,
            status: case.status,
            assigned_to: case.assigned_to,
            has_contact,
            created_at: case.created_at,
        }
    }
}

/// Full case detail for the backoffice, without identity data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseDetail {
    /// Internal case identifier.
    pub id: String,
    /// Public tracking code.
    pub tracking_code: TrackingCode,
    /// Report category.
    pub category: String,
    /// Report body.
    pub description: String,
    /// Lifecycle status.
    pub status: CaseStatus,
    /// Assigned handler, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    /// Whether encrypted contact data exists for this case.
    pub has_contact: bool,
    /// When the case was submitted.
    pub created_at: DateTime<Utc>,
    /// When the case last changed.
    pub updated_at: DateTime<Utc>,
    /// When the case was closed (if it has been).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closed_at: Option<DateTime<Utc>>,
}

impl From<StoredCase> for CaseDetail {
    fn from(case: StoredCase) -> Self {
        let has_contact = case.contact.as_ref().is_some_and(|c| !c.is_empty());
        Self {
            id: case.id,
            tracking_code: case.tracking_code,
            category: case.category,
            description: case.description,
            status: case.status,
            assigned_to: case.assigned_to,
            has_contact,
            created_at: case.created_at,
            updated_at: case.updated_at,
            closed_at: case.closed_at,
        }
    }
}

/// One disclosed contact field.
///
/// `unavailable` is set instead of `value` when the stored field failed
/// to decrypt; the field is never silently replaced with placeholder
/// text that could be mistaken for real data.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DisclosedField {
    /// Decrypted plaintext, present on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// True when the stored value could not be decrypted.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub unavailable: bool,
}

impl DisclosedField {
    /// A successfully decrypted field.
    pub fn available(value: String) -> Self {
        Self {
            value: Some(value),
            unavailable: false,
        }
    }

    /// A field whose decryption failed.
    pub fn failed() -> Self {
        Self {
            value: None,
            unavailable: true,
        }
    }
}

/// Decrypted submitter identity for an authorized disclosure.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CaseIdentityResponse {
    /// Internal case identifier.
    pub case_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<DisclosedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<DisclosedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<DisclosedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<DisclosedField>,
}

/// Request to change a case's lifecycle status.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// The status to transition to.
    pub status: CaseStatus,
}

/// Request to assign a handler to a case.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AssignCaseRequest {
    /// User ID of the handler to assign.
    pub handler_user_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::EncryptedField;
    use crate::storage::EncryptedContact;

    fn stored_case(contact: Option<EncryptedContact>) -> StoredCase {
        StoredCase {
            id: "case-1".to_string(),
            tracking_code: TrackingCode::parse("DEN-AB12CD34").unwrap(),
            category: "fraud".to_string(),
            description: "description".to_string(),
            status: CaseStatus::Pending,
            assigned_to: None,
            contact,
            legacy_encoding: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
        }
    }

    #[test]
    fn summary_reports_contact_presence() {
        let without = CaseSummary::from(stored_case(None));
        assert!(!without.has_contact);

        let empty = CaseSummary::from(stored_case(Some(EncryptedContact::default())));
        assert!(!empty.has_contact);

        let with = CaseSummary::from(stored_case(Some(EncryptedContact {
            email: Some(EncryptedField::new("AAECAw==".to_string())),
            ..Default::default()
        })));
        assert!(with.has_contact);
    }

    #[test]
    fn disclosed_field_serialization() {
        let ok = DisclosedField::available("user@example.com".to_string());
        let json = serde_json::to_value(&ok).unwrap();
        assert_eq!(json, serde_json::json!({"value": "user@example.com"}));

        let failed = DisclosedField::failed();
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json, serde_json::json!({"unavailable": true}));
    }

    #[test]
    fn detail_never_carries_encrypted_contact() {
        let detail = CaseDetail::from(stored_case(Some(EncryptedContact {
            email: Some(EncryptedField::new("AAECAw==".to_string())),
            ..Default::default()
        })));
        let json = serde_json::to_string(&detail).unwrap();
        assert!(!json.contains("AAECAw=="));
        assert!(json.contains("\"has_contact\":true"));
    }
}

// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Public report intake and tracking-code lookup.
//!
//! Both endpoints are anonymous. Intake encrypts every supplied contact
//! field before the case record is written; lookup validates the code
//! shape before the store is queried and returns lifecycle status only.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    crypto::{FieldCipher, SensitiveField, TrackingCode},
    error::ApiError,
    models::{ContactDetails, PublicStatusResponse, SubmitReportRequest, SubmitReportResponse},
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, CaseRepository, CaseStatus, EncryptedContact,
        StorageError, StoredCase,
    },
};

/// Maximum accepted category length.
const MAX_CATEGORY_LEN: usize = 100;

/// Maximum accepted description length.
const MAX_DESCRIPTION_LEN: usize = 20_000;

/// Attempts to allocate a unique tracking code before giving up.
const MAX_CODE_ATTEMPTS: usize = 5;

#[derive(Deserialize, IntoParams)]
pub struct LookupQuery {
    pub tracking_code: String,
}

/// Submit a new report.
///
/// Contact details, when present, are encrypted field-by-field before
/// the case record is persisted; the plaintext is dropped when this
/// handler returns. The generated tracking code is returned exactly once.
#[utoipa::path(
    post,
    path = "/v1/reports",
    tag = "Reports",
    request_body = SubmitReportRequest,
    responses(
        (status = 201, description = "Report submitted", body = SubmitReportResponse),
        (status = 400, description = "Invalid submission"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn submit_report(
    State(state): State<AppState>,
    Json(request): Json<SubmitReportRequest>,
) -> Result<(StatusCode, Json<SubmitReportResponse>), ApiError> {
    let category = request.category.trim().to_string();
    if category.is_empty() || category.chars().count() > MAX_CATEGORY_LEN {
        return Err(ApiError::bad_request("Invalid category"));
    }

    let description = request.description.trim().to_string();
    if description.is_empty() || description.chars().count() > MAX_DESCRIPTION_LEN {
        return Err(ApiError::bad_request("Invalid description"));
    }

    // Keep the plaintext email around for the receipt notification; it is
    // the only copy that survives past encryption, and only inside the
    // send task.
    let receipt_email = request
        .contact
        .as_ref()
        .and_then(|c| c.email.as_ref())
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty());

    let contact = match &request.contact {
        Some(details) => encrypt_contact(&state.cipher, details)?,
        None => None,
    };

    let storage = state.storage();
    let repo = CaseRepository::new(&storage);
    let now = Utc::now();

    // The generator is a random draw; the repository enforces tracking
    // code uniqueness and we retry generation on a collision.
    let mut stored = None;
    for _ in 0..MAX_CODE_ATTEMPTS {
        let case = StoredCase {
            id: uuid::Uuid::new_v4().to_string(),
            tracking_code: TrackingCode::generate(),
            category: category.clone(),
            description: description.clone(),
            status: CaseStatus::Pending,
            assigned_to: None,
            contact: contact.clone(),
            legacy_encoding: false,
            created_at: now,
            updated_at: now,
            closed_at: None,
        };

        match repo.create(&case) {
            Ok(()) => {
                stored = Some(case);
                break;
            }
            Err(StorageError::AlreadyExists(_)) => continue,
            Err(e) => {
                return Err(ApiError::internal(format!("Failed to store report: {e}")));
            }
        }
    }

    let case = stored.ok_or_else(|| {
        ApiError::internal("Failed to allocate a unique tracking code".to_string())
    })?;

    // Anonymous submission: audit carries the case id, never the submitter.
    let audit = AuditRepository::new(&storage);
    let _ = audit.log(
        &AuditEvent::new(AuditEventType::CaseSubmitted)
            .with_resource("case", &case.id)
            .with_details(serde_json::json!({
                "category": case.category,
                "anonymous": case.contact.is_none(),
            })),
    );

    // Notifications are fire-and-forget: a mail failure must never fail
    // or delay the submission.
    if let Some(mailer) = &state.mailer {
        let mailer = mailer.clone();
        let code = case.tracking_code.as_str().to_string();
        let category = case.category.clone();
        tokio::spawn(async move {
            if let Some(email) = receipt_email {
                if let Err(e) = mailer.send_submission_receipt(&email, &code).await {
                    tracing::warn!(error = %e, "Failed to send submission receipt");
                }
            }
            if let Err(e) = mailer.notify_admin_new_case(&code, &category).await {
                tracing::warn!(error = %e, "Failed to send admin notification");
            }
        });
    }

    tracing::info!(case_id = %case.id, "Report submitted");

    let response = SubmitReportResponse {
        tracking_code: case.tracking_code,
        message: "Report submitted successfully".to_string(),
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Look up a case's public status by tracking code.
///
/// Input is trimmed and uppercased before validation, so padded or
/// lowercase codes still resolve. This path never touches contact data.
#[utoipa::path(
    get,
    path = "/v1/reports/lookup",
    params(LookupQuery),
    tag = "Reports",
    responses(
        (status = 200, description = "Case status", body = PublicStatusResponse),
        (status = 400, description = "Malformed tracking code"),
        (status = 404, description = "No case with that tracking code")
    )
)]
pub async fn lookup_report(
    State(state): State<AppState>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<PublicStatusResponse>, ApiError> {
    let code = TrackingCode::parse(&params.tracking_code)
        .map_err(|_| ApiError::bad_request("Malformed tracking code"))?;

    let storage = state.storage();
    let repo = CaseRepository::new(&storage);
    let case = repo
        .find_by_tracking_code(&code)
        .map_err(|_| ApiError::not_found("No case found for that tracking code"))?;

    Ok(Json(PublicStatusResponse {
        tracking_code: case.tracking_code,
        status: case.status,
        submitted_at: case.created_at,
        last_update: case.updated_at,
    }))
}

/// Encrypt the supplied contact fields.
///
/// Empty values are treated as absent; a submission with only empty
/// contact values is stored as fully anonymous.
fn encrypt_contact(
    cipher: &FieldCipher,
    details: &ContactDetails,
) -> Result<Option<EncryptedContact>, ApiError> {
    if let Some(email) = non_empty(&details.email) {
        if !looks_like_email(email) {
            return Err(ApiError::bad_request("Invalid contact email"));
        }
    }

    let contact = EncryptedContact {
        email: encrypt_optional(cipher, &details.email)?,
        full_name: encrypt_optional(cipher, &details.full_name)?,
        phone: encrypt_optional(cipher, &details.phone)?,
        address: encrypt_optional(cipher, &details.address)?,
    };

    if contact.is_empty() {
        Ok(None)
    } else {
        Ok(Some(contact))
    }
}

fn encrypt_optional(
    cipher: &FieldCipher,
    value: &Option<String>,
) -> Result<Option<crate::crypto::EncryptedField>, ApiError> {
    let Some(raw) = non_empty(value) else {
        return Ok(None);
    };

    let field = SensitiveField::new(raw)
        .map_err(|e| ApiError::bad_request(format!("Invalid contact field: {e}")))?;

    let encrypted = cipher
        .encrypt(&field)
        .map_err(|e| ApiError::internal(format!("Field encryption failed: {e}")))?;

    Ok(Some(encrypted))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Minimal shape check before accepting a contact email.
fn looks_like_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !value.contains(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::FieldCipher;
    use crate::state::{AppState, AuthConfig};
    use crate::storage::{FileStorage, StoragePaths};
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use tempfile::TempDir;

    fn create_test_state() -> (AppState, TempDir) {
        let temp = TempDir::new().expect("Failed to create temp dir");
        let paths = StoragePaths::new(temp.path());
        let mut storage = FileStorage::new(paths);
        storage.initialize().expect("Failed to initialize storage");

        let state = AppState::new(storage, FieldCipher::from_bytes([0x42; 32]))
            .with_auth_config(AuthConfig::default());
        (state, temp)
    }

    fn submit_request(contact: Option<ContactDetails>) -> SubmitReportRequest {
        SubmitReportRequest {
            category: "fraud".to_string(),
            description: "Invoices are routinely inflated before approval.".to_string(),
            contact,
        }
    }

    #[tokio::test]
    async fn submit_returns_tracking_code() {
        let (state, _temp) = create_test_state();

        let (status, Json(response)) =
            submit_report(State(state.clone()), Json(submit_request(None)))
                .await
                .expect("submission succeeds");

        assert_eq!(status, StatusCode::CREATED);
        assert!(response.tracking_code.as_str().starts_with("DEN-"));
    }

    #[tokio::test]
    async fn stored_contact_is_really_encrypted() {
        let (state, _temp) = create_test_state();
        let email = "user@example.com";

        let (_, Json(response)) = submit_report(
            State(state.clone()),
            Json(submit_request(Some(ContactDetails {
                email: Some(email.to_string()),
                ..Default::default()
            }))),
        )
        .await
        .expect("submission succeeds");

        let storage = state.storage();
        let repo = CaseRepository::new(&storage);
        let case = repo.find_by_tracking_code(&response.tracking_code).unwrap();

        let stored = case
            .contact
            .as_ref()
            .and_then(|c| c.email.as_ref())
            .expect("email stored");

        // Neither the plaintext nor a plain Base64 encoding of it:
        // actual encryption, not just encoding.
        assert_ne!(stored.as_str(), email);
        assert_ne!(stored.as_str(), STANDARD.encode(email));

        // And it decrypts back to exactly the submitted address.
        let decrypted = state.cipher.decrypt(stored).unwrap();
        assert_eq!(decrypted.as_str(), email);
    }

    #[tokio::test]
    async fn empty_contact_fields_stored_as_anonymous() {
        let (state, _temp) = create_test_state();

        let (_, Json(response)) = submit_report(
            State(state.clone()),
            Json(submit_request(Some(ContactDetails {
                email: Some("   ".to_string()),
                full_name: Some(String::new()),
                ..Default::default()
            }))),
        )
        .await
        .expect("submission succeeds");

        let storage = state.storage();
        let repo = CaseRepository::new(&storage);
        let case = repo.find_by_tracking_code(&response.tracking_code).unwrap();
        assert!(case.contact.is_none());
    }

    #[tokio::test]
    async fn invalid_email_rejected() {
        let (state, _temp) = create_test_state();

        let result = submit_report(
            State(state.clone()),
            Json(submit_request(Some(ContactDetails {
                email: Some("not-an-email".to_string()),
                ..Default::default()
            }))),
        )
        .await;

        match result {
            Err(err) => assert_eq!(err.status, StatusCode::BAD_REQUEST),
            Ok(_) => panic!("expected rejection of malformed email"),
        }
    }

    #[tokio::test]
    async fn blank_category_and_description_rejected() {
        let (state, _temp) = create_test_state();

        let mut request = submit_request(None);
        request.category = "   ".to_string();
        let result = submit_report(State(state.clone()), Json(request)).await;
        assert!(result.is_err());

        let mut request = submit_request(None);
        request.description = String::new();
        let result = submit_report(State(state.clone()), Json(request)).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn lookup_normalizes_input() {
        let (state, _temp) = create_test_state();

        let (_, Json(submitted)) =
            submit_report(State(state.clone()), Json(submit_request(None)))
                .await
                .expect("submission succeeds");

        // Whitespace-padded lowercase input still resolves.
        let padded = format!("  {}  ", submitted.tracking_code.as_str().to_lowercase());
        let Json(found) = lookup_report(
            State(state.clone()),
            Query(LookupQuery {
                tracking_code: padded,
            }),
        )
        .await
        .expect("lookup succeeds");

        assert_eq!(found.tracking_code, submitted.tracking_code);
        assert_eq!(found.status, CaseStatus::Pending);
    }

    #[tokio::test]
    async fn lookup_rejects_malformed_code() {
        let (state, _temp) = create_test_state();

        let result = lookup_report(
            State(state.clone()),
            Query(LookupQuery {
                tracking_code: "garbage".to_string(),
            }),
        )
        .await;

        match result {
            Err(err) => assert_eq!(err.status, StatusCode::BAD_REQUEST),
            Ok(_) => panic!("expected rejection of malformed code"),
        }
    }

    #[tokio::test]
    async fn lookup_unknown_code_is_not_found() {
        let (state, _temp) = create_test_state();

        let result = lookup_report(
            State(state.clone()),
            Query(LookupQuery {
                tracking_code: "DEN-ZZZZ9999".to_string(),
            }),
        )
        .await;

        match result {
            Err(err) => assert_eq!(err.status, StatusCode::NOT_FOUND),
            Ok(_) => panic!("expected not found"),
        }
    }

    #[tokio::test]
    async fn repeated_submissions_get_distinct_codes() {
        let (state, _temp) = create_test_state();

        let (_, Json(first)) = submit_report(State(state.clone()), Json(submit_request(None)))
            .await
            .unwrap();
        let (_, Json(second)) = submit_report(State(state.clone()), Json(submit_request(None)))
            .await
            .unwrap();

        assert_ne!(first.tracking_code, second.tracking_code);
    }
}

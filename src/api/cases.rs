// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Backoffice case management endpoints.
//!
//! Listing and detail views never expose identity data; decryption
//! happens only in the disclosure endpoint, behind the assignment-based
//! authorization check, and every disclosure is audit-logged.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::{
    audit_log,
    auth::{AdminOnly, Auth, Role},
    crypto::{CipherError, EncryptedField, FieldCipher},
    error::ApiError,
    models::{
        AssignCaseRequest, CaseDetail, CaseIdentityResponse, CaseSummary, DisclosedField,
        UpdateStatusRequest,
    },
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, CaseRepository, CaseStatus,
        DisclosureEnforcer, StorageError,
    },
};

#[derive(Deserialize, IntoParams)]
pub struct CaseListQuery {
    /// Filter by lifecycle status.
    pub status: Option<CaseStatus>,
}

/// List cases for the backoffice.
#[utoipa::path(
    get,
    path = "/v1/admin/cases",
    params(CaseListQuery),
    tag = "Cases",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Case summaries", body = Vec<CaseSummary>),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_cases(
    Auth(_user): Auth,
    State(state): State<AppState>,
    Query(params): Query<CaseListQuery>,
) -> Result<Json<Vec<CaseSummary>>, ApiError> {
    let storage = state.storage();
    let repo = CaseRepository::new(&storage);

    let cases = match params.status {
        Some(status) => repo.list_by_status(status),
        None => repo.list_all(),
    }
    .map_err(|e| ApiError::internal(format!("Failed to list cases: {e}")))?;

    Ok(Json(cases.into_iter().map(CaseSummary::from).collect()))
}

/// Get a case's full detail (without identity data).
#[utoipa::path(
    get,
    path = "/v1/admin/cases/{case_id}",
    params(("case_id" = String, Path, description = "Case ID")),
    tag = "Cases",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Case detail", body = CaseDetail),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn get_case(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseDetail>, ApiError> {
    let storage = state.storage();
    let repo = CaseRepository::new(&storage);

    let case = repo
        .get(&case_id)
        .map_err(|_| ApiError::not_found("Case not found"))?;

    audit_log!(&storage, AuditEventType::CaseViewed, &user, "case", &case_id);

    Ok(Json(CaseDetail::from(case)))
}

/// Disclose a case's submitter identity.
///
/// Decrypts the stored contact fields for an authorized viewer: admins
/// for any case, handlers only for cases assigned to them. A field that
/// fails decryption is reported as unavailable, never substituted.
#[utoipa::path(
    get,
    path = "/v1/admin/cases/{case_id}/identity",
    params(("case_id" = String, Path, description = "Case ID")),
    tag = "Cases",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Decrypted contact data", body = CaseIdentityResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized for this case"),
        (status = 404, description = "Case not found")
    )
)]
pub async fn get_case_identity(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(case_id): Path<String>,
) -> Result<Json<CaseIdentityResponse>, ApiError> {
    let storage = state.storage();
    let repo = CaseRepository::new(&storage);

    let case = repo
        .get(&case_id)
        .map_err(|_| ApiError::not_found("Case not found"))?;

    if let Err(e) = case.verify_disclosure(&user) {
        let audit = AuditRepository::new(&storage);
        let _ = audit.log(
            &AuditEvent::new(AuditEventType::PermissionDenied)
                .with_user(&user.user_id)
                .with_resource("case", &case_id)
                .failed(e.to_string()),
        );
        return Err(ApiError::forbidden(
            "Not authorized to view this case's identity data",
        ));
    }

    let contact = case.contact.as_ref();
    let response = CaseIdentityResponse {
        case_id: case.id.clone(),
        email: disclose(&state.cipher, contact.and_then(|c| c.email.as_ref()), &case_id, "email"),
        full_name: disclose(
            &state.cipher,
            contact.and_then(|c| c.full_name.as_ref()),
            &case_id,
            "full_name",
        ),
        phone: disclose(&state.cipher, contact.and_then(|c| c.phone.as_ref()), &case_id, "phone"),
        address: disclose(
            &state.cipher,
            contact.and_then(|c| c.address.as_ref()),
            &case_id,
            "address",
        ),
    };

    audit_log!(
        &storage,
        AuditEventType::IdentityDisclosed,
        &user,
        "case",
        &case_id
    );

    Ok(Json(response))
}

/// Advance a case's lifecycle status.
#[utoipa::path(
    put,
    path = "/v1/admin/cases/{case_id}/status",
    params(("case_id" = String, Path, description = "Case ID")),
    tag = "Cases",
    security(("bearer_auth" = [])),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Updated case", body = CaseDetail),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized for this case"),
        (status = 404, description = "Case not found"),
        (status = 422, description = "Invalid status transition")
    )
)]
pub async fn update_case_status(
    Auth(user): Auth,
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(request): Json<UpdateStatusRequest>,
) -> Result<Json<CaseDetail>, ApiError> {
    let storage = state.storage();
    let repo = CaseRepository::new(&storage);

    let case = repo
        .get(&case_id)
        .map_err(|_| ApiError::not_found("Case not found"))?;

    // Admins manage any case; handlers only cases assigned to them.
    let allowed = match user.role {
        Role::Admin => true,
        Role::Handler => case.assigned_to.as_deref() == Some(user.user_id.as_str()),
        Role::Auditor => false,
    };
    if !allowed {
        return Err(ApiError::forbidden("Not authorized to manage this case"));
    }

    let updated = repo.set_status(&case_id, request.status).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found("Case not found"),
        StorageError::SerializationError(msg) => ApiError::unprocessable(msg),
        other => ApiError::internal(format!("Failed to update status: {other}")),
    })?;

    audit_log!(
        &storage,
        AuditEventType::StatusChanged,
        &user,
        "case",
        &case_id
    );

    Ok(Json(CaseDetail::from(updated)))
}

/// Assign a handler to a case. Admin only.
#[utoipa::path(
    put,
    path = "/v1/admin/cases/{case_id}/assign",
    params(("case_id" = String, Path, description = "Case ID")),
    tag = "Cases",
    security(("bearer_auth" = [])),
    request_body = AssignCaseRequest,
    responses(
        (status = 200, description = "Updated case", body = CaseDetail),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)"),
        (status = 404, description = "Case not found"),
        (status = 422, description = "Case cannot be assigned")
    )
)]
pub async fn assign_case(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
    Path(case_id): Path<String>,
    Json(request): Json<AssignCaseRequest>,
) -> Result<Json<CaseDetail>, ApiError> {
    let handler = request.handler_user_id.trim();
    if handler.is_empty() {
        return Err(ApiError::bad_request("Handler user ID is required"));
    }

    let storage = state.storage();
    let repo = CaseRepository::new(&storage);

    let updated = repo.assign(&case_id, handler).map_err(|e| match e {
        StorageError::NotFound(_) => ApiError::not_found("Case not found"),
        StorageError::SerializationError(msg) => ApiError::unprocessable(msg),
        other => ApiError::internal(format!("Failed to assign case: {other}")),
    })?;

    audit_log!(
        &storage,
        AuditEventType::CaseAssigned,
        &user,
        "case",
        &case_id
    );

    Ok(Json(CaseDetail::from(updated)))
}

/// Decrypt one stored field into its disclosure representation.
///
/// `None` in → `None` out (field was never supplied). A decryption
/// failure is surfaced as an unavailable field and logged without any
/// plaintext, per the cipher's contract.
fn disclose(
    cipher: &FieldCipher,
    field: Option<&EncryptedField>,
    case_id: &str,
    label: &str,
) -> Option<DisclosedField> {
    let field = field?;
    match cipher.decrypt(field) {
        Ok(plaintext) => Some(DisclosedField::available(plaintext.into_string())),
        Err(CipherError::DecryptionFailure(reason)) => {
            tracing::error!(case_id, field = label, reason, "Contact field failed to decrypt");
            Some(DisclosedField::failed())
        }
        Err(e) => {
            tracing::error!(case_id, field = label, error = %e, "Contact field failed to decrypt");
            Some(DisclosedField::failed())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AuthenticatedUser;
    use crate::crypto::{FieldCipher, SensitiveField, TrackingCode};
    use crate::state::{AppState, AuthConfig};
    use crate::storage::{EncryptedContact, FileStorage, StoragePaths, StoredCase};
    use axum::http::StatusCode;
    use chrono::Utc;
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

    fn auth(user_id: &str, role: Role) -> Auth {
        Auth(AuthenticatedUser {
            user_id: user_id.to_string(),
            role,
            session_id: None,
            issuer: "test".to_string(),
            expires_at: 0,
        })
    }

    fn admin(user_id: &str) -> AdminOnly {
        AdminOnly(AuthenticatedUser {
            user_id: user_id.to_string(),
            role: Role::Admin,
            session_id: None,
            issuer: "test".to_string(),
            expires_at: 0,
        })
    }

    fn seed_case(state: &AppState, id: &str, code: &str, email: Option<&str>) -> StoredCase {
        let contact = email.map(|e| EncryptedContact {
            email: Some(
                state
                    .cipher
                    .encrypt(&SensitiveField::new(e).unwrap())
                    .unwrap(),
            ),
            ..Default::default()
        });

        let case = StoredCase {
            id: id.to_string(),
            tracking_code: TrackingCode::parse(code).unwrap(),
            category: "fraud".to_string(),
            description: "Ledgers do not reconcile.".to_string(),
            status: CaseStatus::Pending,
            assigned_to: None,
            contact,
            legacy_encoding: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            closed_at: None,
        };

        let storage = state.storage();
        CaseRepository::new(&storage).create(&case).unwrap();
        case
    }

    #[tokio::test]
    async fn list_and_filter_cases() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-1", "DEN-LIST0001", None);
        seed_case(&state, "case-2", "DEN-LIST0002", None);

        let storage = state.storage();
        CaseRepository::new(&storage)
            .set_status("case-2", CaseStatus::Closed)
            .unwrap();

        let Json(all) = list_cases(
            auth("admin-1", Role::Admin),
            State(state.clone()),
            Query(CaseListQuery { status: None }),
        )
        .await
        .unwrap();
        assert_eq!(all.len(), 2);

        let Json(closed) = list_cases(
            auth("admin-1", Role::Admin),
            State(state.clone()),
            Query(CaseListQuery {
                status: Some(CaseStatus::Closed),
            }),
        )
        .await
        .unwrap();
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].id, "case-2");
    }

    #[tokio::test]
    async fn detail_marks_contact_without_exposing_it() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-c", "DEN-DETAIL01", Some("user@example.com"));

        let Json(detail) = get_case(
            auth("admin-1", Role::Admin),
            State(state.clone()),
            Path("case-c".to_string()),
        )
        .await
        .unwrap();

        assert!(detail.has_contact);
        let json = serde_json::to_string(&detail).unwrap();
        assert!(!json.contains("user@example.com"));
    }

    #[tokio::test]
    async fn admin_discloses_identity() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-i", "DEN-IDENT001", Some("user@example.com"));

        let Json(identity) = get_case_identity(
            auth("admin-1", Role::Admin),
            State(state.clone()),
            Path("case-i".to_string()),
        )
        .await
        .unwrap();

        let email = identity.email.expect("email disclosed");
        assert_eq!(email.value.as_deref(), Some("user@example.com"));
        assert!(!email.unavailable);
        assert!(identity.phone.is_none());
    }

    #[tokio::test]
    async fn handler_disclosure_requires_assignment() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-h", "DEN-HANDLE01", Some("user@example.com"));

        // Unassigned handler is refused.
        let result = get_case_identity(
            auth("handler-1", Role::Handler),
            State(state.clone()),
            Path("case-h".to_string()),
        )
        .await;
        match result {
            Err(err) => assert_eq!(err.status, StatusCode::FORBIDDEN),
            Ok(_) => panic!("expected forbidden"),
        }

        // After assignment the same handler may disclose.
        let storage = state.storage();
        CaseRepository::new(&storage)
            .assign("case-h", "handler-1")
            .unwrap();

        let Json(identity) = get_case_identity(
            auth("handler-1", Role::Handler),
            State(state.clone()),
            Path("case-h".to_string()),
        )
        .await
        .unwrap();
        assert_eq!(
            identity.email.unwrap().value.as_deref(),
            Some("user@example.com")
        );
    }

    #[tokio::test]
    async fn auditor_never_discloses() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-a", "DEN-AUDIT001", Some("user@example.com"));

        let result = get_case_identity(
            auth("auditor-1", Role::Auditor),
            State(state.clone()),
            Path("case-a".to_string()),
        )
        .await;
        match result {
            Err(err) => assert_eq!(err.status, StatusCode::FORBIDDEN),
            Ok(_) => panic!("expected forbidden"),
        }
    }

    #[tokio::test]
    async fn tampered_field_reported_unavailable() {
        let (state, _temp) = create_test_state();
        let mut case = seed_case(&state, "case-t", "DEN-TAMPER01", Some("user@example.com"));

        // Corrupt the stored ciphertext wholesale.
        case.contact = Some(EncryptedContact {
            email: Some(crate::crypto::EncryptedField::new("!!not-base64!!".to_string())),
            ..Default::default()
        });
        let storage = state.storage();
        CaseRepository::new(&storage).update(&case).unwrap();

        let Json(identity) = get_case_identity(
            auth("admin-1", Role::Admin),
            State(state.clone()),
            Path("case-t".to_string()),
        )
        .await
        .unwrap();

        let email = identity.email.expect("field present");
        assert!(email.unavailable);
        assert!(email.value.is_none());
    }

    #[tokio::test]
    async fn status_transitions_via_api() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-s", "DEN-STATUS01", None);

        // pending -> in_progress is not allowed
        let result = update_case_status(
            auth("admin-1", Role::Admin),
            State(state.clone()),
            Path("case-s".to_string()),
            Json(UpdateStatusRequest {
                status: CaseStatus::InProgress,
            }),
        )
        .await;
        match result {
            Err(err) => assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY),
            Ok(_) => panic!("expected invalid transition"),
        }

        let Json(detail) = update_case_status(
            auth("admin-1", Role::Admin),
            State(state.clone()),
            Path("case-s".to_string()),
            Json(UpdateStatusRequest {
                status: CaseStatus::Assigned,
            }),
        )
        .await
        .unwrap();
        assert_eq!(detail.status, CaseStatus::Assigned);
    }

    #[tokio::test]
    async fn handler_cannot_touch_unassigned_case_status() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-u", "DEN-UNASSGN1", None);

        let result = update_case_status(
            auth("handler-1", Role::Handler),
            State(state.clone()),
            Path("case-u".to_string()),
            Json(UpdateStatusRequest {
                status: CaseStatus::Closed,
            }),
        )
        .await;
        match result {
            Err(err) => assert_eq!(err.status, StatusCode::FORBIDDEN),
            Ok(_) => panic!("expected forbidden"),
        }
    }

    #[tokio::test]
    async fn assign_endpoint_sets_handler() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-as", "DEN-ASSIGN01", None);

        let Json(detail) = assign_case(
            admin("admin-1"),
            State(state.clone()),
            Path("case-as".to_string()),
            Json(AssignCaseRequest {
                handler_user_id: "handler-7".to_string(),
            }),
        )
        .await
        .unwrap();

        assert_eq!(detail.assigned_to.as_deref(), Some("handler-7"));
        assert_eq!(detail.status, CaseStatus::Assigned);
    }

    #[tokio::test]
    async fn assign_requires_handler_id() {
        let (state, _temp) = create_test_state();
        seed_case(&state, "case-e", "DEN-ASSIGN02", None);

        let result = assign_case(
            admin("admin-1"),
            State(state.clone()),
            Path("case-e".to_string()),
            Json(AssignCaseRequest {
                handler_user_id: "  ".to_string(),
            }),
        )
        .await;
        match result {
            Err(err) => assert_eq!(err.status, StatusCode::BAD_REQUEST),
            Ok(_) => panic!("expected bad request"),
        }
    }
}

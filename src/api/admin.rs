// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

//! Admin-only API endpoints for system management.
//!
//! These endpoints require the Admin role and provide:
//! - System statistics
//! - Audit log queries
//! - Detailed health information
//! - Maintenance tooling (legacy record upgrade)

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::{
    audit_log,
    auth::AdminOnly,
    crypto::{legacy, SensitiveField},
    error::ApiError,
    state::AppState,
    storage::{
        AuditEvent, AuditEventType, AuditRepository, CaseRepository, CaseStatus, EncryptedContact,
    },
};

// ============================================================================
// Request/Response Types
// ============================================================================

/// System statistics response.
#[derive(Debug, Serialize, ToSchema)]
pub struct SystemStatsResponse {
    /// Total number of cases.
    pub total_cases: usize,
    /// Cases awaiting triage.
    pub pending_cases: usize,
    /// Cases with a handler assigned.
    pub assigned_cases: usize,
    /// Cases under active investigation.
    pub in_progress_cases: usize,
    /// Closed cases.
    pub closed_cases: usize,
    /// Cases submitted with contact data.
    pub cases_with_contact: usize,
    /// Cases still carrying the historical plain-Base64 encoding.
    pub legacy_cases: usize,
    /// Server uptime in seconds.
    pub uptime_seconds: u64,
    /// Current timestamp.
    pub timestamp: String,
}

/// Query parameters for audit log queries.
#[derive(Debug, Deserialize, IntoParams)]
pub struct AuditQueryParams {
    /// Start date (YYYY-MM-DD format).
    pub start_date: Option<String>,
    /// End date (YYYY-MM-DD format).
    pub end_date: Option<String>,
    /// Filter by user ID.
    pub user_id: Option<String>,
    /// Filter by event type.
    pub event_type: Option<String>,
    /// Filter by resource ID.
    pub resource_id: Option<String>,
    /// Maximum number of results (default 100).
    pub limit: Option<usize>,
    /// Offset for pagination.
    pub offset: Option<usize>,
}

/// Response for audit log queries.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuditLogResponse {
    /// Audit events matching the query.
    pub events: Vec<AuditEvent>,
    /// Total count (before limit/offset).
    pub total: usize,
    /// Whether there are more results.
    pub has_more: bool,
}

/// Detailed health check response for admins.
#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Storage health.
    pub storage: StorageHealth,
    /// Auth configuration status.
    pub auth_configured: bool,
    /// Whether the mailer is configured.
    pub mail_configured: bool,
    /// Server version.
    pub version: String,
}

/// Storage health details.
#[derive(Debug, Serialize, ToSchema)]
pub struct StorageHealth {
    /// Data directory path.
    pub data_dir: String,
    /// Whether the data directory exists.
    pub exists: bool,
    /// Whether the data directory is writable.
    pub writable: bool,
    /// Total number of stored cases.
    pub total_cases: usize,
}

/// Response for the legacy upgrade maintenance operation.
#[derive(Debug, Serialize, ToSchema)]
pub struct LegacyUpgradeResponse {
    /// Legacy records found.
    pub scanned: usize,
    /// Records successfully re-encrypted.
    pub upgraded: usize,
    /// Records left untouched because a field failed to decode.
    pub failed: usize,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get system statistics.
///
/// Returns aggregate case counts and uptime. Admin only.
#[utoipa::path(
    get,
    path = "/v1/admin/stats",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "System statistics", body = SystemStatsResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn get_system_stats(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<SystemStatsResponse>, ApiError> {
    let storage = state.storage();
    let repo = CaseRepository::new(&storage);

    let all_cases = repo.list_all().unwrap_or_default();
    let count_status =
        |status: CaseStatus| all_cases.iter().filter(|c| c.status == status).count();

    let cases_with_contact = all_cases
        .iter()
        .filter(|c| c.contact.as_ref().is_some_and(|ct| !ct.is_empty()))
        .count();
    let legacy_cases = all_cases.iter().filter(|c| c.legacy_encoding).count();

    audit_log!(&storage, AuditEventType::AdminAccess, &user);

    let uptime = (Utc::now() - state.started_at).num_seconds().max(0) as u64;

    Ok(Json(SystemStatsResponse {
        total_cases: all_cases.len(),
        pending_cases: count_status(CaseStatus::Pending),
        assigned_cases: count_status(CaseStatus::Assigned),
        in_progress_cases: count_status(CaseStatus::InProgress),
        closed_cases: count_status(CaseStatus::Closed),
        cases_with_contact,
        legacy_cases,
        uptime_seconds: uptime,
        timestamp: Utc::now().to_rfc3339(),
    }))
}

/// Query audit logs.
///
/// Search and filter audit log entries. Supports date range, user ID,
/// event type, and resource filtering. Admin only.
#[utoipa::path(
    get,
    path = "/v1/admin/audit/events",
    tag = "Admin",
    params(AuditQueryParams),
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Audit events", body = AuditLogResponse),
        (status = 400, description = "Invalid query parameters"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn query_audit_logs(
    AdminOnly(admin_user): AdminOnly,
    Query(params): Query<AuditQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<AuditLogResponse>, ApiError> {
    let storage = state.storage();
    let audit_repo = AuditRepository::new(&storage);

    // Default date range: today only
    let today = Utc::now().format("%Y-%m-%d").to_string();
    let start_date = params.start_date.as_deref().unwrap_or(&today);
    let end_date = params.end_date.as_deref().unwrap_or(&today);

    NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid start_date format. Use YYYY-MM-DD."))?;
    NaiveDate::parse_from_str(end_date, "%Y-%m-%d")
        .map_err(|_| ApiError::bad_request("Invalid end_date format. Use YYYY-MM-DD."))?;

    let mut events = audit_repo
        .read_events_range(start_date, end_date)
        .unwrap_or_default();

    if let Some(user_id) = &params.user_id {
        events.retain(|e| e.user_id.as_deref() == Some(user_id.as_str()));
    }

    if let Some(event_type) = &params.event_type {
        events.retain(|e| {
            let type_str = serde_json::to_string(&e.event_type)
                .unwrap_or_default()
                .trim_matches('"')
                .to_string();
            type_str == *event_type
        });
    }

    if let Some(resource_id) = &params.resource_id {
        events.retain(|e| e.resource_id.as_deref() == Some(resource_id.as_str()));
    }

    let total = events.len();
    let limit = params.limit.unwrap_or(100).min(1000); // Max 1000
    let offset = params.offset.unwrap_or(0);

    let has_more = offset + limit < total;
    let events: Vec<AuditEvent> = events.into_iter().skip(offset).take(limit).collect();

    audit_log!(&storage, AuditEventType::AdminAccess, &admin_user);

    Ok(Json(AuditLogResponse {
        events,
        total,
        has_more,
    }))
}

/// Get detailed health information.
///
/// Returns comprehensive health status including storage metrics.
/// More detailed than the public health endpoint. Admin only.
#[utoipa::path(
    get,
    path = "/v1/admin/health",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Detailed health status", body = DetailedHealthResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn get_detailed_health(
    AdminOnly(_user): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<DetailedHealthResponse>, ApiError> {
    let storage = state.storage();
    let data_dir = storage.paths().root().to_string_lossy().to_string();

    let exists = storage.paths().root().exists();
    let writable = storage.health_check().is_ok();

    let total_cases = storage
        .list_files(storage.paths().cases_dir(), "json")
        .map(|ids| ids.len())
        .unwrap_or(0);

    let auth_configured = state.auth_config.jwks.is_some();
    let mail_configured = state.mailer.is_some();

    Ok(Json(DetailedHealthResponse {
        status: if exists && writable { "healthy" } else { "degraded" }.to_string(),
        storage: StorageHealth {
            data_dir,
            exists,
            writable,
            total_cases,
        },
        auth_configured,
        mail_configured,
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}

/// Re-encrypt records stored with the historical plain-Base64 encoding.
///
/// Decodes each legacy contact field and replaces it with a properly
/// encrypted value; records whose fields fail to decode are left
/// untouched and counted in the response. Admin only.
#[utoipa::path(
    post,
    path = "/v1/admin/maintenance/legacy-upgrade",
    tag = "Admin",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Upgrade summary", body = LegacyUpgradeResponse),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Not authorized (admin required)")
    )
)]
pub async fn upgrade_legacy_records(
    AdminOnly(user): AdminOnly,
    State(state): State<AppState>,
) -> Result<Json<LegacyUpgradeResponse>, ApiError> {
    let storage = state.storage();
    let repo = CaseRepository::new(&storage);

    let legacy_cases = repo
        .list_legacy()
        .map_err(|e| ApiError::internal(format!("Failed to scan cases: {e}")))?;

    let scanned = legacy_cases.len();
    let mut upgraded = 0;
    let mut failed = 0;

    for mut case in legacy_cases {
        let contact = match case.contact.take() {
            Some(contact) => contact,
            None => {
                // Nothing to re-encrypt; just clear the flag.
                case.legacy_encoding = false;
                case.updated_at = Utc::now();
                if repo.update(&case).is_ok() {
                    upgraded += 1;
                } else {
                    failed += 1;
                }
                continue;
            }
        };

        match reencrypt_contact(&state, &contact) {
            Ok(new_contact) => {
                case.contact = Some(new_contact);
                case.legacy_encoding = false;
                case.updated_at = Utc::now();
                match repo.update(&case) {
                    Ok(()) => {
                        upgraded += 1;
                        audit_log!(
                            &storage,
                            AuditEventType::LegacyUpgraded,
                            &user,
                            "case",
                            &case.id
                        );
                    }
                    Err(e) => {
                        failed += 1;
                        tracing::error!(case_id = %case.id, error = %e, "Legacy upgrade write failed");
                    }
                }
            }
            Err(reason) => {
                failed += 1;
                tracing::error!(case_id = %case.id, reason, "Legacy upgrade decode failed");
            }
        }
    }

    tracing::info!(scanned, upgraded, failed, "Legacy upgrade finished");

    Ok(Json(LegacyUpgradeResponse {
        scanned,
        upgraded,
        failed,
    }))
}

/// Decode every legacy field of a contact and re-encrypt it.
///
/// All-or-nothing per record: a single undecodable field leaves the
/// whole record on the legacy path rather than half-migrated.
fn reencrypt_contact(
    state: &AppState,
    contact: &EncryptedContact,
) -> Result<EncryptedContact, &'static str> {
    let upgrade = |field: &Option<crate::crypto::EncryptedField>| -> Result<Option<crate::crypto::EncryptedField>, &'static str> {
        let Some(stored) = field else {
            return Ok(None);
        };
        let plaintext = legacy::decode(stored.as_str()).map_err(|_| "legacy decode failed")?;
        let sensitive = SensitiveField::new(&plaintext).map_err(|_| "legacy value invalid")?;
        let encrypted = state
            .cipher
            .encrypt(&sensitive)
            .map_err(|_| "re-encryption failed")?;
        Ok(Some(encrypted))
    };

    Ok(EncryptedContact {
        email: upgrade(&contact.email)?,
        full_name: upgrade(&contact.full_name)?,
        phone: upgrade(&contact.phone)?,
        address: upgrade(&contact.address)?,
    })
}

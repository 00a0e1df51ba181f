// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Clearline Contributors

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    models::{
        AssignCaseRequest, CaseDetail, CaseIdentityResponse, CaseSummary, ContactDetails,
        DisclosedField, PublicStatusResponse, SubmitReportRequest, SubmitReportResponse,
        UpdateStatusRequest,
    },
    state::AppState,
};

pub mod admin;
pub mod cases;
pub mod health;
pub mod reports;

pub fn router(state: AppState) -> Router {
    let v1_routes = Router::new()
        // Public, anonymous endpoints
        .route("/reports", post(reports::submit_report))
        .route("/reports/lookup", get(reports::lookup_report))
        // Backoffice endpoints (Bearer JWT)
        .route("/admin/cases", get(cases::list_cases))
        .route("/admin/cases/{case_id}", get(cases::get_case))
        .route("/admin/cases/{case_id}/identity", get(cases::get_case_identity))
        .route("/admin/cases/{case_id}/status", put(cases::update_case_status))
        .route("/admin/cases/{case_id}/assign", put(cases::assign_case))
        .route("/admin/stats", get(admin::get_system_stats))
        .route("/admin/audit/events", get(admin::query_audit_logs))
        .route("/admin/health", get(admin::get_detailed_health))
        .route(
            "/admin/maintenance/legacy-upgrade",
            post(admin::upgrade_legacy_records),
        )
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest("/v1", v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        reports::submit_report,
        reports::lookup_report,
        cases::list_cases,
        cases::get_case,
        cases::get_case_identity,
        cases::update_case_status,
        cases::assign_case,
        admin::get_system_stats,
        admin::query_audit_logs,
        admin::get_detailed_health,
        admin::upgrade_legacy_records,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            SubmitReportRequest,
            SubmitReportResponse,
            ContactDetails,
            PublicStatusResponse,
            CaseSummary,
            CaseDetail,
            CaseIdentityResponse,
            DisclosedField,
            UpdateStatusRequest,
            AssignCaseRequest,
            admin::SystemStatsResponse,
            admin::AuditLogResponse,
            admin::DetailedHealthResponse,
            admin::StorageHealth,
            admin::LegacyUpgradeResponse,
            health::ReadyResponse,
            health::HealthChecks,
            health::HealthResponse,
            crate::storage::AuditEvent,
            crate::storage::AuditEventType,
            crate::storage::CaseStatus,
            crate::crypto::TrackingCode
        )
    ),
    tags(
        (name = "Reports", description = "Anonymous report intake and status lookup"),
        (name = "Cases", description = "Backoffice case management"),
        (name = "Admin", description = "System management and maintenance"),
        (name = "Health", description = "Service health probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::FieldCipher;
    use crate::storage::{FileStorage, StoragePaths};
    use tempfile::TempDir;

    #[tokio::test]
    async fn router_builds_with_all_routes() {
        let temp = TempDir::new().unwrap();
        let mut storage = FileStorage::new(StoragePaths::new(temp.path()));
        storage.initialize().unwrap();
        let state = AppState::new(storage, FieldCipher::from_bytes([0u8; 32]));

        let app = router(state);
        // Ensure the router can be converted into a service without panicking.
        let _ = app.into_make_service();
    }
}

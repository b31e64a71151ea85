//! Report and selection API endpoints

use std::sync::Arc;

use axum::{
    Json as JsonExtractor,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
};

use outagemap::dedup::{Selection, SelectionOutcome};
use outagemap::guard::AnonymousGuard;

use crate::{
    api::{
        auth::{DeviceId, MaybeIdentity, SignedIn},
        dto::{ClassifyRequest, CreateReportRequest, ReportDto},
    },
    error::{ServerError, ServerResult},
    state::AppState,
};

/// Guard for anonymous callers that identify their device
fn anonymous_guard(
    state: &AppState,
    identity: &MaybeIdentity,
    device: &DeviceId,
) -> Option<Arc<AnonymousGuard>> {
    match (&identity.0, &device.0) {
        (None, Some(device_id)) => Some(state.device_guard(device_id)),
        _ => None,
    }
}

/// Create a new report
#[utoipa::path(
    post,
    path = "/api/reports",
    tag = "reports",
    request_body = CreateReportRequest,
    responses(
        (status = 201, description = "Report created successfully", body = ReportDto),
        (status = 400, description = "Invalid report"),
        (status = 401, description = "Sign in required"),
        (status = 503, description = "Report store unavailable")
    )
)]
pub async fn create_report(
    State(state): State<Arc<AppState>>,
    SignedIn(identity): SignedIn,
    JsonExtractor(request): JsonExtractor<CreateReportRequest>,
) -> Result<(StatusCode, Json<ReportDto>), ServerError> {
    let new_report = request.into_new_report()?;
    let report = state.service.create_report(&identity, new_report).await?;

    tracing::info!(report_id = %report.id, user = %identity.id, "Report created via API");
    Ok((StatusCode::CREATED, Json(ReportDto::from(report))))
}

/// List all reports, newest first
#[utoipa::path(
    get,
    path = "/api/reports",
    tag = "reports",
    responses(
        (status = 200, description = "All reports", body = Vec<ReportDto>),
        (status = 503, description = "Report store unavailable")
    )
)]
pub async fn list_reports(State(state): State<Arc<AppState>>) -> ServerResult<Json<Vec<ReportDto>>> {
    let reports = state.service.list_reports().await?;
    Ok(Json(reports.into_iter().map(ReportDto::from).collect()))
}

/// Get a report by ID
#[utoipa::path(
    get,
    path = "/api/reports/{id}",
    tag = "reports",
    params(
        ("id" = String, Path, description = "Report ID")
    ),
    responses(
        (status = 200, description = "Report found", body = ReportDto),
        (status = 404, description = "Report not found")
    )
)]
pub async fn get_report(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ServerResult<Json<ReportDto>> {
    let report = state.service.get_report(&id).await?;
    Ok(Json(ReportDto::from(report)))
}

/// Confirm a report.
///
/// Signed-in callers are deduplicated by user id. Anonymous callers are
/// deduplicated per `X-Device-Id`; without the header every request counts.
#[utoipa::path(
    post,
    path = "/api/reports/{id}/confirm",
    tag = "reports",
    params(
        ("id" = String, Path, description = "Report ID"),
        ("X-Device-Id" = Option<String>, Header, description = "Anonymous device id")
    ),
    responses(
        (status = 200, description = "Confirmed, already confirmed or vanished", body = serde_json::Value),
        (status = 503, description = "Report store unavailable")
    )
)]
pub async fn confirm_report(
    State(state): State<Arc<AppState>>,
    identity: MaybeIdentity,
    device: DeviceId,
    Path(id): Path<String>,
) -> ServerResult<Json<SelectionOutcome>> {
    let guard = anonymous_guard(&state, &identity, &device);
    let outcome = state
        .service
        .confirm_report(&id, identity.0.as_ref(), guard.as_deref())
        .await?;
    Ok(Json(outcome))
}

/// Classify a picked point for a draft report
#[utoipa::path(
    post,
    path = "/api/selections/classify",
    tag = "selections",
    request_body = ClassifyRequest,
    responses(
        (status = 200, description = "The classified selection", body = serde_json::Value),
        (status = 400, description = "Incomplete draft"),
        (status = 503, description = "Report store unavailable; the draft and point are returned")
    )
)]
pub async fn classify_selection(
    State(state): State<Arc<AppState>>,
    JsonExtractor(request): JsonExtractor<ClassifyRequest>,
) -> ServerResult<Json<Selection>> {
    let draft = request.draft()?;
    let selection = state.service.classify(request.point(), &draft).await?;
    Ok(Json(selection))
}

/// Apply a classified selection
#[utoipa::path(
    post,
    path = "/api/selections/resolve",
    tag = "selections",
    request_body = serde_json::Value,
    params(
        ("X-Device-Id" = Option<String>, Header, description = "Anonymous device id")
    ),
    responses(
        (status = 200, description = "The outcome of the selection", body = serde_json::Value),
        (status = 400, description = "Invalid selection"),
        (status = 503, description = "Report store unavailable; the draft and point are returned")
    )
)]
pub async fn resolve_selection(
    State(state): State<Arc<AppState>>,
    identity: MaybeIdentity,
    device: DeviceId,
    JsonExtractor(selection): JsonExtractor<Selection>,
) -> ServerResult<Json<SelectionOutcome>> {
    let guard = anonymous_guard(&state, &identity, &device);
    let outcome = state
        .service
        .resolve(&selection, identity.0.as_ref(), guard.as_deref())
        .await?;

    tracing::debug!(action = selection.action.name(), "Selection resolved via API");
    Ok(Json(outcome))
}

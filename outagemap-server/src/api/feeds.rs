//! Status and nearby feed endpoints

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Json,
};
use chrono::Utc;

use crate::{
    api::dto::{NearbyParams, NearbyReportDto, ServiceStatusDto},
    error::ServerResult,
    state::AppState,
};

/// Recent report counts per service type
#[utoipa::path(
    get,
    path = "/api/feeds/status",
    tag = "feeds",
    responses(
        (status = 200, description = "One entry per service type", body = Vec<ServiceStatusDto>),
        (status = 503, description = "Report store unavailable")
    )
)]
pub async fn service_status(
    State(state): State<Arc<AppState>>,
) -> ServerResult<Json<Vec<ServiceStatusDto>>> {
    let status = state.service.service_status(Utc::now()).await?;
    Ok(Json(status.into_iter().map(ServiceStatusDto::from).collect()))
}

/// Recent reports near a point, nearest first
#[utoipa::path(
    get,
    path = "/api/feeds/nearby",
    tag = "feeds",
    params(NearbyParams),
    responses(
        (status = 200, description = "Nearby reports", body = Vec<NearbyReportDto>),
        (status = 400, description = "Invalid origin"),
        (status = 503, description = "Report store unavailable")
    )
)]
pub async fn nearby_reports(
    State(state): State<Arc<AppState>>,
    Query(params): Query<NearbyParams>,
) -> ServerResult<Json<Vec<NearbyReportDto>>> {
    let now = Utc::now();
    let nearby = state.service.nearby_reports(params.origin()?, now).await?;
    Ok(Json(
        nearby
            .into_iter()
            .map(|entry| NearbyReportDto::new(entry, now))
            .collect(),
    ))
}

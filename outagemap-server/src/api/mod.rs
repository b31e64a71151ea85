//! API implementation for the OutageMap HTTP server

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    middleware,
    response::Json,
    routing::{get, post},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{state::AppState, websocket::websocket_handler};

pub mod auth;
pub mod dto;
pub mod feeds;
pub mod reports;

use auth::auth_middleware;

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        reports::create_report,
        reports::list_reports,
        reports::get_report,
        reports::confirm_report,
        reports::classify_selection,
        reports::resolve_selection,
        feeds::service_status,
        feeds::nearby_reports,
        health_check,
    ),
    components(
        schemas(
            dto::ReportDto,
            dto::CreateReportRequest,
            dto::ClassifyRequest,
            dto::ServiceStatusDto,
            dto::NearbyReportDto,
            dto::ErrorResponse,
        )
    ),
    tags(
        (name = "reports", description = "Outage report endpoints"),
        (name = "selections", description = "Classify a picked point and confirm, merge or create"),
        (name = "feeds", description = "Service status and nearby feeds"),
        (name = "health", description = "Service health"),
        (name = "websocket", description = "WebSocket realtime snapshots"),
    ),
    info(
        title = "OutageMap API",
        version = "1.0.0",
        description = "RESTful API for community outage reports. Reports at the same spot for the same service are confirmed or merged instead of duplicated.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "/api", description = "API base path")
    )
)]
pub struct ApiDoc;

/// Create the main router with all API endpoints
pub fn create_router(state: Arc<AppState>) -> Router {
    let api_router = Router::new()
        // Report endpoints
        .route("/reports", get(reports::list_reports))
        .route("/reports", post(reports::create_report))
        .route("/reports/{id}", get(reports::get_report))
        .route("/reports/{id}/confirm", post(reports::confirm_report))
        // Selection endpoints
        .route("/selections/classify", post(reports::classify_selection))
        .route("/selections/resolve", post(reports::resolve_selection))
        // Feed endpoints
        .route("/feeds/status", get(feeds::service_status))
        .route("/feeds/nearby", get(feeds::nearby_reports))
        // WebSocket endpoint
        .route("/ws", get(websocket_handler))
        .route("/health", get(health_check))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state);

    let swagger_router = SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi());

    Router::new().nest("/api", api_router).merge(swagger_router)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "health",
    responses(
        (status = 200, description = "Service health", body = serde_json::Value)
    )
)]
async fn health_check(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let store_healthy = match state.service.health_check().await {
        Ok(healthy) => healthy,
        Err(e) => {
            tracing::warn!("Store health check failed: {}", e);
            false
        }
    };

    Json(serde_json::json!({
        "status": if store_healthy { "OK" } else { "DEGRADED" },
        "version": outagemap::VERSION,
        "store": store_healthy,
        "websocket_connections": state.websocket_connection_count(),
    }))
}

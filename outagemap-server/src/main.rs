use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use outagemap::{config::LoggingConfig, logging, service::ReportService};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};
use tracing::info;

use outagemap_server::{AppState, cli::CliArgs, config::ServerConfig, create_router};

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    // Logging comes first so configuration warnings are visible
    let mut logging_config = LoggingConfig::default();
    if let Some(level) = &cli_args.log_level {
        logging_config.level = logging::parse_log_level(level)?;
    }
    logging::init(&logging_config)?;

    info!("Starting OutageMap server v{}", outagemap::VERSION);

    let server_config = ServerConfig::from_cli_and_env(cli_args)?;
    info!("Server configuration loaded");

    let library_config = server_config.library_config()?;
    info!(
        engine = ?library_config.storage.engine,
        data_dir = %library_config.storage.data_dir.display(),
        "Opening report store"
    );

    let service = ReportService::from_config(&library_config).await?;
    info!("Report service initialized");

    let app_state = Arc::new(AppState::new(service, server_config.clone()));

    let app = create_router(app_state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(RequestBodyLimitLayer::new(server_config.max_request_size)),
    );

    let addr = SocketAddr::from(([0, 0, 0, 0], server_config.port));
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on {}", addr);
    info!("API documentation available at http://{}/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

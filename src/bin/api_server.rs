// src/bin/api_server.rs

use std::sync::Arc;
use talk_ledger::infra::{logging, AppConfig, StorageBackend};
use talk_ledger::transport;
use talk_ledger::{ImportFormat, MemoryCatalog, PgCatalog, Storage};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let config = AppConfig::from_env()?;
    logging::init(config.json_logs);

    // --- Storage Initialization ---
    let storage = match config.backend {
        StorageBackend::Postgres => {
            let url = config.database_url.as_deref().unwrap_or_default();
            info!(max_connections = config.db_max_connections, "connecting to postgres");
            let catalog = PgCatalog::connect(url, config.db_max_connections).await?;
            Storage::from_backend(Arc::new(catalog))
        }
        StorageBackend::Memory => {
            warn!("STORAGE_BACKEND=memory: data is lost on shutdown");
            Storage::from_backend(Arc::new(MemoryCatalog::new()))
        }
    };

    let app_state = transport::http::AppState::new(
        &storage,
        config.influence_strategy,
        ImportFormat::default(),
    )
    .with_upload_limit(config.max_upload_bytes);
    info!(strategy = %config.influence_strategy, "services initialized");

    // --- API Server Initialization ---
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(cors);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("API server listening on http://{}", config.bind_addr);
    info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown signal received");
            }
        })
        .await?;

    info!("graceful shutdown complete");
    Ok(())
}

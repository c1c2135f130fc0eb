// src/bin/api_server.rs

use anyhow::Context;
use granja_api::app::{self, AccountService, RecordService, ReportService};
use granja_api::auth::{JwtConfig, LocalAuth};
use granja_api::infra::{telemetry, AppConfig, StorageBackend};
use granja_api::transport;
use granja_api::{EntityRegistry, PgStore, SchemaRegistry, Store};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _telemetry = telemetry::init();

    let config = AppConfig::from_env()?;
    tracing::info!(
        bind = %config.bind_addr,
        storage = ?config.storage,
        production = config.production,
        "starting granja-api"
    );

    // --- Validation + entity registries (read-only after startup) ---
    let schemas = SchemaRegistry::standard();
    let entities = Arc::new(EntityRegistry::standard(&schemas)?);
    tracing::info!(entities = entities.list().len(), "entity registry ready");

    // --- Storage ---
    let store: Arc<dyn Store> = match config.storage {
        StorageBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set")?;
            let pg = PgStore::connect(url, config.db_max_connections)
                .await
                .context("could not connect to Postgres")?;
            if config.run_migrations {
                pg.run_migrations().await.context("migrations failed")?;
                tracing::info!("migrations applied");
            }
            Arc::new(pg)
        }
        StorageBackend::Memory => {
            tracing::warn!("using in-memory storage; data is lost on shutdown");
            Arc::new(app::memory_store(&entities))
        }
    };
    store.ping().await.context("storage is not reachable")?;

    // --- Services ---
    let auth = Arc::new(LocalAuth::new(
        store.clone(),
        JwtConfig {
            secret: config.jwt_secret.clone(),
            access_token_ttl: chrono::Duration::minutes(config.jwt_ttl_minutes),
            ..JwtConfig::default()
        },
    ));
    let app_state = transport::http::AppState {
        store: store.clone(),
        records: RecordService::new(store.clone(), entities.clone()),
        accounts: AccountService::new(store.clone(), auth),
        reports: ReportService::new(store.clone()),
        production: config.production,
    };

    // --- API Server ---
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = transport::http::create_router(app_state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", transport::http::ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(cors);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!("API server listening on http://{}", config.bind_addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown signal received");
        })
        .await?;

    tracing::info!("graceful shutdown complete");
    Ok(())
}

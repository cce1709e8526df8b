//!
//! REST server for booking EV charging slots.
//! Reads configuration from TOML file (~/.config/ev-booking/config.toml).

use std::sync::Arc;

use sea_orm_migration::MigratorTrait;
use tracing::{error, info, warn};

use ev_booking::api::handlers::AppState;
use ev_booking::application::services::{
    start_daily_reset_task, AllocationService, LifecycleService, ProvisioningService,
};
use ev_booking::auth::middleware::AuthState;
use ev_booking::auth::JwtConfig;
use ev_booking::config::AppConfig;
use ev_booking::domain::RepositoryProvider;
use ev_booking::infrastructure::database::migrator::Migrator;
use ev_booking::{
    create_api_router, default_config_path, init_database, DatabaseConfig,
    SeaOrmRepositoryProvider, ShutdownSignal,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("EV_BOOKING_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let app_cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting EV Booking Service...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");
    info!("📊 Prometheus metrics recorder installed");

    let db_config = DatabaseConfig {
        url: app_cfg.database.connection_url(),
    };
    info!("Database: {}", db_config.url);

    let jwt_config = JwtConfig::from(&app_cfg.security);

    // ── Database ───────────────────────────────────────────────
    let db = match init_database(&db_config).await {
        Ok(db) => db,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e.into());
        }
    };

    info!("Running database migrations...");
    if let Err(e) = Migrator::up(&db, None).await {
        error!("Failed to run migrations: {}", e);
        return Err(e.into());
    }
    info!("Migrations completed");

    let repos: Arc<dyn RepositoryProvider> = Arc::new(SeaOrmRepositoryProvider::new(db.clone()));

    // ── Services ───────────────────────────────────────────────
    let allocation = Arc::new(AllocationService::new(repos.clone(), &app_cfg.booking));
    let lifecycle = Arc::new(LifecycleService::new(repos.clone()));
    let provisioning = Arc::new(ProvisioningService::new(repos.clone(), &app_cfg.booking));

    // Shutdown signal listening for SIGTERM/SIGINT
    let shutdown = ShutdownSignal::new();
    shutdown.start_signal_listener();

    // Midnight sweep: cancel no-shows and clear the slot pool
    let reset_task = start_daily_reset_task(repos.clone(), shutdown.clone());

    let api_router = create_api_router(
        AppState {
            repos,
            allocation,
            lifecycle,
            provisioning,
        },
        AuthState { jwt_config },
        prometheus_handle,
    );

    // ── REST server with graceful shutdown ─────────────────────
    let api_addr = format!("{}:{}", app_cfg.server.host, app_cfg.server.port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("REST API server listening on http://{}", api_addr);
    info!("Swagger UI available at http://{}/docs/", api_addr);

    let api_shutdown = shutdown.clone();
    let server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
        api_shutdown.wait().await;
        info!("🛑 REST API server received shutdown signal");
    });

    info!("🚀 Server started. Press Ctrl+C to shutdown gracefully.");
    if let Err(e) = server.await {
        error!("REST API server error: {}", e);
    }

    // Stop background tasks before closing the database
    shutdown.trigger();
    if let Err(e) = reset_task.await {
        warn!("Daily reset task panicked: {}", e);
    }

    info!("🧹 Performing final cleanup...");
    if let Err(e) = db.close().await {
        warn!("Error closing database connection: {}", e);
    } else {
        info!("✅ Database connection closed");
    }

    info!("👋 EV Booking Service shutdown complete");
    Ok(())
}

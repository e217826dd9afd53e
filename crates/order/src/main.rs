use anyhow::{Context, Result};
use order::{config::myconfig::Config, handler::AppRouter, state::AppState};
use shared::{
    config::ConnectionManager,
    utils::{Telemetry, TelemetryProviders, init_logger},
};
use sqlx::{Pool, Postgres};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    let (config, state, providers) = setup().await.context("Failed to setup application")?;

    let served = AppRouter::serve(config.port, state)
        .await
        .context("Failed to start server");

    info!("🛑 Shutting down order service...");

    if let Err(e) = providers.shutdown() {
        error!("Failed to shutdown telemetry: {e}");
    }

    served
}

async fn setup() -> Result<(Config, AppState, TelemetryProviders)> {
    dotenv::dotenv().ok();

    let config = Config::init().context("Failed to load configuration")?;

    let telemetry = Telemetry::new("order-service", config.otel_endpoint.clone());
    let providers = telemetry.init().context("Failed to initialize telemetry")?;

    init_logger(
        providers.logger.clone(),
        "order-service",
        config.is_dev,
        config.enable_file_log,
    );

    let db_pool = ConnectionManager::new_pool(
        &config.database_url,
        config.db_min_conn,
        config.db_max_conn,
    )
    .await
    .context("Failed to initialize database pool")?;

    if config.run_migrations {
        run_migrations(&db_pool)
            .await
            .context("failed to migration database")?;
    }

    let state = AppState::new(db_pool, &config).context("Failed to create AppState")?;

    info!("✅ Application setup completed successfully.");
    Ok((config, state, providers))
}

pub async fn run_migrations(pool: &Pool<Postgres>) -> Result<()> {
    info!("🗄️ Running database migrations");
    sqlx::migrate!("./migrations").run(pool).await?;

    Ok(())
}

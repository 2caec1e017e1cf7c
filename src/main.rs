//! CampusEvents lifecycle engine
//!
//! Main application entry point

use std::sync::Arc;
use std::time::Duration;
use anyhow::Context;
use tracing::{info, warn};

use CampusEvents::{
    config::{Settings, StorageBackend},
    database::{connection::{create_pool, health_check, run_migrations, DatabaseConfig}, DatabaseService, InMemoryStore},
    services::{LogDispatcher, ServiceFactory},
    utils::{clock::SystemClock, logging},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new().context("failed to load configuration")?;
    settings.validate()?;

    // Initialize logging; the guard flushes the file writer on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", CampusEvents::info());

    let database_service = match settings.storage.backend {
        StorageBackend::Postgres => {
            info!("Connecting to database...");
            let pool = create_pool(&DatabaseConfig::from(&settings.database)).await?;

            info!("Running database migrations...");
            run_migrations(&pool).await?;
            health_check(&pool).await?;

            DatabaseService::new(pool)
        }
        StorageBackend::Memory => {
            warn!("Using the in-memory store, data is lost on shutdown");
            DatabaseService::in_memory(InMemoryStore::new())
        }
    };

    info!("Initializing services...");
    let services = ServiceFactory::new(
        &settings,
        database_service,
        Arc::new(LogDispatcher::new(settings.notifications.sender.clone())),
        Arc::new(SystemClock),
    );

    if !settings.scheduler.enabled {
        info!("Lifecycle scheduler disabled, waiting for shutdown");
        tokio::signal::ctrl_c().await?;
        return Ok(());
    }

    if settings.scheduler.run_on_startup {
        if let Err(e) = services.scheduler.sweep().await {
            warn!(error = %e, "Startup sweep failed, the scheduler will retry");
        }
    }

    let interval = Duration::from_secs(settings.scheduler.sweep_interval_seconds);
    services
        .scheduler
        .run(interval, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                std::future::pending::<()>().await;
            }
        })
        .await;

    info!("CampusEvents has been shut down.");

    Ok(())
}

//! EventDesk worker
//!
//! Main application entry point: applies migrations and runs the creator
//! reminder job until interrupted.

use std::time::Duration;
use chrono::Utc;
use tracing::{error, info, warn};

use EventDesk::{
    config::Settings,
    database::{self, DatabaseService},
    services::{ServiceFactory, ServiceHealthStatus},
    utils::logging,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    // Load configuration
    let settings = Settings::new()?;
    settings.validate()?;

    // Initialize logging; the guard flushes file logs on exit
    let _log_guard = logging::init_logging(&settings.logging)?;

    info!("Starting {}...", EventDesk::info());

    // Initialize database connection
    info!("Connecting to database...");
    let db_config = database::DatabaseConfig::from(&settings.database);
    let pool = database::create_pool(&db_config).await?;
    database::run_migrations(&pool).await?;

    // Initialize services
    let store = DatabaseService::new(pool.clone());
    let services = ServiceFactory::new(store, &settings)?;

    for issue in ServiceHealthStatus::from_settings(&settings).get_issues() {
        warn!("{}", issue);
    }

    if !settings.reminder.enabled {
        info!("Creator reminders disabled, idling until shutdown");
        tokio::signal::ctrl_c().await?;
        info!("EventDesk has been shut down.");
        return Ok(());
    }

    info!(
        interval_seconds = settings.reminder.interval_seconds,
        lookahead_hours = settings.reminder.lookahead_hours,
        "Creator reminder job started"
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(settings.reminder.interval_seconds));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Err(e) = database::health_check(&pool).await {
                    error!(error = %e, "Database health check failed, skipping reminder run");
                    continue;
                }

                match services.reminder_service.run_once(Utc::now()).await {
                    Ok(report) => info!(
                        processed = report.processed(),
                        failed = report.failed.len(),
                        skipped = report.skipped.len(),
                        "Reminder run complete"
                    ),
                    Err(e) => error!(error = %e, severity = %e.severity(), "Reminder run failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    info!("EventDesk has been shut down.");
    Ok(())
}

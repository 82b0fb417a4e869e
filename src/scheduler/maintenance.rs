use chrono::Utc;
use sea_orm::DatabaseConnection;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{
    error::AppError,
    model::event::{PacteEvent, PacteEventKind},
    service::{event::EventBus, maintenance::MaintenanceService},
};

/// Starts the maintenance scheduler
///
/// Jobs:
/// - every minute: fail pending pactes past their signature window
/// - daily at 04:00: prune old ledger rows
/// - hourly: reset monthly points when a new month started
///
/// # Arguments
/// - `db`: Database connection
/// - `bus`: Event bus notified about expired pactes
pub async fn start_scheduler(db: DatabaseConnection, bus: EventBus) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let expiry_db = db.clone();
    let expiry_bus = bus.clone();
    let expiry = Job::new_async("0 * * * * *", move |_uuid, _lock| {
        let db = expiry_db.clone();
        let bus = expiry_bus.clone();

        Box::pin(async move {
            if let Err(e) = expire_unsigned(&db, &bus).await {
                tracing::error!("Error expiring unsigned pactes: {}", e);
            }
        })
    })?;

    let prune_db = db.clone();
    let prune = Job::new_async("0 0 4 * * *", move |_uuid, _lock| {
        let db = prune_db.clone();

        Box::pin(async move {
            if let Err(e) = MaintenanceService::new(&db).prune_ledger(Utc::now()).await {
                tracing::error!("Error pruning match ledger: {}", e);
            }
        })
    })?;

    let monthly_db = db.clone();
    let monthly = Job::new_async("0 5 * * * *", move |_uuid, _lock| {
        let db = monthly_db.clone();

        Box::pin(async move {
            if let Err(e) = MaintenanceService::new(&db).monthly_reset(Utc::now()).await {
                tracing::error!("Error checking monthly point reset: {}", e);
            }
        })
    })?;

    scheduler.add(expiry).await?;
    scheduler.add(prune).await?;
    scheduler.add(monthly).await?;
    scheduler.start().await?;

    tracing::info!("Maintenance scheduler started");

    Ok(())
}

async fn expire_unsigned(db: &DatabaseConnection, bus: &EventBus) -> Result<(), AppError> {
    let expired = MaintenanceService::new(db).expire_unsigned(Utc::now()).await?;

    for pacte in expired {
        bus.publish(PacteEvent {
            pacte_id: pacte.id,
            channel_id: pacte.channel_id,
            kind: PacteEventKind::SignatureExpired,
        });
    }

    Ok(())
}

use chrono::Utc;
use std::sync::Arc;
use tokio_cron_scheduler::{Job, JobScheduler};

use crate::{error::AppError, service::progress::ProgressEngine};

/// Starts the pacte progress scheduler
///
/// Every 10 seconds the engine runs one cycle over the checkable pactes. A tick that
/// fires while the previous cycle is still running is skipped by the engine itself.
///
/// # Arguments
/// - `engine`: Progress engine shared with the job
pub async fn start_scheduler(engine: Arc<ProgressEngine>) -> Result<(), AppError> {
    let scheduler = JobScheduler::new().await?;

    let job_engine = engine.clone();

    let job = Job::new_async("*/10 * * * * *", move |_uuid, _lock| {
        let engine = job_engine.clone();

        Box::pin(async move {
            if let Err(e) = engine.run_cycle(Utc::now()).await {
                tracing::error!("Error running pacte progress cycle: {}", e);
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    tracing::info!("Pacte progress scheduler started");

    Ok(())
}

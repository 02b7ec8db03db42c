//! Background job scheduler.
//!
//! Registers the recurring retailer sync when enabled in config.

use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

use crate::api::AppState;

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive for
/// the lifetime of the process. Dropping it shuts down all scheduled jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised, the
/// cron expression is invalid, or the scheduler fails to start.
pub async fn build_scheduler(
    state: AppState,
    sync_cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_sync_job(&scheduler, state, sync_cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

/// Registers the retailer sync on `cron` (six fields, seconds first).
///
/// Each run walks every configured feed in order; a failed feed is logged
/// and the remaining feeds still sync.
async fn register_sync_job(
    scheduler: &JobScheduler,
    state: AppState,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let state = state.clone();

        Box::pin(async move {
            tracing::info!("scheduler: starting retailer sync");
            let results = basketiq_ingest::sync_retailers(
                state.store.as_ref(),
                &state.feeds,
                &state.feed_client,
            )
            .await;
            let failed = results
                .iter()
                .filter(|r| r.status == basketiq_ingest::SyncStatus::Failed)
                .count();
            tracing::info!(
                retailers = results.len(),
                failed,
                "scheduler: retailer sync complete"
            );
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered retailer sync job");
    Ok(())
}

//! Background job scheduler.

use std::sync::Arc;

use silverline_sentiment::Analyzer;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Build and start the scheduler with the subscribed-analysis job.
///
/// The returned handle must be kept alive; dropping it stops the jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// `cron` is not a valid schedule, or the scheduler fails to start.
pub async fn build_scheduler(
    analyzer: Arc<Analyzer>,
    cron: &str,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;
    register_subscription_job(&scheduler, analyzer, cron).await?;
    scheduler.start().await?;
    Ok(scheduler)
}

async fn register_subscription_job(
    scheduler: &JobScheduler,
    analyzer: Arc<Analyzer>,
    cron: &str,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let analyzer = Arc::clone(&analyzer);

        Box::pin(async move {
            tracing::info!("scheduler: starting subscribed analysis");
            match analyzer.invoke_subscribed_analysis().await {
                Ok(count) => tracing::info!(count, "scheduler: subscribed analysis queued"),
                Err(e) => tracing::error!(error = %e, "scheduler: failed to load subscriptions"),
            }
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron, "scheduler: registered subscribed analysis job");
    Ok(())
}

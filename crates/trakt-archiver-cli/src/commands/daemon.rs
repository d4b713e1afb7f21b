use super::run::{build_run, load_settings, RunOverrides};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use media_sync_config::{default_scheduler_config, PathManager, SchedulerConfig};
use media_sync_core::{ArchiveRun, RunReport, RunStatus};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

pub struct Scheduler {
    scheduler: JobScheduler,
    run: Arc<Mutex<ArchiveRun>>,
    config: SchedulerConfig,
}

impl Scheduler {
    pub async fn new(run: ArchiveRun, config: SchedulerConfig) -> Result<Self> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            run: Arc::new(Mutex::new(run)),
            config,
        })
    }

    pub async fn start(&mut self) -> Result<()> {
        if self.config.run_on_startup {
            info!(operation = "scheduler_startup", "Running initial archive run on startup");
            run_serialized(&self.run).await;
        }

        let job = archive_job(&self.config.schedule, self.run.clone())?;
        self.scheduler.add(job).await?;
        self.scheduler.start().await?;

        info!(
            operation = "scheduler_started",
            schedule = self.config.schedule,
            "Scheduler started (UTC)"
        );

        tokio::signal::ctrl_c().await?;
        info!(operation = "scheduler_shutdown", "Shutting down scheduler");
        self.scheduler.shutdown().await?;
        Ok(())
    }
}

/// Cron job for `schedule` (six fields, UTC) that runs the archive
fn archive_job(schedule: &str, run: Arc<Mutex<ArchiveRun>>) -> Result<Job> {
    Job::new_async(schedule, move |_uuid, _scheduler| {
        let run = run.clone();
        Box::pin(async move {
            info!(operation = "scheduled_run_start", "Starting scheduled archive run");
            run_serialized(&run).await;
        })
    })
    .map_err(|e| eyre!("Invalid schedule '{}': {}", schedule, e))
}

/// Holding the lock for the whole run keeps a slow run from overlapping the next tick
async fn run_serialized(run: &Mutex<ArchiveRun>) -> RunReport {
    let run = run.lock().await;
    let report = run.run().await;
    match report.status {
        RunStatus::Completed => info!(
            operation = "scheduled_run_complete",
            archived = report.archived,
            overflow = report.overflow,
            duration_ms = report.duration_ms,
            "Archive run completed"
        ),
        RunStatus::PartialFailure => warn!(
            operation = "scheduled_run_complete",
            archived = report.archived,
            archive_failed = report.archive_failed,
            "Archive run completed with failures"
        ),
        RunStatus::FetchFailed => error!(
            operation = "scheduled_run_error",
            error = report.fetch_error.as_deref().unwrap_or_default(),
            "Archive run could not fetch the watchlist"
        ),
    }
    report
}

/// Effective scheduler settings: file values, then flags
pub fn resolve_scheduler_config(
    from_file: Option<&SchedulerConfig>,
    schedule_override: Option<String>,
    no_startup_run: bool,
) -> SchedulerConfig {
    let base = from_file.cloned().unwrap_or_else(default_scheduler_config);
    SchedulerConfig {
        schedule: schedule_override.unwrap_or(base.schedule),
        run_on_startup: base.run_on_startup && !no_startup_run,
    }
}

pub async fn run_daemon(schedule_override: Option<String>, no_startup_run: bool, output: &Output) -> Result<()> {
    let (config, creds) = load_settings(&RunOverrides::default())?;
    let scheduler_config = resolve_scheduler_config(config.scheduler.as_ref(), schedule_override, no_startup_run);
    let run = build_run(&config, &creds)?;

    output.info(format!(
        "Archiving overflow of '{}' on schedule '{}' (UTC). Logs: {}",
        config.trakt.username,
        scheduler_config.schedule,
        PathManager::default().daemon_log_file().display()
    ));

    let mut scheduler = Scheduler::new(run, scheduler_config)
        .await
        .map_err(|e| eyre!("Failed to create scheduler: {}", e))?;
    scheduler
        .start()
        .await
        .map_err(|e| eyre!("Scheduler stopped with an error: {}", e))?;

    Ok(())
}

use crate::archive::{ArchiveOutcome, ArchiveWriter};
use crate::eviction::{EvictionCommitter, RemovalOutcome};
use crate::overflow::partition;
use crate::watchlist::{fetch_sorted_watchlist, FetchOutcome};
use media_sync_sources::WatchlistSource;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, instrument, warn};

pub const DEFAULT_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Completed,
    /// Some archive writes or the removal failed
    PartialFailure,
    FetchFailed,
}

/// What one run did, for the CLI and for tests
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub user: String,
    pub capacity: usize,
    pub dry_run: bool,
    pub fetched: usize,
    pub retained: usize,
    pub overflow: usize,
    pub archived: usize,
    pub archive_failed: usize,
    pub dry_run_intents: usize,
    /// Display titles of the overflow entries, oldest first
    pub evicted: Vec<String>,
    pub removal: Option<RemovalOutcome>,
    pub fetch_error: Option<String>,
    pub duration_ms: u64,
    pub status: RunStatus,
}

impl RunReport {
    fn new(user: &str, capacity: usize, dry_run: bool) -> Self {
        Self {
            user: user.to_string(),
            capacity,
            dry_run,
            fetched: 0,
            retained: 0,
            overflow: 0,
            archived: 0,
            archive_failed: 0,
            dry_run_intents: 0,
            evicted: Vec::new(),
            removal: None,
            fetch_error: None,
            duration_ms: 0,
            status: RunStatus::Completed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// One pass of fetch, partition, archive and remove.
///
/// The removal is committed once, after every overflow entry has had its
/// archive attempt, even if some of those attempts failed.
pub struct ArchiveRun {
    source: Arc<dyn WatchlistSource>,
    writer: ArchiveWriter,
    user: String,
    capacity: usize,
    dry_run: bool,
}

impl ArchiveRun {
    pub fn new(source: Arc<dyn WatchlistSource>, writer: ArchiveWriter, user: impl Into<String>) -> Self {
        let dry_run = writer.is_dry_run();
        Self {
            source,
            writer,
            user: user.into(),
            capacity: DEFAULT_CAPACITY,
            dry_run,
        }
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Applies to both the archive writes and the removal
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self.writer = self.writer.with_dry_run(dry_run);
        self
    }

    #[instrument(skip(self), fields(user = %self.user, capacity = self.capacity, dry_run = self.dry_run))]
    pub async fn run(&self) -> RunReport {
        let start = Instant::now();
        let mut report = RunReport::new(&self.user, self.capacity, self.dry_run);

        info!(operation = "run_start", "Starting watchlist archive run");

        let entries = match fetch_sorted_watchlist(self.source.as_ref(), &self.user).await {
            FetchOutcome::Fetched(entries) => entries,
            FetchOutcome::Failed(reason) => {
                report.fetch_error = Some(reason);
                report.status = RunStatus::FetchFailed;
                report.duration_ms = elapsed_ms(start);
                return report;
            }
        };
        report.fetched = entries.len();

        let split = partition(entries, self.capacity);
        report.retained = split.retained.len();
        report.overflow = split.overflow.len();
        report.evicted = split.overflow.iter().map(|e| e.display_title()).collect();

        if split.overflow.is_empty() {
            info!(
                operation = "run_complete",
                fetched = report.fetched,
                "Watchlist within capacity, nothing to archive"
            );
            report.duration_ms = elapsed_ms(start);
            return report;
        }

        info!(
            operation = "partition",
            fetched = report.fetched,
            overflow = report.overflow,
            retained = report.retained,
            "Watchlist over capacity"
        );

        for entry in &split.overflow {
            match self.writer.archive(entry).await {
                ArchiveOutcome::Archived { .. } => report.archived += 1,
                ArchiveOutcome::DryRun => report.dry_run_intents += 1,
                ArchiveOutcome::Failed { .. } => report.archive_failed += 1,
            }
        }

        let committer = EvictionCommitter::new(self.source.clone()).with_dry_run(self.dry_run);
        let removal = committer.commit_removal(&split.overflow).await;

        if report.archive_failed > 0 || removal.is_failed() {
            report.status = RunStatus::PartialFailure;
            warn!(
                archive_failed = report.archive_failed,
                removal_failed = removal.is_failed(),
                "Run finished with failures"
            );
        }
        report.removal = Some(removal);
        report.duration_ms = elapsed_ms(start);

        info!(
            operation = "run_complete",
            duration_ms = report.duration_ms,
            archived = report.archived,
            archive_failed = report.archive_failed,
            dry_run_intents = report.dry_run_intents,
            status = ?report.status,
            "Watchlist archive run completed"
        );

        report
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

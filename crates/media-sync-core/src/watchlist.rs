use media_sync_models::WatchlistEntry;
use media_sync_sources::WatchlistSource;
use tracing::{error, info};

/// Result of reading the watchlist for one run.
///
/// An empty `Fetched` list means the watchlist really is empty; a failed
/// read is always `Failed` and never looks like an empty watchlist.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Fetched(Vec<WatchlistEntry>),
    Failed(String),
}

impl FetchOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, FetchOutcome::Failed(_))
    }
}

/// Oldest first by `listed_at`. Stable, so ties keep response order.
pub fn sort_by_listed_at(entries: &mut [WatchlistEntry]) {
    entries.sort_by(|a, b| a.sort_key().cmp(b.sort_key()));
}

pub async fn fetch_sorted_watchlist(source: &dyn WatchlistSource, user: &str) -> FetchOutcome {
    match source.fetch_watchlist(user).await {
        Ok(mut entries) => {
            sort_by_listed_at(&mut entries);
            info!(
                operation = "fetch_watchlist",
                source = source.source_name(),
                user = user,
                count = entries.len(),
                "Fetched watchlist"
            );
            FetchOutcome::Fetched(entries)
        }
        Err(e) => {
            error!(
                operation = "fetch_watchlist",
                source = source.source_name(),
                user = user,
                status = ?e.status(),
                error = %e,
                "Failed to fetch watchlist"
            );
            FetchOutcome::Failed(e.to_string())
        }
    }
}

use media_sync_models::WatchlistEntry;
use media_sync_sources::{RemovalRequest, RemovalSummary, WatchlistSource};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RemovalOutcome {
    Removed { summary: RemovalSummary },
    DryRun { count: usize },
    Failed { reason: String },
    Skipped,
}

impl RemovalOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, RemovalOutcome::Failed { .. })
    }
}

/// Group the overflow by kind into one removal body
pub fn build_removal_request(overflow: &[WatchlistEntry]) -> RemovalRequest {
    let mut request = RemovalRequest::new();
    for entry in overflow {
        if entry.ids.is_empty() {
            warn!(title = %entry.title, "Entry has no ids, Trakt will not be able to match it");
        }
        request.push(entry.kind, entry.ids.clone());
    }
    request
}

/// Removes the whole overflow set from the source watchlist in one call
pub struct EvictionCommitter {
    source: Arc<dyn WatchlistSource>,
    dry_run: bool,
}

impl EvictionCommitter {
    pub fn new(source: Arc<dyn WatchlistSource>) -> Self {
        Self { source, dry_run: false }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub async fn commit_removal(&self, overflow: &[WatchlistEntry]) -> RemovalOutcome {
        if overflow.is_empty() {
            return RemovalOutcome::Skipped;
        }

        let request = build_removal_request(overflow);

        if self.dry_run {
            info!(
                operation = "remove",
                dry_run = true,
                count = request.len(),
                titles = ?overflow.iter().map(|e| e.display_title()).collect::<Vec<_>>(),
                "Would remove entries from watchlist"
            );
            return RemovalOutcome::DryRun { count: request.len() };
        }

        match self.source.remove_from_watchlist(&request).await {
            Ok(summary) => {
                info!(
                    operation = "remove",
                    source = self.source.source_name(),
                    requested = request.len(),
                    deleted = summary.deleted.total(),
                    not_found = summary.not_found.total(),
                    "Removed entries from watchlist"
                );
                RemovalOutcome::Removed { summary }
            }
            Err(e) => {
                error!(
                    operation = "remove",
                    source = self.source.source_name(),
                    requested = request.len(),
                    status = ?e.status(),
                    error = %e,
                    "Failed to remove entries from watchlist"
                );
                RemovalOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use media_sync_models::{MediaIds, MediaKind};

    fn entry(kind: MediaKind, trakt: u64) -> WatchlistEntry {
        WatchlistEntry::new(kind, format!("#{trakt}"), None, MediaIds { trakt: Some(trakt), ..MediaIds::default() })
    }

    #[test]
    fn test_build_removal_request_groups_by_kind() {
        let overflow = vec![
            entry(MediaKind::Movie, 1),
            entry(MediaKind::Show, 2),
            entry(MediaKind::Movie, 3),
            entry(MediaKind::Season, 4),
        ];

        let request = build_removal_request(&overflow);

        assert_eq!(request.len(), 4);
        let movie_ids: Vec<_> = request.ids(MediaKind::Movie).iter().map(|ids| ids.trakt).collect();
        assert_eq!(movie_ids, vec![Some(1), Some(3)]);
        assert_eq!(request.count(MediaKind::Show), 1);
        assert_eq!(request.count(MediaKind::Season), 1);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["seasons"][0]["ids"]["trakt"], 4);
    }

    #[test]
    fn test_build_removal_request_empty() {
        assert!(build_removal_request(&[]).is_empty());
    }
}

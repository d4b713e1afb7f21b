use crate::enrichment::EnrichmentResolver;
use crate::error::CoreError;
use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;
use media_sync_models::{EnrichmentResult, WatchlistEntry};
use media_sync_sources::trakt::TRAKT_SITE_BASE;
use media_sync_sources::ArchiveStore;
use serde::Serialize;
use serde_json::{json, Map, Value};
use std::sync::Arc;
use tracing::{error, info};

pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Pacific::Auckland;
pub const DEFAULT_STATUS_LABEL: &str = "Not on Trakt";
pub const DEFAULT_SOURCE_TAG: &str = "Trakt";
pub const IMDB_TITLE_BASE: &str = "https://www.imdb.com/title";

/// Fixed labels stamped onto every archived record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordLabels {
    pub status_label: String,
    pub source_tag: String,
    pub site_base: String,
}

impl Default for RecordLabels {
    fn default() -> Self {
        Self {
            status_label: DEFAULT_STATUS_LABEL.to_string(),
            source_tag: DEFAULT_SOURCE_TAG.to_string(),
            site_base: TRAKT_SITE_BASE.to_string(),
        }
    }
}

/// One evicted entry as it is written to the archive database.
///
/// Optional fields stay `None` when nothing was resolved and are left out of
/// the rendered properties.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArchiveRecord {
    pub title: String,
    pub media_type: String,
    pub status: String,
    pub trakt_url: Option<String>,
    pub on_watchlist: bool,
    pub date_removed: String,
    pub source: String,
    pub imdb_url: Option<String>,
    pub genres: Vec<String>,
    pub duration: Option<String>,
    pub poster_url: Option<String>,
    pub imdb_rating: Option<f64>,
    pub imdb_votes: Option<u64>,
}

impl ArchiveRecord {
    pub fn build(
        entry: &WatchlistEntry,
        enrichment: EnrichmentResult,
        labels: &RecordLabels,
        removed_at: &DateTime<Tz>,
    ) -> Self {
        Self {
            title: entry.display_title(),
            media_type: entry.kind.display_label().to_string(),
            status: labels.status_label.clone(),
            trakt_url: entry.source_url(&labels.site_base),
            on_watchlist: false,
            date_removed: removed_at.to_rfc3339_opts(SecondsFormat::Secs, false),
            source: labels.source_tag.clone(),
            imdb_url: enrichment
                .imdb_id
                .filter(|id| !id.is_empty())
                .map(|id| format!("{}/{}", IMDB_TITLE_BASE, id)),
            genres: enrichment.genres,
            duration: enrichment
                .runtime_minutes
                .filter(|m| *m > 0)
                .map(|m| format!("{} min", m)),
            poster_url: enrichment.poster_url.filter(|url| !url.is_empty()),
            imdb_rating: enrichment.imdb_rating.filter(|r| *r > 0.0),
            imdb_votes: enrichment.imdb_votes.filter(|v| *v > 0),
        }
    }

    /// Render as Notion page properties
    pub fn to_properties(&self) -> Map<String, Value> {
        let mut props = Map::new();

        props.insert("Title".into(), json!({"title": [{"text": {"content": self.title}}]}));
        props.insert("Media Type".into(), json!({"select": {"name": self.media_type}}));
        props.insert("Status".into(), json!({"select": {"name": self.status}}));
        if let Some(url) = &self.trakt_url {
            props.insert("Trakt ID".into(), json!({"url": url}));
        }
        props.insert("Trakt Watchlist".into(), json!({"checkbox": self.on_watchlist}));
        props.insert("Date Removed".into(), json!({"date": {"start": self.date_removed}}));
        props.insert("Source".into(), json!({"multi_select": [{"name": self.source}]}));

        if let Some(url) = &self.imdb_url {
            props.insert("IMDb".into(), json!({"url": url}));
        }
        if !self.genres.is_empty() {
            let names: Vec<Value> = self.genres.iter().map(|g| json!({"name": g})).collect();
            props.insert("Genres".into(), json!({"multi_select": names}));
        }
        if let Some(duration) = &self.duration {
            props.insert("Duration".into(), json!({"rich_text": [{"text": {"content": duration}}]}));
        }
        if let Some(url) = &self.poster_url {
            props.insert("Poster".into(), json!({"url": url}));
        }
        if let Some(rating) = self.imdb_rating {
            props.insert("IMDb Rating".into(), json!({"number": rating}));
        }
        if let Some(votes) = self.imdb_votes {
            props.insert("IMDb Votes".into(), json!({"number": votes}));
        }

        props
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ArchiveOutcome {
    Archived { page_id: Option<String> },
    DryRun,
    Failed { reason: String },
}

/// Enriches an overflow entry and writes it to the archive database
pub struct ArchiveWriter {
    store: Arc<dyn ArchiveStore>,
    resolver: EnrichmentResolver,
    database_id: String,
    labels: RecordLabels,
    timezone: Tz,
    dry_run: bool,
}

impl ArchiveWriter {
    pub fn new(store: Arc<dyn ArchiveStore>, resolver: EnrichmentResolver, database_id: impl Into<String>) -> Self {
        Self {
            store,
            resolver,
            database_id: database_id.into(),
            labels: RecordLabels::default(),
            timezone: DEFAULT_TIMEZONE,
            dry_run: false,
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn with_labels(mut self, labels: RecordLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// Same as `with_timezone`, taking an IANA name such as "Europe/Berlin"
    pub fn with_timezone_name(self, name: &str) -> Result<Self, CoreError> {
        let timezone: Tz = name
            .parse()
            .map_err(|_| CoreError::UnknownTimezone(name.to_string()))?;
        Ok(self.with_timezone(timezone))
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Enrich and build the record without writing it
    pub async fn prepare(&self, entry: &WatchlistEntry) -> ArchiveRecord {
        let enrichment = self.resolver.resolve(entry.ids.tmdb, entry.kind).await;
        let removed_at = Utc::now().with_timezone(&self.timezone);
        ArchiveRecord::build(entry, enrichment, &self.labels, &removed_at)
    }

    pub async fn archive(&self, entry: &WatchlistEntry) -> ArchiveOutcome {
        let record = self.prepare(entry).await;
        let properties = record.to_properties();

        if self.dry_run {
            info!(
                operation = "archive",
                dry_run = true,
                title = %record.title,
                media_type = %record.media_type,
                properties = properties.len(),
                "Would archive entry"
            );
            return ArchiveOutcome::DryRun;
        }

        match self.store.create_record(&self.database_id, properties).await {
            Ok(created) => {
                info!(
                    operation = "archive",
                    store = self.store.store_name(),
                    title = %record.title,
                    page_id = ?created.id,
                    "Archived entry"
                );
                ArchiveOutcome::Archived { page_id: created.id }
            }
            Err(e) => {
                error!(
                    operation = "archive",
                    store = self.store.store_name(),
                    title = %record.title,
                    status = ?e.status(),
                    error = %e,
                    "Failed to archive entry"
                );
                ArchiveOutcome::Failed { reason: e.to_string() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use media_sync_models::{MediaIds, MediaKind};

    fn removed_at() -> DateTime<Tz> {
        DEFAULT_TIMEZONE.with_ymd_and_hms(2024, 7, 1, 9, 30, 0).unwrap()
    }

    fn heat() -> WatchlistEntry {
        WatchlistEntry::new(
            MediaKind::Movie,
            "Heat",
            Some(1995),
            MediaIds {
                trakt: Some(1),
                slug: Some("heat-1995".into()),
                tmdb: Some(949),
                ..MediaIds::default()
            },
        )
    }

    fn full_enrichment() -> EnrichmentResult {
        EnrichmentResult {
            genres: vec!["Action".into(), "Crime".into()],
            runtime_minutes: Some(170),
            imdb_id: Some("tt0113277".into()),
            poster_url: Some("https://image.tmdb.org/t/p/w500/heat.jpg".into()),
            imdb_rating: Some(8.3),
            imdb_votes: Some(700_000),
        }
    }

    #[test]
    fn test_build_core_fields() {
        let record = ArchiveRecord::build(&heat(), EnrichmentResult::empty(), &RecordLabels::default(), &removed_at());

        assert_eq!(record.title, "Heat (1995)");
        assert_eq!(record.media_type, "Movie");
        assert_eq!(record.status, "Not on Trakt");
        assert_eq!(record.trakt_url.as_deref(), Some("https://trakt.tv/movies/heat-1995"));
        assert!(!record.on_watchlist);
        // NZST in July
        assert_eq!(record.date_removed, "2024-07-01T09:30:00+12:00");
        assert_eq!(record.source, "Trakt");
    }

    #[test]
    fn test_minimal_record_has_only_base_properties() {
        let entry = WatchlistEntry::new(MediaKind::Show, "Untitled", None, MediaIds::default());
        let props = ArchiveRecord::build(&entry, EnrichmentResult::empty(), &RecordLabels::default(), &removed_at())
            .to_properties();

        let mut keys: Vec<&str> = props.keys().map(String::as_str).collect();
        keys.sort_unstable();
        assert_eq!(
            keys,
            vec!["Date Removed", "Media Type", "Source", "Status", "Title", "Trakt Watchlist"]
        );
        assert_eq!(props["Title"]["title"][0]["text"]["content"], "Untitled");
    }

    #[test]
    fn test_full_record_properties() {
        let props = ArchiveRecord::build(&heat(), full_enrichment(), &RecordLabels::default(), &removed_at())
            .to_properties();

        assert_eq!(props["Media Type"]["select"]["name"], "Movie");
        assert_eq!(props["Trakt ID"]["url"], "https://trakt.tv/movies/heat-1995");
        assert_eq!(props["Trakt Watchlist"]["checkbox"], false);
        assert_eq!(props["Date Removed"]["date"]["start"], "2024-07-01T09:30:00+12:00");
        assert_eq!(props["Source"]["multi_select"][0]["name"], "Trakt");
        assert_eq!(props["IMDb"]["url"], "https://www.imdb.com/title/tt0113277");
        assert_eq!(props["Genres"]["multi_select"][1]["name"], "Crime");
        assert_eq!(props["Duration"]["rich_text"][0]["text"]["content"], "170 min");
        assert_eq!(props["Poster"]["url"], "https://image.tmdb.org/t/p/w500/heat.jpg");
        assert_eq!(props["IMDb Rating"]["number"], 8.3);
        assert_eq!(props["IMDb Votes"]["number"], 700_000);
    }

    #[test]
    fn test_properties_only_for_resolved_fields() {
        let enrichments = [
            EnrichmentResult { genres: vec!["Drama".into()], ..EnrichmentResult::default() },
            EnrichmentResult { runtime_minutes: Some(45), ..EnrichmentResult::default() },
            EnrichmentResult { imdb_rating: Some(7.1), imdb_votes: None, ..EnrichmentResult::default() },
            EnrichmentResult { runtime_minutes: Some(0), imdb_votes: Some(0), ..EnrichmentResult::default() },
            full_enrichment(),
        ];

        for enrichment in enrichments {
            let props = ArchiveRecord::build(&heat(), enrichment.clone(), &RecordLabels::default(), &removed_at())
                .to_properties();
            assert_eq!(props.contains_key("Genres"), !enrichment.genres.is_empty());
            assert_eq!(props.contains_key("Duration"), enrichment.runtime_minutes.is_some_and(|m| m > 0));
            assert_eq!(props.contains_key("IMDb"), enrichment.imdb_id.is_some());
            assert_eq!(props.contains_key("Poster"), enrichment.poster_url.is_some());
            assert_eq!(props.contains_key("IMDb Rating"), enrichment.imdb_rating.is_some());
            assert_eq!(props.contains_key("IMDb Votes"), enrichment.imdb_votes.is_some_and(|v| v > 0));
            assert!(props.values().all(|v| !v.is_null()));
        }
    }

    #[test]
    fn test_custom_labels() {
        let labels = RecordLabels {
            status_label: "Evicted".into(),
            source_tag: "Watchlist".into(),
            site_base: "https://trakt.example".into(),
        };
        let props = ArchiveRecord::build(&heat(), EnrichmentResult::empty(), &labels, &removed_at()).to_properties();

        assert_eq!(props["Status"]["select"]["name"], "Evicted");
        assert_eq!(props["Source"]["multi_select"][0]["name"], "Watchlist");
        assert_eq!(props["Trakt ID"]["url"], "https://trakt.example/movies/heat-1995");
    }
}

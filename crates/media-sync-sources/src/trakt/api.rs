use media_sync_models::{MediaIds, MediaKind, WatchlistEntry, UNTITLED};
use reqwest::RequestBuilder;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

pub const TRAKT_API_BASE: &str = "https://api.trakt.tv";
pub const TRAKT_SITE_BASE: &str = "https://trakt.tv";

/// Attach the headers every Trakt API call needs
pub(crate) fn with_trakt_headers(request: RequestBuilder, api_key: &str, access_token: &str) -> RequestBuilder {
    request
        .header("Authorization", format!("Bearer {}", access_token))
        .header("trakt-api-version", "2")
        .header("trakt-api-key", api_key)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
}

/// Convert the raw `/users/{user}/watchlist` array into entries.
///
/// Items of kinds we cannot archive (episodes, people, anything new) and items
/// missing their nested object are skipped with a warning rather than failing
/// the whole fetch.
pub fn parse_watchlist(items: Vec<Value>) -> Vec<WatchlistEntry> {
    let total = items.len();
    let mut entries = Vec::with_capacity(total);
    let mut skipped = 0usize;

    for (index, item) in items.into_iter().enumerate() {
        match parse_watchlist_item(&item) {
            Some(entry) => entries.push(entry),
            None => {
                skipped += 1;
                let item_type = item.get("type").and_then(Value::as_str).unwrap_or("<missing>");
                warn!(index, item_type, "Skipping unsupported Trakt watchlist item");
            }
        }
    }

    debug!(total, kept = entries.len(), skipped, "Parsed Trakt watchlist");
    entries
}

fn parse_watchlist_item(item: &Value) -> Option<WatchlistEntry> {
    let kind = MediaKind::from_trakt_type(item.get("type")?.as_str()?)?;
    let object = item.get(kind.as_str())?.as_object()?;

    let ids = match object.get("ids") {
        Some(ids) => serde_json::from_value::<MediaIds>(ids.clone()).unwrap_or_else(|e| {
            warn!(error = %e, "Unreadable Trakt ids object, treating as empty");
            MediaIds::default()
        }),
        None => MediaIds::default(),
    };

    let mut title = object.get("title").and_then(Value::as_str).map(str::to_string);
    let mut year = object.get("year").and_then(as_year);

    // Season objects carry a number but no title; borrow the parent show's
    if kind == MediaKind::Season && title.is_none() {
        if let Some(show) = item.get("show").and_then(Value::as_object) {
            let show_title = show.get("title").and_then(Value::as_str).unwrap_or(UNTITLED);
            title = Some(match object.get("number").and_then(Value::as_u64) {
                Some(number) => format!("{} - Season {}", show_title, number),
                None => show_title.to_string(),
            });
            if year.is_none() {
                year = show.get("year").and_then(as_year);
            }
        }
    }

    Some(WatchlistEntry {
        kind,
        title: title.unwrap_or_else(|| UNTITLED.to_string()),
        year,
        ids,
        listed_at: item.get("listed_at").and_then(Value::as_str).map(str::to_string),
    })
}

fn as_year(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|y| u32::try_from(y).ok())
}

#[derive(Debug, Clone, Serialize, PartialEq)]
struct IdsWrapper {
    ids: MediaIds,
}

/// Body of `POST /sync/watchlist/remove`
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct RemovalRequest {
    movies: Vec<IdsWrapper>,
    shows: Vec<IdsWrapper>,
    seasons: Vec<IdsWrapper>,
}

impl RemovalRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, kind: MediaKind, ids: MediaIds) {
        let wrapped = IdsWrapper { ids };
        match kind {
            MediaKind::Movie => self.movies.push(wrapped),
            MediaKind::Show => self.shows.push(wrapped),
            MediaKind::Season => self.seasons.push(wrapped),
        }
    }

    pub fn len(&self) -> usize {
        self.movies.len() + self.shows.len() + self.seasons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn count(&self, kind: MediaKind) -> usize {
        match kind {
            MediaKind::Movie => self.movies.len(),
            MediaKind::Show => self.shows.len(),
            MediaKind::Season => self.seasons.len(),
        }
    }

    /// Ids queued under the given kind, in insertion order
    pub fn ids(&self, kind: MediaKind) -> Vec<&MediaIds> {
        let bucket = match kind {
            MediaKind::Movie => &self.movies,
            MediaKind::Show => &self.shows,
            MediaKind::Season => &self.seasons,
        };
        bucket.iter().map(|w| &w.ids).collect()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct KindCounts {
    pub movies: u64,
    pub shows: u64,
    pub seasons: u64,
    pub episodes: u64,
}

impl KindCounts {
    pub fn total(&self) -> u64 {
        self.movies + self.shows + self.seasons + self.episodes
    }
}

/// What Trakt reports back after a removal.
///
/// Parsed leniently: a body we cannot read leaves the counts at zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RemovalSummary {
    pub deleted: KindCounts,
    pub not_found: KindCounts,
}

pub fn parse_removal_summary(body: &str) -> RemovalSummary {
    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => {
            debug!(error = %e, "Could not parse Trakt removal response body");
            return RemovalSummary::default();
        }
    };

    // `deleted` holds numbers, `not_found` holds arrays of the unmatched items
    let count = |section: &str, key: &str| -> u64 {
        match value.get(section).and_then(|s| s.get(key)) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::Array(items)) => items.len() as u64,
            _ => 0,
        }
    };
    let counts = |section: &str| KindCounts {
        movies: count(section, "movies"),
        shows: count(section, "shows"),
        seasons: count(section, "seasons"),
        episodes: count(section, "episodes"),
    };

    RemovalSummary {
        deleted: counts("deleted"),
        not_found: counts("not_found"),
    }
}

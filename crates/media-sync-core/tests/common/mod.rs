#![allow(dead_code)]

use async_trait::async_trait;
use media_sync_core::{ArchiveWriter, EnrichmentResolver};
use media_sync_models::{MediaIds, MediaKind, TmdbMediaType, WatchlistEntry};
use media_sync_sources::{
    ArchiveStore, CreatedRecord, MetadataLookup, OmdbRating, RatingLookup, RemovalRequest, RemovalSummary,
    SourceError, TmdbDetails, WatchlistSource,
};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

/// Calls to the mutating fakes in the order they happened, shared across fakes
pub type EventLog = Arc<Mutex<Vec<&'static str>>>;

fn status_error(service: &'static str, status: u16) -> SourceError {
    SourceError::Status {
        service,
        status,
        body: String::new(),
    }
}

/// In-memory watchlist that records every removal call
#[derive(Default)]
pub struct FakeWatchlist {
    pub entries: Vec<WatchlistEntry>,
    pub fetch_status: Option<u16>,
    pub remove_status: Option<u16>,
    pub fetch_calls: Mutex<usize>,
    pub removals: Mutex<Vec<RemovalRequest>>,
    pub events: EventLog,
}

impl FakeWatchlist {
    pub fn with_entries(entries: Vec<WatchlistEntry>) -> Self {
        Self {
            entries,
            ..Self::default()
        }
    }

    pub fn removal_calls(&self) -> Vec<RemovalRequest> {
        self.removals.lock().unwrap().clone()
    }
}

#[async_trait]
impl WatchlistSource for FakeWatchlist {
    fn source_name(&self) -> &str {
        "fake-trakt"
    }

    async fn fetch_watchlist(&self, _user: &str) -> Result<Vec<WatchlistEntry>, SourceError> {
        *self.fetch_calls.lock().unwrap() += 1;
        self.events.lock().unwrap().push("fetch");
        match self.fetch_status {
            Some(status) => Err(status_error("trakt", status)),
            None => Ok(self.entries.clone()),
        }
    }

    async fn remove_from_watchlist(&self, request: &RemovalRequest) -> Result<RemovalSummary, SourceError> {
        self.removals.lock().unwrap().push(request.clone());
        self.events.lock().unwrap().push("remove");
        match self.remove_status {
            Some(status) => Err(status_error("trakt", status)),
            None => Ok(RemovalSummary::default()),
        }
    }
}

/// TMDB lookups keyed by id; unknown ids answer 404
#[derive(Default)]
pub struct FakeTmdb {
    pub details: HashMap<u32, TmdbDetails>,
    pub calls: Mutex<Vec<(TmdbMediaType, u32)>>,
}

#[async_trait]
impl MetadataLookup for FakeTmdb {
    async fn details(&self, media_type: TmdbMediaType, tmdb_id: u32) -> Result<TmdbDetails, SourceError> {
        self.calls.lock().unwrap().push((media_type, tmdb_id));
        self.details
            .get(&tmdb_id)
            .cloned()
            .ok_or_else(|| status_error("tmdb", 404))
    }
}

/// OMDb lookups keyed by IMDb id; unknown ids answer 500
#[derive(Default)]
pub struct FakeOmdb {
    pub ratings: HashMap<String, OmdbRating>,
    pub calls: Mutex<Vec<String>>,
}

#[async_trait]
impl RatingLookup for FakeOmdb {
    async fn rating(&self, imdb_id: &str) -> Result<OmdbRating, SourceError> {
        self.calls.lock().unwrap().push(imdb_id.to_string());
        self.ratings
            .get(imdb_id)
            .cloned()
            .ok_or_else(|| status_error("omdb", 500))
    }
}

/// Archive store that keeps every created record; titles in `reject` fail with 400
#[derive(Default)]
pub struct FakeStore {
    pub reject: HashSet<String>,
    pub created: Mutex<Vec<(String, Map<String, Value>)>>,
    pub events: EventLog,
}

impl FakeStore {
    pub fn records(&self) -> Vec<Map<String, Value>> {
        self.created.lock().unwrap().iter().map(|(_, props)| props.clone()).collect()
    }

    pub fn create_calls(&self) -> usize {
        self.created.lock().unwrap().len()
    }
}

pub fn title_of(properties: &Map<String, Value>) -> String {
    properties["Title"]["title"][0]["text"]["content"]
        .as_str()
        .unwrap_or_default()
        .to_string()
}

#[async_trait]
impl ArchiveStore for FakeStore {
    fn store_name(&self) -> &str {
        "fake-notion"
    }

    async fn create_record(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> Result<CreatedRecord, SourceError> {
        self.events.lock().unwrap().push("archive");
        let title = title_of(&properties);
        if self.reject.contains(&title) {
            return Err(status_error("notion", 400));
        }
        let mut created = self.created.lock().unwrap();
        created.push((database_id.to_string(), properties));
        Ok(CreatedRecord {
            id: Some(format!("page-{}", created.len())),
            url: None,
        })
    }
}

pub struct Harness {
    pub watchlist: Arc<FakeWatchlist>,
    pub tmdb: Arc<FakeTmdb>,
    pub omdb: Arc<FakeOmdb>,
    pub store: Arc<FakeStore>,
    pub events: EventLog,
}

impl Harness {
    pub fn new(mut watchlist: FakeWatchlist) -> Self {
        let events = EventLog::default();
        watchlist.events = events.clone();
        Self {
            watchlist: Arc::new(watchlist),
            tmdb: Arc::new(FakeTmdb::default()),
            omdb: Arc::new(FakeOmdb::default()),
            store: Arc::new(FakeStore {
                events: events.clone(),
                ..FakeStore::default()
            }),
            events,
        }
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().unwrap().clone()
    }

    pub fn with_tmdb(mut self, tmdb: FakeTmdb) -> Self {
        self.tmdb = Arc::new(tmdb);
        self
    }

    pub fn with_omdb(mut self, omdb: FakeOmdb) -> Self {
        self.omdb = Arc::new(omdb);
        self
    }

    pub fn with_store(mut self, mut store: FakeStore) -> Self {
        store.events = self.events.clone();
        self.store = Arc::new(store);
        self
    }

    pub fn writer(&self) -> ArchiveWriter {
        let resolver = EnrichmentResolver::new(self.tmdb.clone(), self.omdb.clone());
        ArchiveWriter::new(self.store.clone(), resolver, "db-archive")
    }
}

/// `n` movies listed one minute apart, oldest first, each with a unique slug and trakt id
pub fn movies(n: usize) -> Vec<WatchlistEntry> {
    (0..n)
        .map(|i| {
            let ids = MediaIds {
                trakt: Some(1000 + i as u64),
                slug: Some(format!("movie-{i}")),
                ..MediaIds::default()
            };
            WatchlistEntry::new(MediaKind::Movie, format!("Movie {i}"), Some(2000), ids)
                .with_listed_at(format!("2024-01-01T{:02}:{:02}:00.000Z", i / 60, i % 60))
        })
        .collect()
}

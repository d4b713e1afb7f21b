use async_trait::async_trait;
use media_sync_models::{TmdbMediaType, WatchlistEntry};
use serde_json::{Map, Value};
use crate::error::SourceError;
use crate::notion::CreatedRecord;
use crate::omdb::OmdbRating;
use crate::tmdb::TmdbDetails;
use crate::trakt::{RemovalRequest, RemovalSummary};

/// The capped watchlist we evict from
#[async_trait]
pub trait WatchlistSource: Send + Sync {
    fn source_name(&self) -> &str;

    /// Fetch the user's watchlist in response order
    async fn fetch_watchlist(&self, user: &str) -> Result<Vec<WatchlistEntry>, SourceError>;

    /// Remove the given items in one batched call
    async fn remove_from_watchlist(&self, request: &RemovalRequest) -> Result<RemovalSummary, SourceError>;
}

/// Primary metadata source (genres, runtime, external id, artwork)
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    async fn details(&self, media_type: TmdbMediaType, tmdb_id: u32) -> Result<TmdbDetails, SourceError>;
}

/// Secondary source for the external rating and vote count
#[async_trait]
pub trait RatingLookup: Send + Sync {
    async fn rating(&self, imdb_id: &str) -> Result<OmdbRating, SourceError>;
}

/// Durable store archived records are written to
#[async_trait]
pub trait ArchiveStore: Send + Sync {
    fn store_name(&self) -> &str;

    async fn create_record(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> Result<CreatedRecord, SourceError>;
}

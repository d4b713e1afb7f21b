pub mod error;
pub mod http;
pub mod notion;
pub mod omdb;
pub mod tmdb;
pub mod traits;
pub mod trakt;

#[cfg(test)]
mod test_server;

pub use error::SourceError;
pub use http::{HttpClient, RetryPolicy};
pub use notion::{CreatedRecord, NotionClient};
pub use omdb::{OmdbClient, OmdbRating};
pub use tmdb::{TmdbClient, TmdbDetails};
pub use traits::{ArchiveStore, MetadataLookup, RatingLookup, WatchlistSource};
pub use trakt::{RemovalRequest, RemovalSummary, TraktClient};

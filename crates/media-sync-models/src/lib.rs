pub mod enrichment;
pub mod media;
pub mod media_ids;
pub mod watchlist;

pub use enrichment::EnrichmentResult;
pub use media::{MediaKind, TmdbMediaType};
pub use media_ids::MediaIds;
pub use watchlist::{WatchlistEntry, UNTITLED};

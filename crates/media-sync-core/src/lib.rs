pub mod archive;
pub mod enrichment;
pub mod error;
pub mod eviction;
pub mod overflow;
pub mod run;
pub mod watchlist;

pub use archive::{ArchiveOutcome, ArchiveRecord, ArchiveWriter, RecordLabels};
pub use enrichment::EnrichmentResolver;
pub use error::CoreError;
pub use eviction::{EvictionCommitter, RemovalOutcome};
pub use overflow::{partition, Partition};
pub use run::{ArchiveRun, RunReport, RunStatus, DEFAULT_CAPACITY};
pub use watchlist::{fetch_sorted_watchlist, FetchOutcome};

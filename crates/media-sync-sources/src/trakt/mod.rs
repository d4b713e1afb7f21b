pub mod api;
pub mod client;

pub use api::{KindCounts, RemovalRequest, RemovalSummary, TRAKT_API_BASE, TRAKT_SITE_BASE};
pub use client::TraktClient;

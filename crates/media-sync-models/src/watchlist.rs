use serde::{Deserialize, Serialize};
use crate::media::MediaKind;
use crate::media_ids::MediaIds;

pub const UNTITLED: &str = "Untitled";

/// One item of the source watchlist, as fetched for a single run
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchlistEntry {
    pub kind: MediaKind,
    pub title: String,
    pub year: Option<u32>,
    pub ids: MediaIds,
    /// Raw `listed_at` string from the source; ordering key for FIFO eviction
    pub listed_at: Option<String>,
}

impl WatchlistEntry {
    pub fn new(kind: MediaKind, title: impl Into<String>, year: Option<u32>, ids: MediaIds) -> Self {
        Self {
            kind,
            title: title.into(),
            year,
            ids,
            listed_at: None,
        }
    }

    pub fn with_listed_at(mut self, listed_at: impl Into<String>) -> Self {
        self.listed_at = Some(listed_at.into());
        self
    }

    /// Sort key; entries without a timestamp sort first
    pub fn sort_key(&self) -> &str {
        self.listed_at.as_deref().unwrap_or("")
    }

    /// "Title (Year)", or just the title when the year is unknown
    pub fn display_title(&self) -> String {
        match self.year {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    /// Link back to the item on the source site, if it has a slug
    pub fn source_url(&self, site_base: &str) -> Option<String> {
        self.ids.slug.as_ref().map(|slug| {
            format!("{}/{}/{}", site_base.trim_end_matches('/'), self.kind.plural(), slug)
        })
    }
}

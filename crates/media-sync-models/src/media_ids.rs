use serde::{Deserialize, Serialize};

/// Cross-reference identifiers attached to a Trakt list item.
///
/// Serialized back verbatim (minus absent ids) when asking Trakt to remove
/// the item, so field names follow the Trakt `ids` object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct MediaIds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trakt: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tmdb: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tvdb: Option<u32>,
}

impl MediaIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if all ID fields are empty
    pub fn is_empty(&self) -> bool {
        self.trakt.is_none()
            && self.slug.is_none()
            && self.imdb.is_none()
            && self.tmdb.is_none()
            && self.tvdb.is_none()
    }
}

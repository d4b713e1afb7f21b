use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of item a Trakt watchlist can hold that we know how to archive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Movie,
    Show,
    Season,
}

/// Type vocabulary of the TMDB details endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TmdbMediaType {
    Movie,
    Tv,
}

impl TmdbMediaType {
    pub fn as_path(&self) -> &'static str {
        match self {
            TmdbMediaType::Movie => "movie",
            TmdbMediaType::Tv => "tv",
        }
    }
}

impl MediaKind {
    /// Parse the `type` discriminator of a Trakt list item
    pub fn from_trakt_type(value: &str) -> Option<Self> {
        match value {
            "movie" => Some(MediaKind::Movie),
            "show" => Some(MediaKind::Show),
            "season" => Some(MediaKind::Season),
            _ => None,
        }
    }

    /// Singular wire label, also the key of the nested object in a list item
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movie",
            MediaKind::Show => "show",
            MediaKind::Season => "season",
        }
    }

    /// Plural label used in Trakt URLs and sync request bodies
    pub fn plural(&self) -> &'static str {
        match self {
            MediaKind::Movie => "movies",
            MediaKind::Show => "shows",
            MediaKind::Season => "seasons",
        }
    }

    /// Capitalized label written to the archive's "Media Type" select
    pub fn display_label(&self) -> &'static str {
        match self {
            MediaKind::Movie => "Movie",
            MediaKind::Show => "Show",
            MediaKind::Season => "Season",
        }
    }

    /// TMDB endpoint for this kind.
    ///
    /// Seasons have no standalone TMDB details endpoint keyed by the season id
    /// Trakt hands out, so they are never enriched.
    pub fn tmdb_type(&self) -> Option<TmdbMediaType> {
        match self {
            MediaKind::Movie => Some(TmdbMediaType::Movie),
            MediaKind::Show => Some(TmdbMediaType::Tv),
            MediaKind::Season => None,
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trakt_type_round_trip() {
        for kind in [MediaKind::Movie, MediaKind::Show, MediaKind::Season] {
            assert_eq!(MediaKind::from_trakt_type(kind.as_str()), Some(kind));
        }
        assert_eq!(MediaKind::from_trakt_type("episode"), None);
        assert_eq!(MediaKind::from_trakt_type("person"), None);
    }

    #[test]
    fn test_labels() {
        assert_eq!(MediaKind::Movie.plural(), "movies");
        assert_eq!(MediaKind::Season.plural(), "seasons");
        assert_eq!(MediaKind::Show.display_label(), "Show");
    }

    #[test]
    fn test_tmdb_type_mapping() {
        assert_eq!(MediaKind::Movie.tmdb_type(), Some(TmdbMediaType::Movie));
        assert_eq!(MediaKind::Show.tmdb_type().map(|t| t.as_path()), Some("tv"));
        assert_eq!(MediaKind::Season.tmdb_type(), None);
    }
}

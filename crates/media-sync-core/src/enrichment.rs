use media_sync_models::{EnrichmentResult, MediaKind};
use media_sync_sources::tmdb::{TMDB_IMAGE_BASE, TMDB_POSTER_SIZE};
use media_sync_sources::{MetadataLookup, OmdbRating, RatingLookup, TmdbDetails};
use std::sync::Arc;
use tracing::{debug, warn};

const NOT_AVAILABLE: &str = "N/A";

/// Looks up descriptive metadata and ratings for an archived entry.
///
/// `resolve` is total. Lookup failures only ever leave fields empty.
pub struct EnrichmentResolver {
    metadata: Arc<dyn MetadataLookup>,
    ratings: Arc<dyn RatingLookup>,
    poster_base: String,
}

impl EnrichmentResolver {
    pub fn new(metadata: Arc<dyn MetadataLookup>, ratings: Arc<dyn RatingLookup>) -> Self {
        Self {
            metadata,
            ratings,
            poster_base: format!("{}/{}", TMDB_IMAGE_BASE, TMDB_POSTER_SIZE),
        }
    }

    pub fn with_poster_base(mut self, image_base: &str, size: &str) -> Self {
        self.poster_base = format!("{}/{}", image_base.trim_end_matches('/'), size.trim_matches('/'));
        self
    }

    pub async fn resolve(&self, tmdb_id: Option<u32>, kind: MediaKind) -> EnrichmentResult {
        let Some(tmdb_id) = tmdb_id else {
            debug!(kind = %kind, "No TMDB id, skipping enrichment");
            return EnrichmentResult::empty();
        };
        let Some(media_type) = kind.tmdb_type() else {
            debug!(kind = %kind, tmdb_id, "Kind has no TMDB details endpoint, skipping enrichment");
            return EnrichmentResult::empty();
        };

        let details = match self.metadata.details(media_type, tmdb_id).await {
            Ok(details) => details,
            Err(e) => {
                warn!(
                    operation = "enrich",
                    tmdb_id,
                    status = ?e.status(),
                    error = %e,
                    "TMDB lookup failed"
                );
                return EnrichmentResult::empty();
            }
        };

        let mut result = EnrichmentResult {
            runtime_minutes: resolve_runtime(&details),
            poster_url: build_poster_url(&self.poster_base, details.poster_path.as_deref()),
            genres: details.genres,
            imdb_id: details.imdb_id,
            ..EnrichmentResult::default()
        };

        if let Some(imdb_id) = result.imdb_id.as_deref() {
            match self.ratings.rating(imdb_id).await {
                Ok(rating) => {
                    let (score, votes) = parse_rating(&rating);
                    result.imdb_rating = score;
                    result.imdb_votes = votes;
                }
                Err(e) => {
                    warn!(
                        operation = "enrich",
                        imdb_id,
                        status = ?e.status(),
                        error = %e,
                        "OMDb lookup failed"
                    );
                }
            }
        }

        result
    }
}

/// `runtime` when set, else the first episode runtime. Zero is treated as unknown.
pub fn resolve_runtime(details: &TmdbDetails) -> Option<u32> {
    details
        .runtime
        .filter(|m| *m > 0)
        .or_else(|| details.episode_run_time.first().copied().filter(|m| *m > 0))
}

pub fn build_poster_url(poster_base: &str, poster_path: Option<&str>) -> Option<String> {
    poster_path
        .filter(|p| !p.is_empty())
        .map(|p| format!("{}{}", poster_base, p))
}

enum Field<T> {
    Value(T),
    NotAvailable,
}

impl<T> Field<T> {
    fn into_option(self) -> Option<T> {
        match self {
            Field::Value(v) => Some(v),
            Field::NotAvailable => None,
        }
    }
}

fn parse_score(raw: Option<&str>) -> Option<Field<f64>> {
    let raw = raw?.trim();
    if raw == NOT_AVAILABLE {
        return Some(Field::NotAvailable);
    }
    let score: f64 = raw.parse().ok()?;
    score.is_finite().then_some(Field::Value(score))
}

fn parse_votes(raw: Option<&str>) -> Option<Field<u64>> {
    let raw = raw?.trim();
    if raw == NOT_AVAILABLE {
        return Some(Field::NotAvailable);
    }
    raw.replace(',', "").parse().ok().map(Field::Value)
}

/// Interpret OMDb's rating strings.
///
/// "N/A" clears only its own field. Anything else unparseable clears both.
pub fn parse_rating(rating: &OmdbRating) -> (Option<f64>, Option<u64>) {
    let score = parse_score(rating.imdb_rating.as_deref());
    let votes = parse_votes(rating.imdb_votes.as_deref());

    match (score, votes) {
        (Some(score), Some(votes)) => (
            score.into_option().filter(|s| *s > 0.0),
            votes.into_option().filter(|v| *v > 0),
        ),
        _ => {
            debug!(
                rating = ?rating.imdb_rating,
                votes = ?rating.imdb_votes,
                "Unparseable OMDb rating, dropping both fields"
            );
            (None, None)
        }
    }
}

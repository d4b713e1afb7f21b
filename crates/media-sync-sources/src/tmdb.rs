use crate::error::SourceError;
use crate::http::HttpClient;
use crate::traits::MetadataLookup;
use async_trait::async_trait;
use media_sync_models::TmdbMediaType;
use serde_json::Value;
use std::sync::Arc;

pub const TMDB_API_BASE: &str = "https://api.themoviedb.org/3";
pub const TMDB_IMAGE_BASE: &str = "https://image.tmdb.org/t/p";
pub const TMDB_POSTER_SIZE: &str = "w500";

/// Fields of a TMDB movie/tv details response that the archive uses.
///
/// Extracted field by field from the raw JSON so one oddly shaped field
/// never costs us the others.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TmdbDetails {
    pub genres: Vec<String>,
    pub runtime: Option<u32>,
    pub episode_run_time: Vec<u32>,
    pub imdb_id: Option<String>,
    pub poster_path: Option<String>,
}

impl TmdbDetails {
    pub fn from_json(value: &Value) -> Self {
        let genres = value
            .get("genres")
            .and_then(Value::as_array)
            .map(|genres| {
                genres
                    .iter()
                    .filter_map(|g| g.get("name").and_then(Value::as_str))
                    .filter(|name| !name.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let episode_run_time = value
            .get("episode_run_time")
            .and_then(Value::as_array)
            .map(|times| times.iter().filter_map(as_minutes).collect())
            .unwrap_or_default();

        Self {
            genres,
            runtime: value.get("runtime").and_then(as_minutes),
            episode_run_time,
            imdb_id: non_empty_str(value.get("imdb_id")),
            poster_path: non_empty_str(value.get("poster_path")),
        }
    }
}

fn as_minutes(value: &Value) -> Option<u32> {
    value.as_u64().and_then(|m| u32::try_from(m).ok())
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

pub struct TmdbClient {
    http: Arc<HttpClient>,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(http: Arc<HttpClient>, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: TMDB_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl MetadataLookup for TmdbClient {
    async fn details(&self, media_type: TmdbMediaType, tmdb_id: u32) -> Result<TmdbDetails, SourceError> {
        let url = format!("{}/{}/{}", self.base_url, media_type.as_path(), tmdb_id);
        let request = self.http.get(&url).query(&[("api_key", self.api_key.as_str())]);
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::Status {
                service: "tmdb",
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|source| SourceError::Decode { service: "tmdb", source })?;
        if !value.is_object() {
            return Err(SourceError::UnexpectedShape {
                service: "tmdb",
                message: "details response is not an object".to_string(),
            });
        }

        Ok(TmdbDetails::from_json(&value))
    }
}

use crate::error::SourceError;
use crate::http::HttpClient;
use crate::traits::RatingLookup;
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

pub const OMDB_API_BASE: &str = "http://www.omdbapi.com";

/// Raw rating fields as OMDb returns them ("7.9", "1,234,567", "N/A").
///
/// Interpretation is left to the caller; a field that is missing or not a
/// string is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OmdbRating {
    pub imdb_rating: Option<String>,
    pub imdb_votes: Option<String>,
}

impl OmdbRating {
    pub fn from_json(value: &Value) -> Self {
        Self {
            imdb_rating: value.get("imdbRating").and_then(Value::as_str).map(str::to_string),
            imdb_votes: value.get("imdbVotes").and_then(Value::as_str).map(str::to_string),
        }
    }
}

pub struct OmdbClient {
    http: Arc<HttpClient>,
    api_key: String,
    base_url: String,
}

impl OmdbClient {
    pub fn new(http: Arc<HttpClient>, api_key: String) -> Self {
        Self {
            http,
            api_key,
            base_url: OMDB_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl RatingLookup for OmdbClient {
    async fn rating(&self, imdb_id: &str) -> Result<OmdbRating, SourceError> {
        let url = format!("{}/", self.base_url);
        let request = self
            .http
            .get(&url)
            .query(&[("apikey", self.api_key.as_str()), ("i", imdb_id)]);
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response.text().await?;
        tracing::debug!(imdb_id, status = status.as_u16(), "OMDb response received");
        if !status.is_success() {
            return Err(SourceError::Status {
                service: "omdb",
                status: status.as_u16(),
                body,
            });
        }

        let value: Value = serde_json::from_str(&body)
            .map_err(|source| SourceError::Decode { service: "omdb", source })?;
        Ok(OmdbRating::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::RetryPolicy;
    use crate::test_server::{MockResponse, MockServer};
    use serde_json::json;
    use std::time::Duration;

    #[test]
    fn test_from_json_keeps_raw_strings() {
        let rating = OmdbRating::from_json(&json!({"imdbRating": "N/A", "imdbVotes": "12,345"}));
        assert_eq!(rating.imdb_rating.as_deref(), Some("N/A"));
        assert_eq!(rating.imdb_votes.as_deref(), Some("12,345"));

        let rating = OmdbRating::from_json(&json!({"Response": "False", "Error": "Incorrect IMDb ID."}));
        assert_eq!(rating, OmdbRating::default());
    }

    #[tokio::test]
    async fn test_rating_query_parameters() {
        let server = MockServer::start(vec![MockResponse::json(
            200,
            r#"{"imdbRating":"8.0","imdbVotes":"757,000"}"#,
        )])
        .await;
        let http = HttpClient::new(RetryPolicy::new(1, 0.0), Duration::from_secs(5), Duration::from_secs(5)).unwrap();
        let client = OmdbClient::new(Arc::new(http), "abc".into()).with_base_url(server.base_url());

        let rating = client.rating("tt2543164").await.unwrap();

        assert_eq!(rating.imdb_rating.as_deref(), Some("8.0"));
        assert_eq!(server.requests()[0].path, "/?apikey=abc&i=tt2543164");
    }
}

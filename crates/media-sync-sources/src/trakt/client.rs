use crate::error::SourceError;
use crate::http::HttpClient;
use crate::traits::WatchlistSource;
use crate::trakt::api::{self, RemovalRequest, RemovalSummary, TRAKT_API_BASE};
use async_trait::async_trait;
use media_sync_models::WatchlistEntry;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct TraktClient {
    http: Arc<HttpClient>,
    api_key: String,
    access_token: String,
    base_url: String,
}

impl TraktClient {
    pub fn new(http: Arc<HttpClient>, api_key: String, access_token: String) -> Self {
        Self {
            http,
            api_key,
            access_token,
            base_url: TRAKT_API_BASE.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl WatchlistSource for TraktClient {
    fn source_name(&self) -> &str {
        "trakt"
    }

    async fn fetch_watchlist(&self, user: &str) -> Result<Vec<WatchlistEntry>, SourceError> {
        let url = format!("{}/users/{}/watchlist", self.base_url, urlencoding::encode(user));
        debug!(url = %url, "Fetching Trakt watchlist");

        let request = api::with_trakt_headers(self.http.get(&url), &self.api_key, &self.access_token);
        let response = self.http.send(request).await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(SourceError::Status {
                service: "trakt",
                status: status.as_u16(),
                body,
            });
        }

        let items: Vec<Value> = serde_json::from_str(&body)
            .map_err(|source| SourceError::Decode { service: "trakt", source })?;

        Ok(api::parse_watchlist(items))
    }

    async fn remove_from_watchlist(&self, request: &RemovalRequest) -> Result<RemovalSummary, SourceError> {
        let url = format!("{}/sync/watchlist/remove", self.base_url);

        let http_request = api::with_trakt_headers(self.http.post(&url), &self.api_key, &self.access_token)
            .json(request);
        // Removing an entry twice leaves the same watchlist
        let response = self.http.send_repeatable(http_request).await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();

        // Trakt answers 201 for sync writes; 200 is accepted as well
        if status != 200 && status != 201 {
            return Err(SourceError::Status {
                service: "trakt",
                status,
                body,
            });
        }

        let summary = api::parse_removal_summary(&body);
        info!(
            requested = request.len(),
            deleted = summary.deleted.total(),
            not_found = summary.not_found.total(),
            "Trakt accepted watchlist removal"
        );
        Ok(summary)
    }
}

use crate::error::SourceError;
use crate::http::HttpClient;
use crate::traits::ArchiveStore;
use async_trait::async_trait;
use serde_json::{json, Map, Value};
use std::sync::Arc;

pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

/// Identifiers of a freshly created archive page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreatedRecord {
    pub id: Option<String>,
    pub url: Option<String>,
}

pub struct NotionClient {
    http: Arc<HttpClient>,
    token: String,
    base_url: String,
    version: String,
}

impl NotionClient {
    pub fn new(http: Arc<HttpClient>, token: String) -> Self {
        Self {
            http,
            token,
            base_url: NOTION_API_BASE.to_string(),
            version: NOTION_VERSION.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }
}

#[async_trait]
impl ArchiveStore for NotionClient {
    fn store_name(&self) -> &str {
        "notion"
    }

    async fn create_record(
        &self,
        database_id: &str,
        properties: Map<String, Value>,
    ) -> Result<CreatedRecord, SourceError> {
        let url = format!("{}/pages", self.base_url);
        let payload = json!({
            "parent": {"database_id": database_id},
            "properties": properties,
        });

        let request = self
            .http
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.token))
            .header("Notion-Version", &self.version)
            .json(&payload);
        let response = self.http.send(request).await?;

        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        if status != 200 {
            return Err(SourceError::Status {
                service: "notion",
                status,
                body,
            });
        }

        let value: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        Ok(CreatedRecord {
            id: value.get("id").and_then(Value::as_str).map(str::to_string),
            url: value.get("url").and_then(Value::as_str).map(str::to_string),
        })
    }
}

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub const NOTION_TOKEN: &str = "notion_token";
pub const TRAKT_API_KEY: &str = "trakt_api_key";
pub const TRAKT_ACCESS_TOKEN: &str = "trakt_access_token";
pub const TMDB_API_KEY: &str = "tmdb_api_key";
pub const OMDB_API_KEY: &str = "omdb_api_key";

/// Every secret a run needs
pub const REQUIRED_KEYS: [&str; 5] = [NOTION_TOKEN, TRAKT_API_KEY, TRAKT_ACCESS_TOKEN, TMDB_API_KEY, OMDB_API_KEY];

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

/// API secrets kept in `credentials.toml`.
///
/// `resolve` lets the upper-cased environment variable (`NOTION_TOKEN` for
/// `notion_token`) win over the file, which is how containers inject them.
pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    pub fn resolve(&self, key: &str) -> Option<String> {
        self.resolve_with(key, |name| std::env::var(name).ok())
    }

    /// Environment value for `key` if set and non-empty, else the stored one
    pub fn resolve_with<F>(&self, key: &str, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(&key.to_uppercase())
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.get(key).filter(|v| !v.trim().is_empty()).cloned())
    }

    pub fn missing_keys(&self) -> Vec<&'static str> {
        self.missing_keys_with(|name| std::env::var(name).ok())
    }

    pub fn missing_keys_with<F>(&self, lookup: F) -> Vec<&'static str>
    where
        F: Fn(&str) -> Option<String>,
    {
        REQUIRED_KEYS
            .iter()
            .copied()
            .filter(|key| self.resolve_with(key, &lookup).is_none())
            .collect()
    }

    pub fn get_notion_token(&self) -> Option<String> {
        self.resolve(NOTION_TOKEN)
    }

    pub fn get_trakt_api_key(&self) -> Option<String> {
        self.resolve(TRAKT_API_KEY)
    }

    pub fn get_trakt_access_token(&self) -> Option<String> {
        self.resolve(TRAKT_ACCESS_TOKEN)
    }

    pub fn get_tmdb_api_key(&self) -> Option<String> {
        self.resolve(TMDB_API_KEY)
    }

    pub fn get_omdb_api_key(&self) -> Option<String> {
        self.resolve(OMDB_API_KEY)
    }
}

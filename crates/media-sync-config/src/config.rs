use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub trakt: TraktConfig,
    #[serde(default)]
    pub notion: NotionConfig,
    #[serde(default)]
    pub tmdb: TmdbConfig,
    #[serde(default)]
    pub omdb: OmdbConfig,
    #[serde(default)]
    pub archive: ArchiveConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub scheduler: Option<SchedulerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TraktConfig {
    #[serde(default)]
    pub username: String,
    #[serde(default = "default_trakt_api_base")]
    pub api_base: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotionConfig {
    #[serde(default)]
    pub database_id: String,
    #[serde(default = "default_notion_api_base")]
    pub api_base: String,
    #[serde(default = "default_notion_version")]
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TmdbConfig {
    #[serde(default = "default_tmdb_api_base")]
    pub api_base: String,
    #[serde(default = "default_tmdb_image_base")]
    pub image_base: String,
    #[serde(default = "default_poster_size")]
    pub poster_size: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OmdbConfig {
    #[serde(default = "default_omdb_api_base")]
    pub api_base: String,
}

/// How the watchlist is capped and how evicted entries are labelled
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArchiveConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default)]
    pub dry_run: bool,
    /// IANA zone the "Date Removed" timestamp is written in
    #[serde(default = "default_archive_timezone")]
    pub timezone: String,
    #[serde(default = "default_status_label")]
    pub status_label: String,
    #[serde(default = "default_source_tag")]
    pub source_tag: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HttpConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SchedulerConfig {
    /// Six-field cron expression, evaluated in UTC
    #[serde(default = "default_schedule")]
    pub schedule: String,
    #[serde(default = "default_true")]
    pub run_on_startup: bool,
}

fn default_trakt_api_base() -> String {
    "https://api.trakt.tv".to_string()
}

fn default_notion_api_base() -> String {
    "https://api.notion.com/v1".to_string()
}

fn default_notion_version() -> String {
    "2022-06-28".to_string()
}

fn default_tmdb_api_base() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_image_base() -> String {
    "https://image.tmdb.org/t/p".to_string()
}

fn default_poster_size() -> String {
    "w500".to_string()
}

fn default_omdb_api_base() -> String {
    "http://www.omdbapi.com".to_string()
}

fn default_capacity() -> usize {
    100
}

fn default_archive_timezone() -> String {
    "Pacific/Auckland".to_string()
}

fn default_status_label() -> String {
    "Not on Trakt".to_string()
}

fn default_source_tag() -> String {
    "Trakt".to_string()
}

fn default_max_attempts() -> u32 {
    5
}

fn default_backoff_factor() -> f64 {
    1.5
}

fn default_connect_timeout_secs() -> u64 {
    10
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_schedule() -> String {
    "0 0 */6 * * *".to_string() // Every 6 hours
}

impl Default for TraktConfig {
    fn default() -> Self {
        Self {
            username: String::new(),
            api_base: default_trakt_api_base(),
        }
    }
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            database_id: String::new(),
            api_base: default_notion_api_base(),
            version: default_notion_version(),
        }
    }
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_base: default_tmdb_api_base(),
            image_base: default_tmdb_image_base(),
            poster_size: default_poster_size(),
        }
    }
}

impl Default for OmdbConfig {
    fn default() -> Self {
        Self {
            api_base: default_omdb_api_base(),
        }
    }
}

impl Default for ArchiveConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            dry_run: false,
            timezone: default_archive_timezone(),
            status_label: default_status_label(),
            source_tag: default_source_tag(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            backoff_factor: default_backoff_factor(),
            connect_timeout_secs: default_connect_timeout_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

pub fn default_scheduler_config() -> SchedulerConfig {
    SchedulerConfig {
        schedule: default_schedule(),
        run_on_startup: default_true(),
    }
}

pub const ENV_USERNAME: &str = "TRAKT_USERNAME";
pub const ENV_DATABASE_ID: &str = "DATABASE_ID";
pub const ENV_DRY_RUN: &str = "DRY_RUN";
pub const ENV_LIMIT: &str = "TRAKT_LIMIT";

impl Config {
    pub fn load_from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, path: &PathBuf) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load the file if it exists, otherwise start from defaults
    pub fn load_or_default(path: &PathBuf) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; empty values are ignored
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(username) = get(ENV_USERNAME) {
            self.trakt.username = username;
        }
        if let Some(database_id) = get(ENV_DATABASE_ID) {
            self.notion.database_id = database_id;
        }
        if let Some(dry_run) = get(ENV_DRY_RUN) {
            self.archive.dry_run = dry_run.trim().eq_ignore_ascii_case("true");
        }
        if let Some(limit) = get(ENV_LIMIT) {
            self.archive.capacity = limit.trim().parse().map_err(|_| ConfigError::InvalidOverride {
                key: ENV_LIMIT,
                value: limit.clone(),
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trakt.username.trim().is_empty() {
            return Err(ConfigError::Missing("trakt.username"));
        }
        if self.notion.database_id.trim().is_empty() {
            return Err(ConfigError::Missing("notion.database_id"));
        }
        if self.archive.capacity == 0 {
            return Err(ConfigError::ZeroCapacity);
        }
        if self.archive.timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(ConfigError::UnknownTimezone(self.archive.timezone.clone()));
        }
        if self.http.max_attempts == 0 {
            return Err(ConfigError::ZeroAttempts);
        }
        if !self.http.backoff_factor.is_finite() || self.http.backoff_factor < 0.0 {
            return Err(ConfigError::InvalidBackoff(self.http.backoff_factor));
        }
        if let Some(scheduler) = &self.scheduler {
            if scheduler.schedule.trim().is_empty() {
                return Err(ConfigError::Missing("scheduler.schedule"));
            }
        }
        Ok(())
    }

    pub fn is_configured(&self) -> bool {
        self.validate().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    fn configured() -> Config {
        let mut config = Config::default();
        config.trakt.username = "someone".to_string();
        config.notion.database_id = "0123456789abcdef".to_string();
        config
    }

    #[test]
    fn test_config_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let mut config = configured();
        config.archive.capacity = 250;
        config.scheduler = Some(SchedulerConfig {
            schedule: "0 30 * * * *".to_string(),
            run_on_startup: false,
        });

        let path = file.path().to_path_buf();
        config.save_to_file(&path).unwrap();

        let loaded = Config::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_minimal_file_gets_defaults() {
        let config: Config = toml::from_str(
            r#"
            [trakt]
            username = "someone"

            [notion]
            database_id = "abc"
            "#,
        )
        .unwrap();

        assert_eq!(config.trakt.api_base, "https://api.trakt.tv");
        assert_eq!(config.notion.version, "2022-06-28");
        assert_eq!(config.tmdb.poster_size, "w500");
        assert_eq!(config.omdb.api_base, "http://www.omdbapi.com");
        assert_eq!(config.archive.capacity, 100);
        assert!(!config.archive.dry_run);
        assert_eq!(config.archive.timezone, "Pacific/Auckland");
        assert_eq!(config.archive.status_label, "Not on Trakt");
        assert_eq!(config.http.max_attempts, 5);
        assert_eq!(config.http.backoff_factor, 1.5);
        assert!(config.scheduler.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = HashMap::from([
            ("TRAKT_USERNAME", "from-env"),
            ("DATABASE_ID", "db-env"),
            ("DRY_RUN", "TRUE"),
            ("TRAKT_LIMIT", "42"),
        ]);
        let mut config = configured();

        config
            .apply_overrides_from(|k| env.get(k).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.trakt.username, "from-env");
        assert_eq!(config.notion.database_id, "db-env");
        assert!(config.archive.dry_run);
        assert_eq!(config.archive.capacity, 42);
    }

    #[test]
    fn test_env_dry_run_only_true_enables() {
        let mut config = configured();
        config.archive.dry_run = true;
        config.apply_overrides_from(|k| (k == "DRY_RUN").then(|| "yes".to_string())).unwrap();
        assert!(!config.archive.dry_run);
    }

    #[test]
    fn test_env_empty_values_ignored_and_bad_limit_rejected() {
        let mut config = configured();
        config.apply_overrides_from(|_| Some("  ".to_string())).unwrap();
        assert_eq!(config, configured());

        let err = config
            .apply_overrides_from(|k| (k == "TRAKT_LIMIT").then(|| "lots".to_string()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOverride { key: "TRAKT_LIMIT", .. }));
    }

    #[test]
    fn test_config_validate() {
        assert!(matches!(Config::default().validate(), Err(ConfigError::Missing("trakt.username"))));

        let mut config = configured();
        assert!(config.validate().is_ok());

        config.archive.capacity = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroCapacity)));
        config.archive.capacity = 100;

        config.archive.timezone = "Mars/Olympus_Mons".to_string();
        assert!(matches!(config.validate(), Err(ConfigError::UnknownTimezone(_))));
        config.archive.timezone = "Europe/Berlin".to_string();

        config.http.max_attempts = 0;
        assert!(matches!(config.validate(), Err(ConfigError::ZeroAttempts)));
        config.http.max_attempts = 1;

        config.scheduler = Some(SchedulerConfig {
            schedule: "  ".to_string(),
            run_on_startup: true,
        });
        assert!(matches!(config.validate(), Err(ConfigError::Missing("scheduler.schedule"))));
    }
}

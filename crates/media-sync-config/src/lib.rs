pub mod config;
pub mod credentials;
pub mod error;
pub mod paths;

pub use config::{default_scheduler_config, ArchiveConfig, Config, HttpConfig, NotionConfig, OmdbConfig, SchedulerConfig, TmdbConfig, TraktConfig};
pub use credentials::CredentialStore;
pub use error::ConfigError;
pub use paths::{container_base_path, PathManager};

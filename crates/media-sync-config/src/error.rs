use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} is not configured")]
    Missing(&'static str),

    #[error("archive.capacity must be at least 1")]
    ZeroCapacity,

    #[error("Unknown time zone '{0}'")]
    UnknownTimezone(String),

    #[error("http.max_attempts must be at least 1")]
    ZeroAttempts,

    #[error("http.backoff_factor must be a non-negative number, got {0}")]
    InvalidBackoff(f64),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidOverride { key: &'static str, value: String },
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown time zone '{0}'")]
    UnknownTimezone(String),
}

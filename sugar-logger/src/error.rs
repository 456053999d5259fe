use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogError {
    #[error("Unknown log level: {0}")]
    UnknownLevel(String),

    #[error("Unknown log format: {0}")]
    UnknownFormat(String),

    #[error("Invalid output path: {0:?}")]
    InvalidOutput(String),

    #[error("Failed to open log output {path}: {reason}")]
    OutputInit { path: String, reason: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type LogResult<T> = Result<T, LogError>;

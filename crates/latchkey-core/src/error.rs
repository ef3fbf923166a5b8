//! Core model error types.

use thiserror::Error;

/// Errors produced while building or parsing core model values.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid resource name: {0}")]
    InvalidArn(String),

    #[error("unsupported bundle scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid bundle URI: {0}")]
    InvalidUri(String),

    #[error("invalid bundle version {version}: {reason}")]
    InvalidVersion { version: String, reason: String },

    #[error("invalid handler entry point: {0}")]
    InvalidHandler(String),

    #[error("invalid schedule expression: {0}")]
    InvalidSchedule(String),

    #[error("config file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;

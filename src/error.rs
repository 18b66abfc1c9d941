use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("service unavailable: {0}")]
    Unavailable(String),

    #[error("invalid service url '{0}'")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid duration '{0}'; expected <number>[ms|s|m|h]")]
    InvalidDuration(String),

    #[error("duration must be greater than 0")]
    ZeroDuration,

    #[error("visibility threshold must be within (0, 1], got {0}")]
    InvalidThreshold(f32),

    #[error("base url must start with http:// or https://, got '{0}'")]
    InvalidUrl(String),

    #[error("failed to read seed file {path}: {source}")]
    SeedIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse seed file {path}: {source}")]
    SeedParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

//! Error type shared by the clustering, QUBO and sampling stages.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum QuboError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("clustering failed: {0}")]
    Clustering(String),

    #[error("sampler error: {0}")]
    Sampler(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, QuboError>;

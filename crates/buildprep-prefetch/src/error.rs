use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefetchError {
    #[error("invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    #[error("no entitlement certificate files found in {0}")]
    EntitlementCertsNotFound(PathBuf),

    #[error("failed to serialize prefetch input: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PrefetchError>;

use crate::{ConfigError, SnapshotError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error("insufficient data: no games recorded against any archetype")]
    InsufficientData,
    #[error("invalid snapshot: {0}")]
    Snapshot(#[from] SnapshotError),
    #[error("invalid config: {0}")]
    Config(#[from] ConfigError),
    #[error("invalid allocation: {0}")]
    InvalidAllocation(String),
    #[error("source error: {0}")]
    Source(String),
}

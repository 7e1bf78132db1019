use thiserror::Error;

/// Core domain errors
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid repository id: {id} (expected owner/name)")]
    InvalidFormat { id: String },

    #[error("Failed to persist tracking state: {source}")]
    Persistence { source: anyhow::Error },
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Failures reported by the document store and its adjacent collaborators.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failures inside the recommendation pipeline. Never surfaced past the facade.
#[derive(thiserror::Error, Debug)]
pub enum EngineError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Pipeline panicked: {0}")]
    Panicked(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

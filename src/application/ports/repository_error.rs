#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("connection failed: {0}")]
    ConnectionFailed(String),
    #[error("query failed: {0}")]
    QueryFailed(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error("stored value could not be decoded: {0}")]
    Corrupted(String),
}

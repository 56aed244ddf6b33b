use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("invalid persisted data: {0}")]
    InvalidData(String),

    #[error("core error: {0}")]
    Core(#[from] stashdb_core::CoreError),
}

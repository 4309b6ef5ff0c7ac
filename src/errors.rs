use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("STORAGE_IO: {0}")]
    StorageIo(String),
    #[error("CORRUPT_DATA: {0}")]
    CorruptData(String),
    #[error("MALFORMED_TIMESTAMP: {input:?}: {reason}")]
    MalformedTimestamp { input: String, reason: String },
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::StorageIo(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::CorruptData(value.to_string())
    }
}

impl From<tempfile::PersistError> for AppError {
    fn from(value: tempfile::PersistError) -> Self {
        Self::StorageIo(value.error.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

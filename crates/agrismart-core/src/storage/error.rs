//! Storage errors.

use thiserror::Error;

/// Errors raised by the document store.
#[derive(Error, Debug)]
pub enum StorageError {
    /// SQLite failure, including opening the database.
    #[error("Database error: {0}")]
    Connection(#[from] rusqlite::Error),

    /// No document at `collection/id`.
    #[error("Document not found: {0}")]
    NotFound(String),

    /// A body could not be encoded or decoded as JSON.
    #[error("Document encoding error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored or submitted body has the wrong shape.
    #[error("Invalid document: {0}")]
    InvalidData(String),
}

pub type StorageResult<T> = std::result::Result<T, StorageError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_names_the_document() {
        let err = StorageError::NotFound("alerts/a-1".to_string());
        assert_eq!(err.to_string(), "Document not found: alerts/a-1");
    }

    #[test]
    fn test_from_serde_error() {
        let err: StorageError = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, StorageError::Serialization(_)));
    }
}

//! ByteStore port for keyed byte-stream persistence.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during byte-store operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    /// Key cannot be mapped to a storage location.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Permission denied
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(String),
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::PermissionDenied => StorageError::PermissionDenied(err.to_string()),
            _ => StorageError::Io(err.to_string()),
        }
    }
}

/// Keyed storage of whole byte streams.
///
/// `write_all` must be atomic: after it returns, or after a crash during it,
/// a subsequent `read_all` sees either the previous stream or the new one,
/// never a mix.
#[async_trait]
pub trait ByteStore: Send + Sync {
    /// Reads the stream stored under `key`, `None` when nothing was written.
    async fn read_all(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Replaces the stream stored under `key`.
    async fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;
}

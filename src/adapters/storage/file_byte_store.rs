//! File-based ByteStore Adapter
//!
//! Stores each key's stream as `{base_path}/{key}.bin`.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::ports::{ByteStore, StorageError};

/// Filesystem storage for keyed byte streams.
///
/// # Atomic Writes
///
/// Uses a write-to-temp-then-rename pattern:
/// 1. Write content to `{key}.bin.tmp`
/// 2. Sync to disk
/// 3. Rename to `{key}.bin`
///
/// A crash mid-write leaves the previous `{key}.bin` untouched.
#[derive(Debug, Clone)]
pub struct FileByteStore {
    base_path: PathBuf,
}

impl FileByteStore {
    /// Creates a store rooted at `base_path`. The directory is created on
    /// first write.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn file_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.bin", key)))
    }

    fn temp_path(&self, key: &str) -> Result<PathBuf, StorageError> {
        validate_key(key)?;
        Ok(self.base_path.join(format!("{}.bin.tmp", key)))
    }
}

/// Keys map to file names, so only a conservative character set is allowed.
fn validate_key(key: &str) -> Result<(), StorageError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}

async fn write_temp(temp_path: &Path, bytes: &[u8]) -> Result<(), StorageError> {
    let mut file = fs::File::create(temp_path).await.map_err(|e| {
        StorageError::Io(format!(
            "Failed to create temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    file.write_all(bytes).await.map_err(|e| {
        StorageError::Io(format!(
            "Failed to write to temp file {}: {}",
            temp_path.display(),
            e
        ))
    })?;

    file.sync_all().await.map_err(|e| {
        StorageError::Io(format!(
            "Failed to sync temp file {}: {}",
            temp_path.display(),
            e
        ))
    })
}

#[async_trait]
impl ByteStore for FileByteStore {
    async fn read_all(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.file_path(key)?;

        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        let final_path = self.file_path(key)?;
        let temp_path = self.temp_path(key)?;

        fs::create_dir_all(&self.base_path).await.map_err(|e| {
            StorageError::Io(format!(
                "Failed to create directory {}: {}",
                self.base_path.display(),
                e
            ))
        })?;

        let written = match write_temp(&temp_path, bytes).await {
            Ok(()) => fs::rename(&temp_path, &final_path).await.map_err(|e| {
                StorageError::Io(format!(
                    "Failed to rename {} to {}: {}",
                    temp_path.display(),
                    final_path.display(),
                    e
                ))
            }),
            Err(e) => Err(e),
        };

        if let Err(e) = written {
            // Never leave a partial temp file behind.
            if let Err(cleanup) = fs::remove_file(&temp_path).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    tracing::warn!(path = %temp_path.display(), error = %cleanup, "Failed to remove temp file");
                }
            }
            return Err(e);
        }

        tracing::debug!(path = %final_path.display(), bytes = bytes.len(), "Wrote byte stream");
        Ok(())
    }
}

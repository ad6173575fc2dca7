//! In-Memory ByteStore Adapter
//!
//! Keeps streams in memory. Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::ports::{ByteStore, StorageError};

/// In-memory storage for keyed byte streams.
#[derive(Debug, Clone, Default)]
pub struct InMemoryByteStore {
    streams: Arc<RwLock<HashMap<String, Vec<u8>>>>,
    fail_writes: Arc<AtomicBool>,
    write_count: Arc<AtomicUsize>,
}

impl InMemoryByteStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `bytes` under `key`.
    pub fn with_stream(key: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        let mut streams = HashMap::new();
        streams.insert(key.into(), bytes.into());
        Self {
            streams: Arc::new(RwLock::new(streams)),
            ..Self::default()
        }
    }

    /// Makes every subsequent write fail, leaving stored streams untouched.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }

    /// Stored stream for `key`, bypassing the port.
    pub async fn stream(&self, key: &str) -> Option<Vec<u8>> {
        self.streams.read().await.get(key).cloned()
    }
}

#[async_trait]
impl ByteStore for InMemoryByteStore {
    async fn read_all(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.streams.read().await.get(key).cloned())
    }

    async fn write_all(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StorageError::Io("simulated write failure".to_string()));
        }
        self.streams
            .write()
            .await
            .insert(key.to_string(), bytes.to_vec());
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

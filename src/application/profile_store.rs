//! ProfileStore - durable load/save of the installation's single profile.
//!
//! Loading never fails: a missing, unreadable or undecodable stream yields a
//! default profile and a warning. Saving always writes the current schema
//! version. Load, save and update are serialized through one async lock, so
//! a later call waits for the earlier one to finish.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::foundation::ValidationError;
use crate::domain::profile::{self, Profile, SchemaError};
use crate::ports::{ByteStore, StorageError};

/// Key used when none is configured.
pub const DEFAULT_PROFILE_KEY: &str = "user";

/// Errors surfaced by `save` and `update`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to encode profile: {0}")]
    Encode(#[from] SchemaError),

    #[error("failed to write profile: {0}")]
    Storage(#[from] StorageError),

    #[error("profile change rejected: {0}")]
    Rejected(#[from] ValidationError),
}

pub struct ProfileStore {
    store: Arc<dyn ByteStore>,
    key: String,
    lock: Mutex<()>,
}

impl ProfileStore {
    pub fn new(store: Arc<dyn ByteStore>) -> Self {
        Self::with_key(store, DEFAULT_PROFILE_KEY)
    }

    pub fn with_key(store: Arc<dyn ByteStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Loads the profile, falling back to a default one on any failure.
    pub async fn load(&self) -> Profile {
        let _guard = self.lock.lock().await;
        self.load_unlocked().await
    }

    /// Persists the profile in the current schema version.
    ///
    /// On error the previously stored profile is still readable.
    pub async fn save(&self, profile: &Profile) -> Result<(), StoreError> {
        let _guard = self.lock.lock().await;
        self.save_unlocked(profile).await
    }

    /// Loads, applies `change`, and saves, all under the store lock.
    ///
    /// Nothing is written when `change` fails.
    pub async fn update<F>(&self, change: F) -> Result<Profile, StoreError>
    where
        F: FnOnce(&mut Profile) -> Result<(), ValidationError>,
    {
        let _guard = self.lock.lock().await;
        let mut profile = self.load_unlocked().await;
        change(&mut profile)?;
        self.save_unlocked(&profile).await?;
        Ok(profile)
    }

    async fn load_unlocked(&self) -> Profile {
        let bytes = match self.store.read_all(&self.key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                tracing::debug!(key = %self.key, "No stored profile, starting fresh");
                return Profile::default();
            }
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Profile read failed, using defaults");
                return Profile::default();
            }
        };

        match profile::decode(&bytes) {
            Ok(profile) => profile,
            Err(e) => {
                tracing::warn!(
                    key = %self.key,
                    bytes = bytes.len(),
                    error = %e,
                    "Stored profile could not be decoded, using defaults"
                );
                Profile::default()
            }
        }
    }

    async fn save_unlocked(&self, profile: &Profile) -> Result<(), StoreError> {
        let bytes = profile::encode(profile)?;
        self.store.write_all(&self.key, &bytes).await?;
        tracing::debug!(key = %self.key, bytes = bytes.len(), "Saved profile");
        Ok(())
    }
}

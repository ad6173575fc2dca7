//! Profile storage configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::error::ValidationError;
use crate::adapters::storage::FileByteStore;
use crate::application::{ProfileStore, DEFAULT_PROFILE_KEY};

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the profile stream
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Stream key of the installation's profile
    #[serde(default = "default_profile_key")]
    pub profile_key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            profile_key: default_profile_key(),
        }
    }
}

impl StorageConfig {
    /// File-backed profile store rooted at `data_dir`.
    pub fn profile_store(&self) -> ProfileStore {
        ProfileStore::with_key(
            Arc::new(FileByteStore::new(&self.data_dir)),
            self.profile_key.clone(),
        )
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.profile_key.trim().is_empty() {
            return Err(ValidationError::EmptyProfileKey);
        }
        Ok(())
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_profile_key() -> String {
    DEFAULT_PROFILE_KEY.to_string()
}

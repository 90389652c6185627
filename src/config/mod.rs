//! Configuration
//!
//! Layered with the `config` crate: built-in defaults, the global file, the
//! workspace `dbafs.toml`, then `DBAFS__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod workspace;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use workspace::storage_paths::StorageConfig;

use crate::error::ApiError;
use crate::logging::LoggingConfig;
use crate::tree::hasher::DEFAULT_SIZE_LIMIT;
use serde::{Deserialize, Deserializer, Serialize};

/// Root configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DbafsConfig {
    #[serde(default)]
    pub files: FilesConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl DbafsConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        self.files.validate()
    }
}

fn default_upload_path() -> String {
    "files".to_string()
}

fn default_size_limit() -> u64 {
    DEFAULT_SIZE_LIMIT
}

/// Upload tree settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    /// Upload root, relative to the workspace root.
    #[serde(default = "default_upload_path")]
    pub upload_path: String,

    /// Folders below the upload root that are never synchronized.
    /// Accepts a list or a comma separated string.
    #[serde(default, deserialize_with = "list_or_csv")]
    pub sync_exclude: Vec<String>,

    /// Files at or above this many bytes are not hashed.
    #[serde(default = "default_size_limit")]
    pub size_limit: u64,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            upload_path: default_upload_path(),
            sync_exclude: Vec::new(),
            size_limit: default_size_limit(),
        }
    }
}

impl FilesConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        let normalized = crate::path::normalize(&self.upload_path)
            .map_err(|_| ApiError::ConfigError(format!("Invalid upload_path: {}", self.upload_path)))?;
        if normalized.is_empty() {
            return Err(ApiError::ConfigError(
                "upload_path cannot be empty".to_string(),
            ));
        }
        if self.size_limit == 0 {
            return Err(ApiError::ConfigError(
                "size_limit must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

fn list_or_csv<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ListOrCsv {
        List(Vec<String>),
        Csv(String),
    }

    let entries = match ListOrCsv::deserialize(deserializer)? {
        ListOrCsv::List(list) => list,
        ListOrCsv::Csv(csv) => csv.split(',').map(str::to_string).collect(),
    };
    Ok(entries
        .into_iter()
        .map(|e| e.trim().to_string())
        .filter(|e| !e.is_empty())
        .collect())
}

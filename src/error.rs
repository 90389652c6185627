//! Error types
//!
//! `StorageError` covers the record persistence layer, `ApiError` everything the
//! synchronization engine and the entity façades surface to callers.

use thiserror::Error;

/// Errors raised by record stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// The parent of a new record is neither the upload root nor recorded.
    #[error("Missing ancestor record for {0}")]
    MissingAncestor(String),

    #[error("Path is already recorded: {0}")]
    DuplicatePath(String),

    /// The stored record changed since it was read.
    #[error("Stale record {path}: expected version {expected}, found {found}")]
    VersionConflict {
        path: String,
        expected: u64,
        found: u64,
    },
}

impl From<bincode::Error> for StorageError {
    fn from(err: bincode::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}

/// Errors raised by the synchronization engine, entities and tooling.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("File \"{0}\" is not a directory")]
    NotADirectory(String),

    #[error("Folder \"{0}\" is not a file")]
    NotAFile(String),

    /// The file exceeds the hashing size limit.
    #[error("Resource {path} is too large to hash ({size} bytes)")]
    UnhashableResource { path: String, size: u64 },

    /// The path cannot carry a record (upload root itself, or outside of it).
    #[error("Invalid resource {0}")]
    InvalidResource(String),

    #[error("Invalid path {0}")]
    InvalidPath(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Directory walk failed: {0}")]
    Walk(#[from] walkdir::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}

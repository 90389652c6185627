//! Fingerprint computation for files and folders

use crate::error::ApiError;
use crate::tree::walker::Walker;
use crate::types::Fingerprint;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Files at or above this size are not hashed (2 GiB).
pub const DEFAULT_SIZE_LIMIT: u64 = 2_147_483_648;

/// Platform artifacts ignored when hashing a folder.
pub const HASH_SKIP_NAMES: &[&str] = &[".DS_Store"];

/// Entries ignored when measuring a folder.
pub const SIZE_SKIP_NAMES: &[&str] = &[".DS_Store", ".svn"];

/// Separator between the `(path, fingerprint)` items of a folder digest.
const FOLDER_SEPARATOR: &str = "-";

#[derive(Debug, Clone)]
pub struct HashEngine {
    size_limit: u64,
}

impl Default for HashEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HashEngine {
    pub fn new() -> Self {
        Self {
            size_limit: DEFAULT_SIZE_LIMIT,
        }
    }

    pub fn with_size_limit(size_limit: u64) -> Self {
        Self { size_limit }
    }

    pub fn size_limit(&self) -> u64 {
        self.size_limit
    }

    /// Digest the file, failing with `UnhashableResource` when it is too large.
    pub fn digest_file(&self, path: &Path) -> Result<Fingerprint, ApiError> {
        let size = std::fs::metadata(path)?.len();
        if size >= self.size_limit {
            return Err(ApiError::UnhashableResource {
                path: path.display().to_string(),
                size,
            });
        }
        let mut reader = BufReader::new(File::open(path)?);
        let mut hasher = blake3::Hasher::new();
        std::io::copy(&mut reader, &mut hasher)?;
        Ok(Fingerprint::from_hex(hasher.finalize().to_hex().to_string()))
    }

    /// File fingerprint; oversized files yield the empty sentinel.
    pub fn hash_file(&self, path: &Path) -> Result<Fingerprint, ApiError> {
        match self.digest_file(path) {
            Err(ApiError::UnhashableResource { path, size }) => {
                tracing::debug!(path = %path, size, "file exceeds hash size limit");
                Ok(Fingerprint::unhashable())
            }
            other => other,
        }
    }

    /// Aggregate fingerprint over every descendant file.
    ///
    /// One oversized descendant turns the whole folder into the sentinel.
    pub fn hash_folder(&self, path: &Path) -> Result<Fingerprint, ApiError> {
        let mut items = Vec::new();
        let walker = Walker::new(path).skip_names(HASH_SKIP_NAMES).files_only();
        for entry in walker.walk() {
            let entry = entry?;
            if entry.size >= self.size_limit {
                tracing::debug!(
                    folder = %path.display(),
                    file = %entry.relative_path,
                    "folder contains an unhashable file"
                );
                return Ok(Fingerprint::unhashable());
            }
            let digest = self.digest_file(&path.join(&entry.relative_path))?;
            items.push(entry.relative_path);
            items.push(digest.as_str().to_string());
        }
        Ok(Fingerprint::of_bytes(
            items.join(FOLDER_SEPARATOR).as_bytes(),
        ))
    }

    /// Recursive byte size of a folder.
    pub fn size_of(&self, path: &Path) -> Result<u64, ApiError> {
        let mut total = 0u64;
        for entry in Walker::new(path).skip_names(SIZE_SKIP_NAMES).walk() {
            total += entry?.size;
        }
        Ok(total)
    }

    pub fn size_of_file(&self, path: &Path) -> Result<u64, ApiError> {
        Ok(std::fs::metadata(path)?.len())
    }
}

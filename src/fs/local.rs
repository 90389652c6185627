//! `Filesystem` over the native filesystem below a root directory.

use super::Filesystem;
use crate::error::ApiError;
use crate::tree::walker::walk;
use std::fs;
use std::path::{Path, PathBuf};

pub struct LocalFilesystem {
    root: PathBuf,
}

impl LocalFilesystem {
    /// Root at `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ApiError> {
        let root = dunce::canonicalize(root.as_ref()).map_err(|e| {
            ApiError::ConfigError(format!(
                "Failed to resolve filesystem root {}: {}",
                root.as_ref().display(),
                e
            ))
        })?;
        if !root.is_dir() {
            return Err(ApiError::NotADirectory(root.display().to_string()));
        }
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Filesystem for LocalFilesystem {
    fn resolve(&self, path: &str) -> PathBuf {
        if path.is_empty() {
            return self.root.clone();
        }
        path.split('/').fold(self.root.clone(), |acc, seg| acc.join(seg))
    }

    fn scan(&self, path: &str) -> Result<Vec<String>, ApiError> {
        let mut names = Vec::new();
        for entry in fs::read_dir(self.resolve(path))? {
            names.push(entry?.file_name().to_string_lossy().into_owned());
        }
        names.sort();
        Ok(names)
    }

    fn mkdir(&self, path: &str) -> Result<(), ApiError> {
        let target = self.resolve(path);
        if target.is_dir() {
            return Ok(());
        }
        fs::create_dir(&target)?;
        Ok(())
    }

    fn rename(&self, from: &str, to: &str) -> Result<(), ApiError> {
        fs::rename(self.resolve(from), self.resolve(to))?;
        Ok(())
    }

    fn rcopy(&self, from: &str, to: &str) -> Result<(), ApiError> {
        let source = self.resolve(from);
        let target = self.resolve(to);
        if source.is_file() {
            fs::copy(&source, &target)?;
            return Ok(());
        }
        fs::create_dir_all(&target)?;
        for entry in walk(&source) {
            let entry = entry?;
            let dest = entry
                .relative_path
                .split('/')
                .fold(target.clone(), |acc, seg| acc.join(seg));
            if entry.is_file {
                fs::copy(source.join(&entry.relative_path), &dest)?;
            } else {
                fs::create_dir_all(&dest)?;
            }
        }
        Ok(())
    }

    fn rrdir(&self, path: &str, keep_root: bool) -> Result<(), ApiError> {
        let target = self.resolve(path);
        if !target.is_dir() {
            return Ok(());
        }
        if !keep_root {
            fs::remove_dir_all(&target)?;
            return Ok(());
        }
        for entry in fs::read_dir(&target)? {
            let entry = entry?;
            if entry.file_type()?.is_dir() {
                fs::remove_dir_all(entry.path())?;
            } else {
                fs::remove_file(entry.path())?;
            }
        }
        Ok(())
    }

    fn remove_file(&self, path: &str) -> Result<(), ApiError> {
        fs::remove_file(self.resolve(path))?;
        Ok(())
    }

    #[cfg(unix)]
    fn chmod(&self, path: &str, mode: u32) -> Result<(), ApiError> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(self.resolve(path), fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    #[cfg(not(unix))]
    fn chmod(&self, path: &str, mode: u32) -> Result<(), ApiError> {
        let target = self.resolve(path);
        let mut permissions = fs::metadata(&target)?.permissions();
        permissions.set_readonly(mode & 0o200 == 0);
        fs::set_permissions(target, permissions)?;
        Ok(())
    }

    fn put_content(&self, path: &str, bytes: &[u8]) -> Result<(), ApiError> {
        fs::write(self.resolve(path), bytes)?;
        Ok(())
    }
}

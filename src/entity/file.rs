//! File entity

use super::folder::Folder;
use crate::dbafs::Dbafs;
use crate::error::ApiError;
use crate::path;
use crate::types::Fingerprint;

/// A regular file below the filesystem root. The file need not exist yet.
pub struct File<'a> {
    dbafs: &'a Dbafs,
    path: String,
    sync_enabled: bool,
}

impl<'a> File<'a> {
    pub fn open(dbafs: &'a Dbafs, path: &str) -> Result<Self, ApiError> {
        let path = path::normalize(path)?;
        let engine = dbafs.engine();
        if path.is_empty() || engine.fs().is_dir(&path) {
            return Err(ApiError::NotAFile(path));
        }
        let sync_enabled = engine.is_tracked(&path);
        Ok(Self {
            dbafs,
            path,
            sync_enabled,
        })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn name(&self) -> &str {
        path::basename(&self.path)
    }

    pub fn extension(&self) -> String {
        path::extension(&self.path)
    }

    pub fn exists(&self) -> bool {
        self.dbafs.engine().fs().is_file(&self.path)
    }

    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    pub fn hash(&self) -> Result<Fingerprint, ApiError> {
        self.require_existing()?;
        let engine = self.dbafs.engine();
        engine.hasher().hash_file(&engine.fs().resolve(&self.path))
    }

    pub fn size(&self) -> Result<u64, ApiError> {
        self.require_existing()?;
        let engine = self.dbafs.engine();
        engine.hasher().size_of_file(&engine.fs().resolve(&self.path))
    }

    /// Replace the content, creating the parent folder when needed.
    pub fn write(&self, bytes: &[u8]) -> Result<(), ApiError> {
        Folder::open(self.dbafs, path::dirname(&self.path))?;
        self.dbafs.engine().fs().put_content(&self.path, bytes)?;
        if self.sync_enabled {
            self.dbafs.engine().sync_file(&self.path)?;
        }
        Ok(())
    }

    pub fn rename_to(&mut self, new_path: &str) -> Result<(), ApiError> {
        let new_path = path::normalize(new_path)?;
        self.dbafs.engine().rename(&self.path, &new_path)?;
        self.sync_enabled = self.dbafs.engine().is_tracked(&new_path);
        self.path = new_path;
        Ok(())
    }

    pub fn copy_to(&self, new_path: &str) -> Result<File<'a>, ApiError> {
        self.dbafs.engine().copy_to(&self.path, new_path)?;
        File::open(self.dbafs, new_path)
    }

    pub fn delete(self) -> Result<(), ApiError> {
        if self.sync_enabled {
            self.dbafs.engine().delete(&self.path)
        } else {
            self.dbafs.engine().fs().remove_file(&self.path)
        }
    }

    pub fn chmod(&self, mode: u32) -> Result<(), ApiError> {
        self.dbafs.engine().fs().chmod(&self.path, mode)
    }

    fn require_existing(&self) -> Result<(), ApiError> {
        if self.exists() {
            Ok(())
        } else {
            Err(ApiError::NotFound(self.path.clone()))
        }
    }
}

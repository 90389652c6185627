//! Folder entity

use super::file::File;
use crate::dbafs::Dbafs;
use crate::error::ApiError;
use crate::path;
use crate::types::Fingerprint;

/// Name of the access marker written by [`Folder::protect`].
pub const ACCESS_MARKER: &str = ".htaccess";

/// Deny-all rules for both Apache 2.2 and 2.4.
pub const ACCESS_MARKER_CONTENT: &str = "<IfModule !mod_authz_core.c>\n  Order deny,allow\n  Deny from all\n</IfModule>\n<IfModule mod_authz_core.c>\n  Require all denied\n</IfModule>";

/// A directory below the filesystem root, created on open.
pub struct Folder<'a> {
    dbafs: &'a Dbafs,
    path: String,
    sync_enabled: bool,
}

impl<'a> Folder<'a> {
    /// Open `path`, creating every missing directory level.
    ///
    /// `"."` and `""` address the filesystem root. A regular file at `path`
    /// fails with `NotADirectory`.
    pub fn open(dbafs: &'a Dbafs, path: &str) -> Result<Self, ApiError> {
        let path = path::normalize(path)?;
        let engine = dbafs.engine();
        if engine.fs().is_file(&path) {
            return Err(ApiError::NotADirectory(path));
        }
        let sync_enabled = engine.policy().should_sync(&path);
        engine.create_folder(&path)?;
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

    pub fn sync_enabled(&self) -> bool {
        self.sync_enabled
    }

    pub fn hash(&self) -> Result<Fingerprint, ApiError> {
        let engine = self.dbafs.engine();
        engine.hasher().hash_folder(&engine.fs().resolve(&self.path))
    }

    pub fn size(&self) -> Result<u64, ApiError> {
        let engine = self.dbafs.engine();
        engine.hasher().size_of(&engine.fs().resolve(&self.path))
    }

    pub fn is_empty(&self) -> Result<bool, ApiError> {
        Ok(self.dbafs.engine().fs().scan(&self.path)?.is_empty())
    }

    pub fn is_protected(&self) -> bool {
        self.dbafs.engine().fs().exists(&self.marker_path())
    }

    /// Remove the contents, keeping the folder itself.
    pub fn purge(&self) -> Result<(), ApiError> {
        if self.sync_enabled {
            self.dbafs.engine().purge(&self.path)
        } else {
            self.dbafs.engine().fs().rrdir(&self.path, true)
        }
    }

    pub fn delete(self) -> Result<(), ApiError> {
        if self.sync_enabled {
            self.dbafs.engine().delete(&self.path)
        } else {
            self.dbafs.engine().fs().rrdir(&self.path, false)
        }
    }

    /// Move the folder; `self` follows it to the new location.
    pub fn rename_to(&mut self, new_path: &str) -> Result<(), ApiError> {
        let new_path = path::normalize(new_path)?;
        self.dbafs.engine().rename(&self.path, &new_path)?;
        self.sync_enabled = self.dbafs.engine().policy().should_sync(&new_path);
        self.path = new_path;
        Ok(())
    }

    pub fn copy_to(&self, new_path: &str) -> Result<Folder<'a>, ApiError> {
        self.dbafs.engine().copy_to(&self.path, new_path)?;
        Folder::open(self.dbafs, new_path)
    }

    pub fn chmod(&self, mode: u32) -> Result<(), ApiError> {
        self.dbafs.engine().fs().chmod(&self.path, mode)
    }

    /// Deny web access by writing the access marker.
    pub fn protect(&self) -> Result<(), ApiError> {
        if !self.is_protected() {
            File::open(self.dbafs, &self.marker_path())?.write(ACCESS_MARKER_CONTENT.as_bytes())?;
        }
        Ok(())
    }

    pub fn unprotect(&self) -> Result<(), ApiError> {
        if self.is_protected() {
            File::open(self.dbafs, &self.marker_path())?.delete()?;
        }
        Ok(())
    }

    fn marker_path(&self) -> String {
        path::join(&self.path, ACCESS_MARKER)
    }
}

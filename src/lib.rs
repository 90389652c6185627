//! dbafs: Database-Backed Abstract File System
//!
//! Keeps a persistent record per file and folder below an upload root in step
//! with the filesystem: every mutation made through [`Dbafs`] updates the
//! record store, parent links and content fingerprints, and a reconcile scan
//! repairs whatever drifted out of sync.

pub mod config;
pub mod dbafs;
pub mod entity;
pub mod error;
pub mod fs;
pub mod logging;
pub mod path;
pub mod policy;
pub mod store;
pub mod sync;
pub mod tooling;
pub mod tree;
pub mod types;

pub use dbafs::Dbafs;
pub use entity::{File, Folder};
pub use error::{ApiError, StorageError};
pub use sync::{SyncEngine, SyncReport};

//! Workspace-scoped settings.

pub mod storage_paths;

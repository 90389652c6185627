//! Folder and file handles bound to a [`Dbafs`](crate::dbafs::Dbafs).

pub mod file;
pub mod folder;

pub use file::File;
pub use folder::{Folder, ACCESS_MARKER, ACCESS_MARKER_CONTENT};

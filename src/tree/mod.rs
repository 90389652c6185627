//! Filesystem traversal and fingerprinting

pub mod hasher;
pub mod walker;

pub use hasher::HashEngine;
pub use walker::{walk, WalkEntry, Walker};

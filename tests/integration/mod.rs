//! Integration tests for the dbafs record/filesystem synchronization

mod cli_contracts;
mod hashing;
mod persistence;
mod purge_delete;
mod reconcile;
mod rename_copy;
mod support;

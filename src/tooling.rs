//! Tooling & Integration Layer
//!
//! Command-line entry points over [`Dbafs`](crate::dbafs::Dbafs).

pub mod cli;

pub use cli::{Cli, CliContext, Commands};

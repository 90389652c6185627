//! Merge policy: built-in defaults every layered load starts from.

use crate::tree::hasher::DEFAULT_SIZE_LIMIT;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder preloaded with defaults; later sources override them.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("files.upload_path", "files")?
        .set_default("files.sync_exclude", Vec::<String>::new())?
        .set_default("files.size_limit", DEFAULT_SIZE_LIMIT)?
        .set_default("storage.store_path", ".dbafs/store")
}

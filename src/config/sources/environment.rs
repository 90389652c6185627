//! Environment variable source: DBAFS prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Add environment variable overlay to builder.
/// `DBAFS__FILES__UPLOAD_PATH=media` sets `files.upload_path`;
/// `DBAFS__FILES__SYNC_EXCLUDE` is read as a comma separated list.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix("DBAFS")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("files.sync_exclude"),
    );
    Ok(builder)
}

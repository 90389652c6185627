//! Global config file: `$XDG_CONFIG_HOME/dbafs/config.toml`, optional.

use crate::config::xdg;
use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match xdg::config_home() {
        Ok(home) => {
            let path = home.join("dbafs").join("config.toml");
            Ok(builder.add_source(File::from(path).required(false)))
        }
        Err(e) => {
            tracing::debug!("Skipping global config file: {}", e);
            Ok(builder)
        }
    }
}

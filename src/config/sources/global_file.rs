//! Global config file source: `$XDG_CONFIG_HOME/navsync/config.toml`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Location of the per-user config file, if a home directory can be determined
pub fn path() -> Option<PathBuf> {
    if let Ok(config_home) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(config_home).join("navsync").join("config.toml"));
    }
    ProjectDirs::from("", "navsync", "navsync").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Add the global file, if present, to the builder.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    match path() {
        Some(path) => Ok(builder.add_source(File::from(path).required(false))),
        None => Ok(builder),
    }
}

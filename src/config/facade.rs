//! ConfigLoader: layers defaults, an optional file and the environment.

use super::sources::global_file;
use super::NavConfig;
use crate::error::NavError;
use config::{Config, Environment, File};
use std::path::Path;

/// Prefix of overriding environment variables; nested keys use `__`,
/// e.g. `NAVSYNC__DOCUMENT_STORE__BASE_URL`.
pub const ENV_PREFIX: &str = "NAVSYNC";

/// Configuration loader facade.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration.
    /// Precedence: built-in defaults (lowest) -> global file -> explicit file -> environment (highest).
    pub fn load(path: Option<&Path>) -> Result<NavConfig, NavError> {
        let defaults = Config::try_from(&NavConfig::default())?;
        let mut builder = global_file::add_to_builder(Config::builder().add_source(defaults))?;
        if let Some(path) = path {
            if !path.exists() {
                return Err(NavError::ConfigError(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            builder = builder.add_source(File::from(path));
        }
        let builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let config: NavConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }
}

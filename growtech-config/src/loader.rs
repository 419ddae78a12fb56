//! Configuration loader.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ConfigError, ConfigResult};
use crate::schema::GrowTechConfig;

/// Loads and validates configuration.
///
/// With no path, the built-in defaults are used.
///
/// # Errors
///
/// Returns [`ConfigError`] if the file cannot be read, parsed, or validated.
pub fn load(path: Option<&Path>) -> ConfigResult<GrowTechConfig> {
    let Some(path) = path else {
        debug!("no config file given, using defaults");
        let config = GrowTechConfig::default();
        config.validate()?;
        return Ok(config);
    };

    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = from_toml_str(&raw)?;
    info!(path = %path.display(), "loaded configuration");
    Ok(config)
}

/// Parses and validates configuration from TOML text.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] or [`ConfigError::Invalid`].
pub fn from_toml_str(raw: &str) -> ConfigResult<GrowTechConfig> {
    let config: GrowTechConfig = toml::from_str(raw)?;
    config.validate()?;
    Ok(config)
}

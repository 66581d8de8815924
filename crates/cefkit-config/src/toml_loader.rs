//! Locating, reading and seeding the TOML settings file.

mod template;

#[cfg(test)]
mod tests;

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use cefkit_common::ConfigError;
use tracing::{debug, info, warn};

use crate::schema::CefkitConfig;
use crate::validation;

/// Environment variable that points at a settings file outside the
/// platform config directory.
pub const CONFIG_PATH_ENV: &str = "CEFKIT_CONFIG";

/// Where a settings path came from. Only the platform location is seeded
/// with the documented template when missing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLocation {
    Env(PathBuf),
    Platform(PathBuf),
}

impl ConfigLocation {
    pub fn path(&self) -> &Path {
        match self {
            ConfigLocation::Env(path) | ConfigLocation::Platform(path) => path,
        }
    }
}

/// `<config dir>/cefkit/config.toml`.
pub fn default_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::ParseError("could not determine config directory".into()))?;
    Ok(config_dir.join("cefkit").join("config.toml"))
}

/// Pick the settings file: a non-empty `CEFKIT_CONFIG` wins over the
/// platform default.
pub fn resolve_location(env_value: Option<OsString>) -> Result<ConfigLocation, ConfigError> {
    match env_value.filter(|value| !value.is_empty()) {
        Some(value) => Ok(ConfigLocation::Env(PathBuf::from(value))),
        None => default_config_path().map(ConfigLocation::Platform),
    }
}

/// Write the documented template to `path`, creating parent directories.
pub fn create_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            ConfigError::ParseError(format!("cannot create {}: {e}", parent.display()))
        })?;
    }
    std::fs::write(path, template::default_config_toml())
        .map_err(|e| ConfigError::ParseError(format!("cannot write {}: {e}", path.display())))?;
    info!(path = %path.display(), "wrote default config");
    Ok(())
}

/// Read and parse one settings file.
///
/// Fields absent from the file take their defaults. Values that parse but
/// fail validation are kept and logged; [`crate::load_config`] is the
/// strict entry point.
pub fn load_from_path(path: &Path) -> Result<CefkitConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
        _ => ConfigError::ParseError(format!("cannot read {}: {e}", path.display())),
    })?;

    let config: CefkitConfig = toml::from_str(&content)
        .map_err(|e| ConfigError::ParseError(format!("{}: {e}", path.display())))?;

    if let Err(e) = validation::validate(&config) {
        warn!(path = %path.display(), "config has invalid values: {e}");
    }

    debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Load from `location`. A missing platform file is seeded and defaults
/// are returned; a missing file named by the environment is an error.
pub fn load_location(location: &ConfigLocation) -> Result<CefkitConfig, ConfigError> {
    match (load_from_path(location.path()), location) {
        (Err(ConfigError::FileNotFound(_)), ConfigLocation::Platform(path)) => {
            create_default_config(path)?;
            Ok(CefkitConfig::default())
        }
        (result, _) => result,
    }
}

/// Load from `CEFKIT_CONFIG` or the platform default path.
pub fn load_default() -> Result<CefkitConfig, ConfigError> {
    let location = resolve_location(std::env::var_os(CONFIG_PATH_ENV))?;
    load_location(&location)
}

//! cefkit runtime configuration.
//!
//! TOML settings for process mode, protocol opt-ins and logging. Every
//! section uses serde defaults so partial files work out of the box.
//!
//! ```rust,no_run
//! use cefkit_config::{load_config, config_to_json};
//!
//! let config = load_config().expect("failed to load config");
//! println!("{}", config_to_json(&config));
//! ```

pub mod schema;
pub mod toml_loader;
pub mod validation;

pub use schema::{
    CefkitConfig, LogLevel, LoggingConfig, ProcessConfig, ProtocolConfig, CONFIG_SCHEMA_VERSION,
};
pub use toml_loader::{
    default_config_path, load_default, load_from_path, ConfigLocation, CONFIG_PATH_ENV,
};

use cefkit_common::ConfigError;

/// Load config from the platform default path, creating it if missing,
/// and validate the result.
pub fn load_config() -> Result<CefkitConfig, ConfigError> {
    let config = toml_loader::load_default()?;
    validation::validate(&config)?;
    Ok(config)
}

/// Serialize a config to a pretty-printed JSON string.
pub fn config_to_json(config: &CefkitConfig) -> String {
    serde_json::to_string_pretty(config)
        .unwrap_or_else(|e| format!("{{\"error\": \"failed to serialize config: {e}\"}}"))
}

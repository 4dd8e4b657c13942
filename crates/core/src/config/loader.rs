use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use std::path::Path;

use super::{types::Config, ConfigError};

/// Prefix of environment variables that override file settings.
pub const ENV_PREFIX: &str = "HWPDF_";

/// Load configuration from file with environment variable overrides.
///
/// Nested keys are separated by a double underscore so that field names
/// containing underscores survive, e.g. `HWPDF_BACKEND__TIMEOUT_SECS=30`.
/// `HWPDF_CONFIG` itself names the file and is not a setting.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    if !path.is_file() {
        return Err(ConfigError::FileNotFound(path.to_path_buf()));
    }

    Figment::new()
        .merge(Toml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__").ignore(&["config"]))
        .extract()
        .map_err(|e| ConfigError::ParseError(e.to_string()))
}

/// Load configuration from TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<Config, ConfigError> {
    toml::from_str(toml_str).map_err(|e| ConfigError::ParseError(e.to_string()))
}

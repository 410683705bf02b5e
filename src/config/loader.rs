use super::{ConfigError, StoreConfig};
use crate::utils::docstore_home;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Canonical config location: `~/.docstore/config.toml`.
#[must_use]
pub fn config_path() -> PathBuf {
    docstore_home().join("config.toml")
}

/// Load the configuration from the default location.
pub fn load_config() -> Result<StoreConfig, ConfigError> {
    load_config_from(&config_path())
}

/// Load the configuration from `path`.
///
/// Returns `StoreConfig::default()` if the file does not exist.
pub fn load_config_from(path: &Path) -> Result<StoreConfig, ConfigError> {
    if !path.exists() {
        debug!("Store config not found at {}; using defaults", path.display());
        return Ok(StoreConfig::default());
    }
    let content = std::fs::read_to_string(path)?;
    let config: StoreConfig = toml::from_str(&content)?;
    debug!("Loaded store config from {}", path.display());
    Ok(config)
}

//! Well-known paths under `~/.ward`

use std::path::PathBuf;

use crate::config::ConfigError;

const WARD_DIR: &str = ".ward";

/// Absolute path of `~/.ward`.
pub fn ward_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir()
        .map(|home| home.join(WARD_DIR))
        .ok_or(ConfigError::NoHomeDir)
}

/// Path of the main configuration file, `~/.ward/config.yaml`.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(ward_dir()?.join("config.yaml"))
}

/// Path of `~/.ward/rules`, created on demand.
pub fn rules_dir() -> Result<PathBuf, ConfigError> {
    subdir("rules")
}

/// Path of `~/.ward/store`, created on demand.
pub fn store_dir() -> Result<PathBuf, ConfigError> {
    subdir("store")
}

fn subdir(name: &str) -> Result<PathBuf, ConfigError> {
    let path = ward_dir()?.join(name);
    std::fs::create_dir_all(&path)?;
    Ok(path)
}

/// Create `~/.ward` and its standard subdirectories.
pub fn ensure_tree() -> Result<(), ConfigError> {
    let root = ward_dir()?;
    for dir in [root.clone(), root.join("rules"), root.join("store")] {
        std::fs::create_dir_all(dir)?;
    }
    Ok(())
}

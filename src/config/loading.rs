//! Configuration loading.
//!
//! Resolves the configuration path, creates a default file on first run,
//! merges `geo.toml` overrides, validates, and applies defaults.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use super::validation::validate_config;
use super::{Config, GeoConfig, LocationProvider, default_user_agent};
use crate::common::constants::*;
use crate::common::utils::private_path;

/// Configuration directory chosen with `--config`, set once at startup.
static CONFIG_DIR: OnceLock<Option<PathBuf>> = OnceLock::new();

/// Set the configuration directory for this process.
///
/// Fails if the directory was already set.
pub fn set_config_dir(dir: Option<String>) -> Result<()> {
    CONFIG_DIR
        .set(dir.map(PathBuf::from))
        .map_err(|_| anyhow::anyhow!("Configuration directory already set"))
}

pub fn get_custom_config_dir() -> Option<PathBuf> {
    CONFIG_DIR.get().and_then(|d| d.clone())
}

/// Directory holding `hospital-locator.toml` and `geo.toml`.
pub fn get_config_base_dir() -> Result<PathBuf> {
    let config_path = get_config_path()?;
    config_path
        .parent()
        .map(|p| p.to_path_buf())
        .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
}

pub fn get_config_path() -> Result<PathBuf> {
    if let Some(custom_dir) = get_custom_config_dir() {
        return Ok(custom_dir.join(CONFIG_FILE_NAME));
    }

    let config_dir = dirs::config_dir().context("Could not determine config directory")?;
    Ok(config_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load the configuration, creating a default file if none exists.
pub fn load() -> Result<Config> {
    load_or_create(&get_config_path()?)
}

/// Load `path`, creating a default file there first if it is missing.
pub fn load_or_create(path: &Path) -> Result<Config> {
    if !path.exists() {
        super::builder::create_default_config(path)
            .context("Failed to create default config during load")?;
    }

    load_from_path(path)
        .with_context(|| format!("Failed to load configuration from {}", private_path(path)))
}

/// Load configuration from an existing file.
pub fn load_from_path(path: &Path) -> Result<Config> {
    if !path.exists() {
        anyhow::bail!(
            "Configuration file not found at {}",
            private_path(path)
        );
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config from {}", private_path(path)))?;

    let mut config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config from {}", private_path(path)))?;

    // geo.toml values are validated together with the main file
    load_geo_override_from_path(&mut config, path);

    validate_config(&config)?;
    apply_defaults(&mut config);

    Ok(config)
}

fn apply_defaults(config: &mut Config) {
    config.endpoint.get_or_insert_with(|| DEFAULT_ENDPOINT.to_string());
    config.user_agent.get_or_insert_with(default_user_agent);
    config.result_limit.get_or_insert(DEFAULT_RESULT_LIMIT);
    config.location_provider.get_or_insert(LocationProvider::Auto);
    config.high_accuracy.get_or_insert(DEFAULT_HIGH_ACCURACY);
    config
        .acquire_timeout_ms
        .get_or_insert(DEFAULT_ACQUIRE_TIMEOUT_MS);
    config.follow_device.get_or_insert(DEFAULT_FOLLOW_DEVICE);
}

/// Merge coordinates from `geo.toml` beside `config_path`.
///
/// A missing file is normal; an unreadable or malformed one is reported and
/// ignored.
pub(crate) fn load_geo_override_from_path(config: &mut Config, config_path: &Path) {
    let Some(geo_path) = config_path.parent().map(|p| p.join(GEO_FILE_NAME)) else {
        return;
    };

    if !geo_path.exists() {
        return;
    }

    match fs::read_to_string(&geo_path) {
        Ok(content) => match toml::from_str::<GeoConfig>(&content) {
            Ok(geo_config) => {
                if let Some(lat) = geo_config.latitude {
                    config.latitude = Some(lat);
                }
                if let Some(lon) = geo_config.longitude {
                    config.longitude = Some(lon);
                }
            }
            Err(e) => {
                log_pipe!();
                log_warning!("Failed to parse geo.toml: {e}. Using coordinates from main config.");
            }
        },
        Err(e) => {
            log_pipe!();
            log_warning!("Failed to read geo.toml: {e}. Using coordinates from main config.");
        }
    }
}

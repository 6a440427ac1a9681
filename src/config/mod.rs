//! Configuration system for hospital-locator.
//!
//! Settings live in `hospital-locator.toml` under the user's configuration
//! directory (`$XDG_CONFIG_HOME/hospital-locator/` on Linux) or in the
//! directory given with `--config <dir>`. A commented default file is created
//! on first run.
//!
//! ```toml
//! #[Search]
//! endpoint = "https://nominatim.openstreetmap.org/search" # Nominatim-compatible endpoint
//! user_agent = "hospital-locator/0.3.0"                   # Sent with every request
//! result_limit = 15                                       # Facilities per search (1-15)
//!
//! #[Location]
//! location_provider = "auto"  # "auto", "geoclue" or "fixed"
//! high_accuracy = true        # Ask for an exact fix instead of street level
//! acquire_timeout_ms = 15000  # Single fix timeout (1000-120000)
//! follow_device = false       # Keep watching the device position while signed in
//! latitude = 40.7128          # Fixed coordinates (required for "fixed")
//! longitude = -74.0060
//!
//! #[Account]
//! account = "ada"             # Sign in as this user instead of $USER
//! ```
//!
//! An optional `geo.toml` next to the main file overrides `latitude` and
//! `longitude`, so coordinates can stay out of a shared configuration.
//!
//! All fields are optional. Loading validates the merged values first and then
//! fills in defaults, so every accessor below is infallible.

pub mod builder;
pub mod loading;
pub mod validation;

use anyhow::Result;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use crate::common::constants::*;
use crate::geo::{Coord, PositionOptions};

pub use builder::create_default_config;
pub use loading::{
    get_config_path, get_custom_config_dir, load, load_from_path, load_or_create, set_config_dir,
};

/// Private coordinates stored in `geo.toml`.
#[derive(Debug, Deserialize, Clone)]
pub(crate) struct GeoConfig {
    pub(crate) latitude: Option<f64>,
    pub(crate) longitude: Option<f64>,
}

/// Which device position source to use.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LocationProvider {
    /// Configured coordinates when present, GeoClue2 otherwise.
    Auto,
    /// Always ask the GeoClue2 D-Bus service.
    Geoclue,
    /// Always use the configured coordinates.
    Fixed,
}

impl LocationProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationProvider::Auto => "auto",
            LocationProvider::Geoclue => "geoclue",
            LocationProvider::Fixed => "fixed",
        }
    }
}

/// Settings loaded from `hospital-locator.toml`.
#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    /// Nominatim-compatible `/search` URL.
    pub endpoint: Option<String>,
    /// `User-Agent` header sent with every search request.
    pub user_agent: Option<String>,
    /// Facilities requested per bounded search (1-15).
    pub result_limit: Option<usize>,
    /// HTTP timeout in seconds. Absent means no client-side timeout.
    pub request_timeout: Option<u64>,

    pub location_provider: Option<LocationProvider>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub high_accuracy: Option<bool>,
    pub acquire_timeout_ms: Option<u64>,
    pub follow_device: Option<bool>,

    /// Account name used by the local identity provider.
    pub account: Option<String>,
}

impl Config {
    /// Path of the optional `geo.toml` beside the main configuration file.
    pub fn get_geo_path() -> Result<PathBuf> {
        Ok(loading::get_config_base_dir()?.join(GEO_FILE_NAME))
    }

    pub fn load() -> Result<Self> {
        load()
    }

    pub fn endpoint(&self) -> String {
        self.endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string())
    }

    pub fn user_agent(&self) -> String {
        self.user_agent.clone().unwrap_or_else(default_user_agent)
    }

    pub fn result_limit(&self) -> usize {
        self.result_limit.unwrap_or(DEFAULT_RESULT_LIMIT)
    }

    pub fn follow_device(&self) -> bool {
        self.follow_device.unwrap_or(DEFAULT_FOLLOW_DEVICE)
    }

    /// Coordinates configured for the fixed provider, if both are set.
    pub fn configured_coord(&self) -> Option<Coord> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lng)) => Coord::try_new(lat, lng).ok(),
            _ => None,
        }
    }

    /// Options for single-shot position requests.
    pub fn acquire_options(&self) -> PositionOptions {
        PositionOptions::for_acquire()
            .with_high_accuracy(self.high_accuracy.unwrap_or(DEFAULT_HIGH_ACCURACY))
            .with_timeout(Duration::from_millis(
                self.acquire_timeout_ms.unwrap_or(DEFAULT_ACQUIRE_TIMEOUT_MS),
            ))
    }

    /// Options for the position watch.
    pub fn watch_options(&self) -> PositionOptions {
        PositionOptions::for_watch()
            .with_high_accuracy(self.high_accuracy.unwrap_or(DEFAULT_HIGH_ACCURACY))
    }

    pub fn log_config(&self) {
        log_block_start!("Loaded configuration");

        if let Ok(geo_path) = Self::get_geo_path()
            && geo_path.exists()
        {
            log_indented!("Loaded coordinates from geo.toml");
        }

        log_indented!("Endpoint: {}", self.endpoint());
        log_indented!("Results per search: {}", self.result_limit());
        match self.request_timeout {
            Some(secs) => log_indented!("Request timeout: {} seconds", secs),
            None => log_indented!("Request timeout: none"),
        }

        let provider = self.location_provider.unwrap_or(LocationProvider::Auto);
        log_indented!("Location provider: {}", provider.as_str());
        if let Some(coord) = self.configured_coord() {
            log_indented!("Location: {}", coord);
        }

        let options = self.acquire_options();
        log_indented!(
            "Accuracy: {}",
            if options.high_accuracy {
                "high"
            } else {
                "street level"
            }
        );
        log_indented!("Acquire timeout: {}ms", options.timeout.as_millis());
        if self.follow_device() {
            log_indented!("Following device position");
        }
    }
}

pub fn default_user_agent() -> String {
    format!("{}/{}", CONFIG_DIR_NAME, env!("CARGO_PKG_VERSION"))
}

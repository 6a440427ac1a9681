//! Application-wide constants.
//!
//! Default configuration values, validation limits, and the fixed parameters of
//! the discovery pipeline live here so the rest of the code base never carries
//! magic numbers.

// # Search Endpoint

/// Default Nominatim-compatible search endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://nominatim.openstreetmap.org/search";

/// Query text used for bounded searches when the user has not typed anything.
pub const DEFAULT_QUERY: &str = "hospital";

/// Half-width of the bounded search viewbox in degrees.
pub const VIEWBOX_DELTA_DEGREES: f64 = 0.1;

/// Maximum number of facilities requested from a bounded search.
pub const MAXIMUM_RESULT_LIMIT: usize = 15;
pub const MINIMUM_RESULT_LIMIT: usize = 1;
pub const DEFAULT_RESULT_LIMIT: usize = MAXIMUM_RESULT_LIMIT;

/// Forward geocoding only ever needs the best candidate.
pub const FORWARD_GEOCODE_LIMIT: usize = 1;

/// Request timeout limits in seconds (no timeout unless configured).
pub const MINIMUM_REQUEST_TIMEOUT: u64 = 1;
pub const MAXIMUM_REQUEST_TIMEOUT: u64 = 120;

/// Name used when the first segment of a display name is empty.
pub const FALLBACK_FACILITY_NAME: &str = "Hospital";

// # Geolocation

/// Mean Earth radius used by the Haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 15_000;
pub const MINIMUM_ACQUIRE_TIMEOUT_MS: u64 = 1_000;
pub const MAXIMUM_ACQUIRE_TIMEOUT_MS: u64 = 120_000;

/// Single-shot fixes are always fresh.
pub const DEFAULT_ACQUIRE_MAX_AGE_MS: u64 = 0;

pub const DEFAULT_WATCH_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_WATCH_MAX_AGE_MS: u64 = 30_000;

pub const DEFAULT_HIGH_ACCURACY: bool = true;
pub const DEFAULT_FOLLOW_DEVICE: bool = false;

/// GeoClue2 accuracy levels (GClueAccuracyLevel).
pub const GEOCLUE_ACCURACY_STREET: u32 = 6;
pub const GEOCLUE_ACCURACY_EXACT: u32 = 8;

/// Desktop id reported to GeoClue2 agents.
pub const GEOCLUE_DESKTOP_ID: &str = "hospital-locator";

/// How often a started GeoClue2 client is asked for a new location.
pub const GEOCLUE_POLL_INTERVAL_MS: u64 = 250;

// # Presentation

/// Address text in the list view is cut after this many characters.
pub const LIST_ADDRESS_WIDTH: usize = 50;

/// Character-cell size of the map view.
pub const MAP_WIDTH: usize = 41;
pub const MAP_HEIGHT: usize = 15;

// # Status Messages

pub const MESSAGE_EMPTY_AREA: &str = "No hospitals found in this area";
pub const MESSAGE_INVALID_LOCATION: &str = "Invalid location entered";
pub const MESSAGE_MANUAL_HINT: &str = "Enter a location manually and press Enter";

// # Configuration Files

pub const CONFIG_DIR_NAME: &str = "hospital-locator";
pub const CONFIG_FILE_NAME: &str = "hospital-locator.toml";
pub const GEO_FILE_NAME: &str = "geo.toml";

// # Exit Codes

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILURE: i32 = 1;

#[cfg(test)]
pub mod test_constants {
    // Scenario coordinates
    pub const TEST_DEVICE_LAT: f64 = 40.0;
    pub const TEST_DEVICE_LNG: f64 = -74.0;
    pub const TEST_BOSTON_LAT: f64 = 42.36;
    pub const TEST_BOSTON_LNG: f64 = -71.06;
}

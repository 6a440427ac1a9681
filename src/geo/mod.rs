//! Geographic primitives and device position sources.
//!
//! ## Module Structure
//!
//! - [`coord`]: `Coord` and `Anchor` value types with range validation
//! - [`distance`]: Haversine great-circle distance and display rounding
//! - [`provider`]: the `GeoProvider` trait, request options, and error classification
//! - [`fixed`]: position source backed by configured coordinates
//! - [`geoclue`]: position source backed by the GeoClue2 D-Bus service
//!
//! Which source is used is decided by [`create_provider`] from the
//! `location_provider` setting.

pub mod coord;
pub mod distance;
pub mod fixed;
pub mod geoclue;
pub mod provider;

pub use coord::{Anchor, AnchorSource, Coord, CoordError};
pub use distance::{distance_km, format_distance, round_for_display};
pub use fixed::FixedProvider;
pub use geoclue::GeoClueProvider;
pub use provider::{GeoError, GeoProvider, PositionOptions, WatchHandle, WatchSink};

use std::sync::Arc;

use crate::config::{Config, LocationProvider};

#[cfg(test)]
mod tests;

/// Build the position source selected by the configuration.
///
/// `auto` prefers configured coordinates and falls back to GeoClue2.
pub fn create_provider(config: &Config, debug_enabled: bool) -> Arc<dyn GeoProvider> {
    let configured = config.configured_coord();
    let kind = config.location_provider.unwrap_or(LocationProvider::Auto);

    let provider: Arc<dyn GeoProvider> = match (kind, configured) {
        (LocationProvider::Fixed, coord) => Arc::new(FixedProvider::new(coord)),
        (LocationProvider::Auto, Some(coord)) => Arc::new(FixedProvider::new(Some(coord))),
        (LocationProvider::Auto, None) | (LocationProvider::Geoclue, _) => {
            Arc::new(GeoClueProvider::new(debug_enabled))
        }
    };

    if debug_enabled {
        log_pipe!();
        log_debug!("Using '{}' location provider", provider.name());
    }

    provider
}

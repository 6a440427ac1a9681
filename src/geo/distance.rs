//! Great-circle distance on a spherical Earth.

use super::Coord;
use crate::common::constants::EARTH_RADIUS_KM;

/// Haversine distance between two coordinates in kilometers.
///
/// The result keeps full precision so callers can sort on it; use
/// [`round_for_display`] when showing it. Inputs are put in a canonical order
/// first, which makes the function bit-for-bit symmetric.
pub fn distance_km(a: &Coord, b: &Coord) -> f64 {
    let (a, b) = if (a.lat, a.lng) <= (b.lat, b.lng) {
        (a, b)
    } else {
        (b, a)
    };

    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

/// Round a distance to one decimal for display.
pub fn round_for_display(km: f64) -> f64 {
    (km * 10.0).round() / 10.0
}

/// Format a distance the way the list and map views show it.
pub fn format_distance(km: f64) -> String {
    format!("{:.1} km away", round_for_display(km))
}

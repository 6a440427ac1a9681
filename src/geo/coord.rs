//! Coordinate and anchor value types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A geographic position in decimal degrees.
///
/// `accuracy_m` and `timestamp_ms` are only present for fixes that came from a
/// position source; coordinates parsed from geocoder replies carry neither.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy_m: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<i64>,
}

impl Coord {
    /// Create a coordinate without fix metadata.
    ///
    /// No validation happens here; use [`Coord::try_new`] at trust boundaries.
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            accuracy_m: None,
            timestamp_ms: None,
        }
    }

    /// Create a coordinate, rejecting non-finite or out-of-range values.
    pub fn try_new(lat: f64, lng: f64) -> Result<Self, CoordError> {
        let coord = Self::new(lat, lng);
        coord.validate()?;
        Ok(coord)
    }

    /// Attach accuracy (meters) and timestamp (milliseconds since the epoch).
    pub fn with_fix(mut self, accuracy_m: Option<f64>, timestamp_ms: Option<i64>) -> Self {
        self.accuracy_m = accuracy_m;
        self.timestamp_ms = timestamp_ms;
        self
    }

    pub fn validate(&self) -> Result<(), CoordError> {
        if !self.lat.is_finite() || !self.lng.is_finite() {
            return Err(CoordError::NotFinite);
        }
        if !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordError::LatitudeOutOfRange(self.lat));
        }
        if !(-180.0..=180.0).contains(&self.lng) {
            return Err(CoordError::LongitudeOutOfRange(self.lng));
        }
        if let Some(accuracy) = self.accuracy_m
            && !(accuracy.is_finite() && accuracy >= 0.0)
        {
            return Err(CoordError::InvalidAccuracy(accuracy));
        }
        Ok(())
    }

    /// Positional equality, ignoring fix metadata.
    pub fn same_position(&self, other: &Coord) -> bool {
        self.lat == other.lat && self.lng == other.lng
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ns = if self.lat >= 0.0 { 'N' } else { 'S' };
        let ew = if self.lng >= 0.0 { 'E' } else { 'W' };
        write!(
            f,
            "{:.4}°{} {:.4}°{}",
            self.lat.abs(),
            ns,
            self.lng.abs(),
            ew
        )
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordError {
    #[error("coordinates must be finite numbers")]
    NotFinite,
    #[error("latitude must be between -90 and 90 degrees (got {0})")]
    LatitudeOutOfRange(f64),
    #[error("longitude must be between -180 and 180 degrees (got {0})")]
    LongitudeOutOfRange(f64),
    #[error("accuracy must be a non-negative number of meters (got {0})")]
    InvalidAccuracy(f64),
}

/// Where an anchor came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnchorSource {
    /// Acquired from the device position source.
    Device,
    /// Forward geocoded from text the user typed.
    Manual,
}

/// The coordinate the current result set's distances are computed against.
///
/// Anchors are replaced wholesale, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Anchor {
    pub coord: Coord,
    pub source: AnchorSource,
}

impl Anchor {
    pub fn device(coord: Coord) -> Self {
        Self {
            coord,
            source: AnchorSource::Device,
        }
    }

    pub fn manual(coord: Coord) -> Self {
        Self {
            coord,
            source: AnchorSource::Manual,
        }
    }
}

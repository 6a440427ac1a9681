//! Place search over a Nominatim-compatible geocoding endpoint.
//!
//! Two query modes are supported:
//!
//! - **Bounded search** ([`PlaceSearch::search_near`]): facilities inside a
//!   ±0.1° viewbox around an anchor, each annotated with its distance from it
//! - **Forward geocode** ([`PlaceSearch::forward_geocode`]): free text such as
//!   "Boston" turned into coordinates
//!
//! Replies are mapped into [`Facility`] and [`Place`] records here, independent
//! of the transport, so the mapping rules can be tested without a network.
//! An empty reply is the [`SearchError::Empty`] failure, never an empty list.

pub mod nominatim;

pub use nominatim::NominatimClient;

use serde::{Deserialize, Serialize};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::common::constants::FALLBACK_FACILITY_NAME;
use crate::geo::{Coord, distance_km};

/// Place search failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    #[error("Could not reach the search service: {0}")]
    Network(String),
    #[error("Search service answered with HTTP {0}")]
    Http(u16),
    #[error("No matching places found")]
    Empty,
    #[error("Unreadable reply from the search service: {0}")]
    Parse(String),
}

/// Stable identity of a search result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FacilityId(pub u64);

/// One candidate as the endpoint returns it.
///
/// Coordinates arrive as strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Candidate {
    #[serde(default)]
    pub place_id: Option<u64>,
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

/// A medical facility found by a bounded search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Facility {
    pub id: FacilityId,
    pub name: String,
    pub address: String,
    pub coord: Coord,
    /// Distance from the anchor the search was issued for.
    pub distance_km: f64,
}

/// A forward geocoding result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    pub name: String,
    pub address: String,
    pub coord: Coord,
}

/// Remote place search.
#[cfg_attr(test, mockall::automock)]
pub trait PlaceSearch: Send + Sync {
    /// Facilities around `anchor`. An empty `text` searches for hospitals.
    fn search_near(
        &self,
        anchor: &Coord,
        text: &str,
        limit: usize,
    ) -> Result<Vec<Facility>, SearchError>;

    /// Unbounded lookup of free text.
    fn forward_geocode(&self, text: &str, limit: usize) -> Result<Vec<Place>, SearchError>;
}

/// First comma-delimited segment of a display name.
pub fn facility_name(display_name: &str) -> String {
    let first = display_name.split(',').next().unwrap_or("").trim();
    if first.is_empty() {
        FALLBACK_FACILITY_NAME.to_string()
    } else {
        first.to_string()
    }
}

fn parse_coord(candidate: &Candidate) -> Result<Coord, SearchError> {
    let lat: f64 = candidate.lat.trim().parse().map_err(|_| {
        SearchError::Parse(format!("invalid latitude '{}'", candidate.lat))
    })?;
    let lng: f64 = candidate.lon.trim().parse().map_err(|_| {
        SearchError::Parse(format!("invalid longitude '{}'", candidate.lon))
    })?;
    Coord::try_new(lat, lng).map_err(|e| SearchError::Parse(e.to_string()))
}

fn candidate_id(candidate: &Candidate, coord: &Coord) -> FacilityId {
    if let Some(place_id) = candidate.place_id {
        return FacilityId(place_id);
    }
    let mut hasher = DefaultHasher::new();
    candidate.display_name.hash(&mut hasher);
    coord.lat.to_bits().hash(&mut hasher);
    coord.lng.to_bits().hash(&mut hasher);
    FacilityId(hasher.finish())
}

/// Map a bounded search reply into facilities measured from `anchor`.
///
/// The reply is truncated to `limit` before mapping.
pub fn to_facilities(
    candidates: Vec<Candidate>,
    anchor: &Coord,
    limit: usize,
) -> Result<Vec<Facility>, SearchError> {
    if candidates.is_empty() {
        return Err(SearchError::Empty);
    }

    candidates
        .into_iter()
        .take(limit)
        .map(|candidate| {
            let coord = parse_coord(&candidate)?;
            Ok(Facility {
                id: candidate_id(&candidate, &coord),
                name: facility_name(&candidate.display_name),
                distance_km: distance_km(anchor, &coord),
                address: candidate.display_name,
                coord,
            })
        })
        .collect()
}

/// Map a forward geocoding reply into places.
pub fn to_places(candidates: Vec<Candidate>, limit: usize) -> Result<Vec<Place>, SearchError> {
    if candidates.is_empty() {
        return Err(SearchError::Empty);
    }

    candidates
        .into_iter()
        .take(limit)
        .map(|candidate| {
            let coord = parse_coord(&candidate)?;
            Ok(Place {
                name: facility_name(&candidate.display_name),
                address: candidate.display_name,
                coord,
            })
        })
        .collect()
}

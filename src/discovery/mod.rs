//! Hospital discovery pipeline state machine.
//!
//! The [`Controller`] decides *what* should happen next; the session runtime
//! decides *how*. Input arrives as [`Event`]s (user actions, auth transitions,
//! and completions of earlier requests) and leaves as [`Effect`]s.
//!
//! ```text
//! AuthChanged(signed in) ──► AcquirePosition #1
//! PositionAcquired #1 ─────► SearchNear #2
//! SearchCompleted #2 ──────► results ranked, status ok
//! ```

pub mod controller;
pub mod state;

pub use controller::{Controller, rank};
pub use state::{ErrorKind, SearchToken, Snapshot, Status, StatusError};

use crate::auth::AuthState;
use crate::geo::{Coord, GeoError};
use crate::search::{Facility, FacilityId, Place, SearchError};


/// Input to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    AuthChanged(AuthState),
    SignInFailed(String),
    QueryEdited(String),
    SearchSubmitted,
    /// Drop the anchor and start over from the device position.
    Reload,
    Selected(FacilityId),
    SelectionCleared,
    PositionAcquired {
        token: SearchToken,
        result: Result<Coord, GeoError>,
    },
    GeocodeCompleted {
        token: SearchToken,
        result: Result<Vec<Place>, SearchError>,
    },
    SearchCompleted {
        token: SearchToken,
        result: Result<Vec<Facility>, SearchError>,
    },
    /// A fix delivered by the position watch.
    DevicePositionUpdated(Coord),
}

/// Work the runtime must perform for the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    AcquirePosition {
        token: SearchToken,
    },
    ForwardGeocode {
        token: SearchToken,
        text: String,
    },
    SearchNear {
        token: SearchToken,
        anchor: Coord,
        text: String,
    },
    StartWatch,
    StopWatch,
}

impl Effect {
    pub fn token(&self) -> Option<SearchToken> {
        match self {
            Effect::AcquirePosition { token }
            | Effect::ForwardGeocode { token, .. }
            | Effect::SearchNear { token, .. } => Some(*token),
            Effect::StartWatch | Effect::StopWatch => None,
        }
    }
}

//! Status, error kinds, and the serializable state snapshot.

use serde::Serialize;
use std::fmt;

use crate::auth::AuthState;
use crate::common::constants::{MESSAGE_EMPTY_AREA, MESSAGE_INVALID_LOCATION};
use crate::geo::{Anchor, Coord, GeoError};
use crate::search::{Facility, FacilityId, SearchError};

/// Tag attached to every outbound request.
///
/// Tokens strictly increase for the lifetime of a controller and are never
/// reset, not even on sign-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SearchToken(pub u64);

impl SearchToken {
    pub fn next(self) -> Self {
        SearchToken(self.0 + 1)
    }
}

impl fmt::Display for SearchToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Unsupported,
    PermissionDenied,
    Unavailable,
    Timeout,
    Network,
    HttpError(u16),
    Empty,
    Parse,
    InvalidLocation,
    AuthFailed,
}

impl ErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            ErrorKind::Unsupported => "unsupported",
            ErrorKind::PermissionDenied => "permission_denied",
            ErrorKind::Unavailable => "unavailable",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Network => "network",
            ErrorKind::HttpError(_) => "http_error",
            ErrorKind::Empty => "empty",
            ErrorKind::Parse => "parse",
            ErrorKind::InvalidLocation => "invalid_location",
            ErrorKind::AuthFailed => "auth_failed",
        }
    }
}

/// An error as shown to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusError {
    pub kind: ErrorKind,
    pub message: String,
    /// Retrying without user intervention cannot succeed.
    pub permanent: bool,
}

impl StatusError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            permanent: false,
        }
    }

    pub fn invalid_location() -> Self {
        Self::new(ErrorKind::InvalidLocation, MESSAGE_INVALID_LOCATION)
    }

    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AuthFailed, message)
    }
}

impl From<GeoError> for StatusError {
    fn from(error: GeoError) -> Self {
        let kind = match error {
            GeoError::Unsupported => ErrorKind::Unsupported,
            GeoError::PermissionDenied => ErrorKind::PermissionDenied,
            GeoError::Timeout => ErrorKind::Timeout,
            GeoError::Unavailable | GeoError::Unknown => ErrorKind::Unavailable,
        };
        Self {
            kind,
            message: error.to_string(),
            permanent: error.is_permanent(),
        }
    }
}

impl From<&SearchError> for StatusError {
    fn from(error: &SearchError) -> Self {
        match error {
            SearchError::Network(_) => Self::new(ErrorKind::Network, error.to_string()),
            SearchError::Http(code) => Self::new(ErrorKind::HttpError(*code), error.to_string()),
            SearchError::Empty => Self::new(ErrorKind::Empty, MESSAGE_EMPTY_AREA),
            SearchError::Parse(_) => Self::new(ErrorKind::Parse, error.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Status {
    #[default]
    Idle,
    Loading,
    Ok,
    Error(StatusError),
}

impl Status {
    pub fn is_loading(&self) -> bool {
        matches!(self, Status::Loading)
    }

    pub fn error(&self) -> Option<&StatusError> {
        match self {
            Status::Error(error) => Some(error),
            _ => None,
        }
    }
}

/// Read-only copy of the controller state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub auth: AuthState,
    pub anchor: Option<Anchor>,
    pub query: String,
    pub results: Vec<Facility>,
    pub selection: Option<FacilityId>,
    pub status: Status,
    pub last_token: SearchToken,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_position: Option<Coord>,
}

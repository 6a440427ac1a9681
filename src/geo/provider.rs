//! Device position source abstraction.
//!
//! A [`GeoProvider`] answers two questions: "where is the device right now"
//! ([`GeoProvider::acquire`]) and "tell me whenever the device moves"
//! ([`GeoProvider::watch`]). Failures are classified into the four kinds the
//! rest of the application understands, using the numeric codes of the
//! device geolocation API (1 = denied, 2 = unavailable, 3 = timeout).

use std::time::Duration;

use super::Coord;
use crate::common::constants::*;

/// Classified position source failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum GeoError {
    #[error("Geolocation is not supported on this system")]
    Unsupported,
    #[error("Location access denied. Please enable permissions in system settings")]
    PermissionDenied,
    #[error("Location unavailable. Please check your network connection")]
    Unavailable,
    #[error("Location request timed out. Try again in better reception area")]
    Timeout,
    #[error("Unknown location error occurred")]
    Unknown,
}

impl GeoError {
    /// Map a geolocation API error code to an error.
    pub fn from_code(code: u16) -> Self {
        match code {
            1 => GeoError::PermissionDenied,
            2 => GeoError::Unavailable,
            3 => GeoError::Timeout,
            _ => GeoError::Unknown,
        }
    }

    /// Geolocation API error code (0 for failures the API has no code for).
    pub fn code(&self) -> u16 {
        match self {
            GeoError::PermissionDenied => 1,
            GeoError::Unavailable => 2,
            GeoError::Timeout => 3,
            GeoError::Unsupported | GeoError::Unknown => 0,
        }
    }

    /// Retrying without user intervention cannot succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(self, GeoError::PermissionDenied | GeoError::Unsupported)
    }
}

/// Options for a position request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
    /// A cached fix younger than this may be returned. Zero forces a fresh fix.
    pub max_cached_age: Duration,
}

impl PositionOptions {
    /// Defaults for single-shot acquisition.
    pub fn for_acquire() -> Self {
        Self {
            high_accuracy: DEFAULT_HIGH_ACCURACY,
            timeout: Duration::from_millis(DEFAULT_ACQUIRE_TIMEOUT_MS),
            max_cached_age: Duration::from_millis(DEFAULT_ACQUIRE_MAX_AGE_MS),
        }
    }

    /// Defaults for watch subscriptions.
    pub fn for_watch() -> Self {
        Self {
            high_accuracy: DEFAULT_HIGH_ACCURACY,
            timeout: Duration::from_millis(DEFAULT_WATCH_TIMEOUT_MS),
            max_cached_age: Duration::from_millis(DEFAULT_WATCH_MAX_AGE_MS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_high_accuracy(mut self, high_accuracy: bool) -> Self {
        self.high_accuracy = high_accuracy;
        self
    }
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self::for_acquire()
    }
}

/// Opaque handle for an active watch subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchHandle(pub(crate) u64);

/// Receiver for watch deliveries.
pub type WatchSink = Box<dyn FnMut(Result<Coord, GeoError>) + Send + 'static>;

/// A source of device positions.
#[cfg_attr(test, mockall::automock)]
pub trait GeoProvider: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Obtain one position fix.
    fn acquire(&self, options: &PositionOptions) -> Result<Coord, GeoError>;

    /// Start delivering fixes (and watch errors) to `sink`.
    fn watch(&self, options: &PositionOptions, sink: WatchSink) -> Result<WatchHandle, GeoError>;

    /// Stop a subscription. Unknown or already released handles are ignored.
    fn unwatch(&self, handle: WatchHandle);
}

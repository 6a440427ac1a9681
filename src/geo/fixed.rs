//! Position source backed by coordinates from the configuration file.

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{Coord, GeoError, GeoProvider, PositionOptions, WatchHandle, WatchSink};

/// Reports a configured position as if it were the device's.
///
/// Without configured coordinates every request fails with
/// [`GeoError::Unsupported`], which tells the user to search manually.
pub struct FixedProvider {
    coord: Option<Coord>,
    next_handle: AtomicU64,
    active: Mutex<HashSet<u64>>,
}

impl FixedProvider {
    pub fn new(coord: Option<Coord>) -> Self {
        Self {
            coord,
            next_handle: AtomicU64::new(1),
            active: Mutex::new(HashSet::new()),
        }
    }

    fn current_fix(&self) -> Result<Coord, GeoError> {
        let coord = self.coord.ok_or(GeoError::Unsupported)?;
        let timestamp_ms = chrono::Utc::now().timestamp_millis();
        Ok(coord.with_fix(Some(0.0), Some(timestamp_ms)))
    }

    /// Number of subscriptions not yet released.
    pub fn active_watches(&self) -> usize {
        self.active.lock().map(|set| set.len()).unwrap_or(0)
    }
}

impl GeoProvider for FixedProvider {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn acquire(&self, _options: &PositionOptions) -> Result<Coord, GeoError> {
        self.current_fix()
    }

    fn watch(&self, _options: &PositionOptions, mut sink: WatchSink) -> Result<WatchHandle, GeoError> {
        let fix = self.current_fix()?;
        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut active) = self.active.lock() {
            active.insert(id);
        }
        // A fixed position never moves, one delivery is the whole stream
        sink(Ok(fix));
        Ok(WatchHandle(id))
    }

    fn unwatch(&self, handle: WatchHandle) {
        if let Ok(mut active) = self.active.lock() {
            active.remove(&handle.0);
        }
    }
}

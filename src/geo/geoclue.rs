//! Device position from the GeoClue2 D-Bus service.
//!
//! GeoClue2 is the system geolocation service on Linux desktops. A request
//! creates a client object, tells the service who is asking (`DesktopId`) and
//! how precise the answer must be, starts it, and reads the location object
//! the client's `Location` property points at once a fix is available.
//!
//! The property is polled rather than waited on, so every wait is bounded by
//! its timeout and can be abandoned between polls. A started client is
//! stopped when its handle is dropped, which happens on every exit
//! path: fix, failure, timeout, and unwatch.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use zbus::blocking::Connection;

use super::{Coord, GeoError, GeoProvider, PositionOptions, WatchHandle, WatchSink};
use crate::common::constants::*;

mod proxies {
    use zbus::Result;
    use zbus::zvariant::OwnedObjectPath;

    #[zbus::proxy(
        default_service = "org.freedesktop.GeoClue2",
        interface = "org.freedesktop.GeoClue2.Manager",
        default_path = "/org/freedesktop/GeoClue2/Manager"
    )]
    pub trait Manager {
        #[zbus(object = "Client")]
        fn get_client(&self);
    }

    #[zbus::proxy(
        default_service = "org.freedesktop.GeoClue2",
        interface = "org.freedesktop.GeoClue2.Client"
    )]
    pub trait Client {
        fn start(&self) -> Result<()>;
        fn stop(&self) -> Result<()>;

        #[zbus(property)]
        fn set_desktop_id(&mut self, id: &str) -> Result<()>;

        #[zbus(property)]
        fn set_requested_accuracy_level(&mut self, level: u32) -> Result<()>;

        /// Current location object, `/` before the first fix. Never cached.
        #[zbus(property(emits_changed_signal = "false"))]
        fn location(&self) -> Result<OwnedObjectPath>;
    }

    #[zbus::proxy(
        default_service = "org.freedesktop.GeoClue2",
        interface = "org.freedesktop.GeoClue2.Location"
    )]
    pub trait Location {
        #[zbus(property)]
        fn latitude(&self) -> Result<f64>;
        #[zbus(property)]
        fn longitude(&self) -> Result<f64>;
        #[zbus(property)]
        fn accuracy(&self) -> Result<f64>;
        /// Seconds and microseconds since the epoch.
        #[zbus(property)]
        fn timestamp(&self) -> Result<(u64, u64)>;
    }
}

use proxies::{ClientProxyBlocking, LocationProxyBlocking, ManagerProxyBlocking};

/// A started location client.
trait LocationClient: Send {
    /// Object path of the latest fix, `None` until the first one arrives.
    fn latest(&self) -> Result<Option<String>, GeoError>;

    fn read(&self, path: &str) -> Result<Coord, GeoError>;
}

/// A GeoClue2 client that is stopped on drop.
struct DbusClient {
    connection: Connection,
    client: ClientProxyBlocking<'static>,
    debug_enabled: bool,
}

impl DbusClient {
    fn start(accuracy_level: u32, debug_enabled: bool) -> Result<Self, GeoError> {
        let connection = system_connection(debug_enabled)?;
        let client = create_client(&connection, accuracy_level)?;
        client.start().map_err(|e| classify(&e))?;
        Ok(Self {
            connection,
            client,
            debug_enabled,
        })
    }
}

impl LocationClient for DbusClient {
    fn latest(&self) -> Result<Option<String>, GeoError> {
        let path = self.client.location().map_err(|e| classify(&e))?;
        Ok((path.as_str() != "/").then(|| path.as_str().to_string()))
    }

    fn read(&self, path: &str) -> Result<Coord, GeoError> {
        read_location(&self.connection, path)
    }
}

impl Drop for DbusClient {
    fn drop(&mut self) {
        if let Err(e) = self.client.stop() {
            log_pipe!();
            log_warning!("Failed to stop GeoClue client: {}", e);
        } else if self.debug_enabled {
            log_pipe!();
            log_debug!("GeoClue client stopped");
        }
    }
}

/// Poll `client` until it reports a location other than `last_seen`.
///
/// Returns `None` once `stopped` is set. A wait longer than `timeout` yields
/// `GeoError::Timeout`.
fn next_fix<C: LocationClient>(
    client: &C,
    last_seen: &mut Option<String>,
    timeout: Duration,
    poll_interval: Duration,
    stopped: &AtomicBool,
) -> Option<Result<Coord, GeoError>> {
    let deadline = Instant::now() + timeout;
    loop {
        if stopped.load(Ordering::SeqCst) {
            return None;
        }

        match client.latest() {
            Err(e) => return Some(Err(e)),
            Ok(Some(path)) if last_seen.as_deref() != Some(path.as_str()) => {
                let fix = client.read(&path);
                *last_seen = Some(path);
                return Some(fix);
            }
            Ok(_) => {}
        }

        let now = Instant::now();
        if now >= deadline {
            return Some(Err(GeoError::Timeout));
        }
        thread::sleep(poll_interval.min(deadline - now));
    }
}

/// One fix from a freshly started client. The client is released on return.
fn acquire_from<C: LocationClient>(
    client: C,
    timeout: Duration,
    poll_interval: Duration,
) -> Result<Coord, GeoError> {
    let never = AtomicBool::new(false);
    next_fix(&client, &mut None, timeout, poll_interval, &never).unwrap_or(Err(GeoError::Timeout))
}

/// Background poller feeding a watch sink.
struct WatchThread {
    stopped: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl WatchThread {
    fn spawn<C: LocationClient + 'static>(
        client: C,
        timeout: Duration,
        poll_interval: Duration,
        mut sink: WatchSink,
    ) -> Self {
        let stopped = Arc::new(AtomicBool::new(false));
        let handle = thread::spawn({
            let stopped = Arc::clone(&stopped);
            move || {
                let mut last_seen = None;
                while let Some(fix) =
                    next_fix(&client, &mut last_seen, timeout, poll_interval, &stopped)
                {
                    let failed = fix.is_err();
                    sink(fix);
                    if failed {
                        thread::sleep(poll_interval);
                    }
                }
                drop(client);
            }
        });

        Self {
            stopped,
            handle: Some(handle),
        }
    }

    /// Finish the poller. Once this returns the sink is not called again and
    /// the client has been stopped.
    fn stop(mut self) {
        self.stopped.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// GeoClue2-backed position source.
pub struct GeoClueProvider {
    debug_enabled: bool,
    poll_interval: Duration,
    last_fix: Mutex<Option<(Instant, Coord)>>,
    next_handle: AtomicU64,
    watches: Mutex<HashMap<u64, WatchThread>>,
}

impl GeoClueProvider {
    pub fn new(debug_enabled: bool) -> Self {
        Self {
            debug_enabled,
            poll_interval: Duration::from_millis(GEOCLUE_POLL_INTERVAL_MS),
            last_fix: Mutex::new(None),
            next_handle: AtomicU64::new(1),
            watches: Mutex::new(HashMap::new()),
        }
    }

    fn cached_fix(&self, max_age: Duration) -> Option<Coord> {
        if max_age.is_zero() {
            return None;
        }
        let guard = self.last_fix.lock().ok()?;
        let (taken_at, coord) = (*guard)?;
        (taken_at.elapsed() <= max_age).then_some(coord)
    }

    fn remember_fix(&self, coord: Coord) {
        if let Ok(mut guard) = self.last_fix.lock() {
            *guard = Some((Instant::now(), coord));
        }
    }
}

impl GeoProvider for GeoClueProvider {
    fn name(&self) -> &'static str {
        "geoclue"
    }

    fn acquire(&self, options: &PositionOptions) -> Result<Coord, GeoError> {
        if let Some(coord) = self.cached_fix(options.max_cached_age) {
            return Ok(coord);
        }

        let client = DbusClient::start(accuracy_level(options.high_accuracy), self.debug_enabled)?;
        let result = acquire_from(client, options.timeout, self.poll_interval);

        if let Ok(coord) = &result {
            self.remember_fix(*coord);
        }
        result
    }

    fn watch(&self, options: &PositionOptions, sink: WatchSink) -> Result<WatchHandle, GeoError> {
        let client = DbusClient::start(accuracy_level(options.high_accuracy), self.debug_enabled)?;
        let poller = WatchThread::spawn(client, options.timeout, self.poll_interval, sink);

        let id = self.next_handle.fetch_add(1, Ordering::Relaxed);
        match self.watches.lock() {
            Ok(mut watches) => {
                watches.insert(id, poller);
            }
            Err(_) => {
                poller.stop();
                return Err(GeoError::Unavailable);
            }
        }

        if self.debug_enabled {
            log_pipe!();
            log_debug!("GeoClue watch {} started", id);
        }

        Ok(WatchHandle(id))
    }

    fn unwatch(&self, handle: WatchHandle) {
        let removed = self
            .watches
            .lock()
            .ok()
            .and_then(|mut watches| watches.remove(&handle.0));

        if let Some(poller) = removed {
            poller.stop();
            if self.debug_enabled {
                log_pipe!();
                log_debug!("GeoClue watch {} released", handle.0);
            }
        }
    }
}

impl Drop for GeoClueProvider {
    fn drop(&mut self) {
        let pollers: Vec<WatchThread> = self
            .watches
            .lock()
            .map(|mut watches| watches.drain().map(|(_, poller)| poller).collect())
            .unwrap_or_default();
        for poller in pollers {
            poller.stop();
        }
    }
}

fn accuracy_level(high_accuracy: bool) -> u32 {
    if high_accuracy {
        GEOCLUE_ACCURACY_EXACT
    } else {
        GEOCLUE_ACCURACY_STREET
    }
}

fn system_connection(debug_enabled: bool) -> Result<Connection, GeoError> {
    Connection::system().map_err(|e| {
        if debug_enabled {
            log_pipe!();
            log_debug!("System D-Bus unavailable: {}", e);
        }
        GeoError::Unsupported
    })
}

fn create_client(
    connection: &Connection,
    accuracy_level: u32,
) -> Result<ClientProxyBlocking<'static>, GeoError> {
    let manager = ManagerProxyBlocking::new(connection).map_err(|e| classify(&e))?;
    let mut client = manager.get_client().map_err(|e| classify(&e))?;
    client
        .set_desktop_id(GEOCLUE_DESKTOP_ID)
        .map_err(|e| classify(&e))?;
    client
        .set_requested_accuracy_level(accuracy_level)
        .map_err(|e| classify(&e))?;
    Ok(client)
}

fn read_location(connection: &Connection, path: &str) -> Result<Coord, GeoError> {
    let location = LocationProxyBlocking::builder(connection)
        .path(path.to_string())
        .map_err(|e| classify(&e))?
        .build()
        .map_err(|e| classify(&e))?;

    let lat = location.latitude().map_err(|e| classify(&e))?;
    let lng = location.longitude().map_err(|e| classify(&e))?;
    let accuracy = location.accuracy().ok().filter(|a| a.is_finite() && *a >= 0.0);
    let timestamp_ms = location
        .timestamp()
        .ok()
        .map(|(secs, micros)| (secs * 1000 + micros / 1000) as i64);

    Coord::try_new(lat, lng)
        .map(|coord| coord.with_fix(accuracy, timestamp_ms))
        .map_err(|_| GeoError::Unavailable)
}

/// Map D-Bus failures onto the geolocation error kinds.
fn classify(error: &zbus::Error) -> GeoError {
    match error {
        zbus::Error::MethodError(name, _, _) => classify_error_name(name.as_str()),
        zbus::Error::FDO(fdo) => match &**fdo {
            zbus::fdo::Error::AccessDenied(_) => GeoError::PermissionDenied,
            zbus::fdo::Error::ServiceUnknown(_) | zbus::fdo::Error::NameHasNoOwner(_) => {
                GeoError::Unsupported
            }
            zbus::fdo::Error::Timeout(_) | zbus::fdo::Error::NoReply(_) => GeoError::Timeout,
            _ => GeoError::Unavailable,
        },
        _ => GeoError::Unavailable,
    }
}

pub(crate) fn classify_error_name(name: &str) -> GeoError {
    match name {
        "org.freedesktop.DBus.Error.AccessDenied" => GeoError::PermissionDenied,
        "org.freedesktop.DBus.Error.ServiceUnknown"
        | "org.freedesktop.DBus.Error.NameHasNoOwner"
        | "org.freedesktop.DBus.Error.UnknownMethod" => GeoError::Unsupported,
        "org.freedesktop.DBus.Error.Timeout" | "org.freedesktop.DBus.Error.NoReply" => {
            GeoError::Timeout
        }
        _ => GeoError::Unavailable,
    }
}

use super::*;
use crate::auth::{AuthError, MockIdentityProvider};
use crate::common::constants::test_constants::*;
use crate::discovery::{ErrorKind, Status};
use crate::geo::provider::MockGeoProvider;
use crate::geo::{AnchorSource, GeoError};
use crate::search::{Facility, FacilityId, MockPlaceSearch, Place, SearchError};
use crossterm::event::{KeyCode, KeyModifiers};
use mockall::predicate::eq;

fn identity(result: Result<&'static str, &'static str>) -> AuthGate {
    let mut provider = MockIdentityProvider::new();
    provider.expect_name().return_const("mock");
    provider.expect_sign_in().returning(move || {
        result
            .map(str::to_string)
            .map_err(|e| AuthError::AuthFailed(e.to_string()))
    });
    AuthGate::new(Box::new(provider))
}

fn device() -> Coord {
    Coord::new(TEST_DEVICE_LAT, TEST_DEVICE_LNG)
}

fn boston() -> Coord {
    Coord::new(TEST_BOSTON_LAT, TEST_BOSTON_LNG)
}

fn facility(id: u64, name: &str, near: Coord, north_km: f64) -> Facility {
    Facility {
        id: FacilityId(id),
        name: name.to_string(),
        address: format!("{name}, Main St"),
        coord: Coord::new(near.lat + north_km / 111.2, near.lng),
        distance_km: 0.0,
    }
}

fn geo_at(coord: Coord) -> MockGeoProvider {
    let mut geo = MockGeoProvider::new();
    geo.expect_name().return_const("mock");
    geo.expect_acquire().returning(move |_| Ok(coord));
    geo
}

fn session(config: &Config, auth: AuthGate, geo: MockGeoProvider, search: MockPlaceSearch) -> Session {
    Session::new(config, auth, Arc::new(geo), Arc::new(search), false)
}

fn key(code: KeyCode) -> Message {
    Message::Key(KeyEvent::new(code, KeyModifiers::NONE))
}

#[test]
fn test_search_once_from_device_position() {
    let mut search = MockPlaceSearch::new();
    search
        .expect_search_near()
        .withf(|anchor, text, limit| {
            anchor.same_position(&device()) && text.is_empty() && *limit == 15
        })
        .times(1)
        .returning(|anchor, _, _| {
            Ok(vec![
                facility(2, "Far", *anchor, 3.0),
                facility(1, "Near", *anchor, 1.0),
            ])
        });

    let mut session = session(
        &Config::default(),
        identity(Ok("ada")),
        geo_at(device()),
        search,
    );
    session.search_once(None).unwrap();

    let controller = session.controller();
    assert_eq!(controller.status(), &Status::Ok);
    assert_eq!(controller.auth().user_id.as_deref(), Some("ada"));
    assert_eq!(controller.anchor().unwrap().source, AnchorSource::Device);
    let names: Vec<&str> = controller.results().iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["Near", "Far"]);
    assert!((controller.results()[0].distance_km - 1.0).abs() < 0.05);
}

#[test]
fn test_search_once_with_place_uses_manual_anchor() {
    let mut geo = MockGeoProvider::new();
    geo.expect_name().return_const("mock");
    geo.expect_acquire().returning(|_| Err(GeoError::Timeout));

    let mut search = MockPlaceSearch::new();
    search
        .expect_forward_geocode()
        .withf(|text, limit| text == "Boston" && *limit == FORWARD_GEOCODE_LIMIT)
        .times(1)
        .returning(|_, _| {
            Ok(vec![Place {
                name: "Boston".into(),
                address: "Boston, Massachusetts, United States".into(),
                coord: boston(),
            }])
        });
    search
        .expect_search_near()
        .withf(|anchor, text, _| anchor.same_position(&boston()) && text == "Boston")
        .times(1)
        .returning(|anchor, _, _| Ok(vec![facility(7, "Mass General", *anchor, 0.5)]));

    let mut session = session(&Config::default(), identity(Ok("ada")), geo, search);
    session.search_once(Some("Boston")).unwrap();

    let controller = session.controller();
    assert_eq!(controller.status(), &Status::Ok);
    assert_eq!(controller.anchor().unwrap().source, AnchorSource::Manual);
    assert_eq!(controller.query(), "Boston");
    assert_eq!(controller.results()[0].id, FacilityId(7));
}

#[test]
fn test_sign_in_failure_is_reported() {
    let mut session = session(
        &Config::default(),
        identity(Err("no login name available")),
        MockGeoProvider::new(),
        MockPlaceSearch::new(),
    );
    session.search_once(None).unwrap();

    let controller = session.controller();
    assert!(!controller.auth().authenticated);
    let error = controller.status().error().unwrap();
    assert_eq!(error.kind, ErrorKind::AuthFailed);
    assert_eq!(error.message, "Login failed: no login name available");
    assert_eq!(controller.last_token().0, 0);
}

#[test]
fn test_search_failure_surfaces_in_status() {
    let mut search = MockPlaceSearch::new();
    search
        .expect_search_near()
        .returning(|_, _, _| Err(SearchError::Network("connection refused".into())));

    let mut session = session(
        &Config::default(),
        identity(Ok("ada")),
        geo_at(device()),
        search,
    );
    session.search_once(None).unwrap();

    let error = session.controller().status().error().unwrap();
    assert_eq!(error.kind, ErrorKind::Network);
    assert!(!error.permanent);
}

#[test]
fn test_permission_denied_is_permanent() {
    let mut geo = MockGeoProvider::new();
    geo.expect_acquire()
        .returning(|_| Err(GeoError::PermissionDenied));

    let mut session = session(
        &Config::default(),
        identity(Ok("ada")),
        geo,
        MockPlaceSearch::new(),
    );
    session.search_once(None).unwrap();

    let error = session.controller().status().error().unwrap();
    assert_eq!(error.kind, ErrorKind::PermissionDenied);
    assert!(error.permanent);
    assert!(session.controller().anchor().is_none());
}

#[test]
fn test_watch_scoped_to_signed_in_session() {
    let mut geo = geo_at(device());
    geo.expect_watch().times(1).returning(|_, mut sink| {
        sink(Ok(Coord::new(TEST_DEVICE_LAT + 0.001, TEST_DEVICE_LNG)));
        sink(Err(GeoError::Timeout));
        Ok(WatchHandle(7))
    });
    geo.expect_unwatch()
        .with(eq(WatchHandle(7)))
        .times(1)
        .return_const(());

    let mut search = MockPlaceSearch::new();
    search.expect_search_near().returning(|_, _, _| Ok(Vec::new()));

    let config = Config {
        follow_device: Some(true),
        ..Config::default()
    };
    let mut session = session(&config, identity(Ok("ada")), geo, search);
    session.search_once(None).unwrap();

    assert!(session.is_watching());
    let position = session.controller().device_position().unwrap();
    assert!((position.lat - (TEST_DEVICE_LAT + 0.001)).abs() < 1e-9);

    session.sign_out();
    let message = session.next_message().unwrap();
    assert_eq!(session.process(message), Flow::Continue);

    assert!(!session.is_watching());
    assert!(!session.controller().auth().authenticated);
    assert!(session.controller().device_position().is_none());
}

#[test]
fn test_keys_move_selection_and_toggle_filter() {
    let mut search = MockPlaceSearch::new();
    search.expect_search_near().returning(|anchor, _, _| {
        Ok(vec![
            facility(1, "Alpha", *anchor, 1.0),
            facility(2, "Beta", *anchor, 2.0),
        ])
    });

    let mut session = session(
        &Config::default(),
        identity(Ok("ada")),
        geo_at(device()),
        search,
    );
    session.search_once(None).unwrap();

    session.process(key(KeyCode::Down));
    assert_eq!(session.controller().selection(), Some(FacilityId(1)));
    session.process(key(KeyCode::Down));
    assert_eq!(session.controller().selection(), Some(FacilityId(2)));
    session.process(key(KeyCode::Up));
    assert_eq!(session.controller().selection(), Some(FacilityId(1)));
    session.process(key(KeyCode::Esc));
    assert_eq!(session.controller().selection(), None);

    session.process(key(KeyCode::Tab));
    assert!(session.view().filter_enabled);

    // With the filter on, only "Beta" is displayed
    session.process(key(KeyCode::Char('b')));
    session.process(key(KeyCode::Down));
    assert_eq!(session.controller().query(), "b");
    assert_eq!(session.controller().selection(), Some(FacilityId(2)));
}

#[test]
fn test_enter_on_login_screen_signs_in() {
    let mut search = MockPlaceSearch::new();
    search.expect_search_near().returning(|_, _, _| Ok(Vec::new()));

    let mut session = session(
        &Config::default(),
        identity(Ok("ada")),
        geo_at(device()),
        search,
    );

    assert_eq!(session.process(key(KeyCode::Enter)), Flow::Continue);
    session.run_until_settled(None).unwrap();
    assert!(session.controller().auth().authenticated);
    assert!(session.render().iter().any(|l| l == "Signed in as ada"));
}

#[test]
fn test_shutdown_and_ctrl_c_quit() {
    let mut session = session(
        &Config::default(),
        identity(Ok("ada")),
        MockGeoProvider::new(),
        MockPlaceSearch::new(),
    );

    assert_eq!(session.process(Message::Shutdown), Flow::Quit);
    let ctrl_c = Message::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
    assert_eq!(session.process(ctrl_c), Flow::Quit);
}

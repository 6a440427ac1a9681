#[cfg(test)]
mod distance_tests {
    use crate::geo::*;

    /// New York City to Boston is roughly 306 km on the sphere.
    #[test]
    fn test_known_city_distance() {
        let nyc = Coord::new(40.7128, -74.0060);
        let boston = Coord::new(42.3601, -71.0589);
        let d = distance_km(&nyc, &boston);
        assert!((d - 306.0).abs() < 2.0, "NYC-Boston should be ~306 km, got {d}");
    }

    #[test]
    fn test_distance_identity_and_symmetry() {
        let a = Coord::new(40.0, -74.0);
        let b = Coord::new(40.01, -74.02);
        assert_eq!(distance_km(&a, &a), 0.0);
        assert_eq!(distance_km(&a, &b), distance_km(&b, &a));
        assert!(distance_km(&a, &b) > 0.0);
    }

    #[test]
    fn test_distance_ignores_fix_metadata() {
        let a = Coord::new(51.5074, -0.1278);
        let b = a.with_fix(Some(12.0), Some(1_700_000_000_000));
        assert_eq!(distance_km(&a, &b), 0.0);
    }

    #[test]
    fn test_antipodal_distance_is_half_circumference() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(0.0, 180.0);
        let half = std::f64::consts::PI * crate::common::constants::EARTH_RADIUS_KM;
        assert!((distance_km(&a, &b) - half).abs() < 1e-6);
    }

    #[test]
    fn test_display_rounding() {
        assert_eq!(round_for_display(1.24), 1.2);
        assert_eq!(round_for_display(1.25), 1.3);
        assert_eq!(round_for_display(0.04), 0.0);
        assert_eq!(format_distance(2.46), "2.5 km away");
    }
}

#[cfg(test)]
mod coord_tests {
    use crate::geo::*;

    #[test]
    fn test_coordinate_validation() {
        assert!(Coord::try_new(40.7128, -74.0060).is_ok());
        assert!(Coord::try_new(90.0, 180.0).is_ok());
        assert!(Coord::try_new(-90.0, -180.0).is_ok());

        assert_eq!(
            Coord::try_new(91.0, 0.0),
            Err(CoordError::LatitudeOutOfRange(91.0))
        );
        assert_eq!(
            Coord::try_new(0.0, -181.0),
            Err(CoordError::LongitudeOutOfRange(-181.0))
        );
        assert_eq!(Coord::try_new(f64::NAN, 0.0), Err(CoordError::NotFinite));
        assert_eq!(
            Coord::try_new(0.0, f64::INFINITY),
            Err(CoordError::NotFinite)
        );
    }

    #[test]
    fn test_negative_accuracy_rejected() {
        let coord = Coord::new(10.0, 10.0).with_fix(Some(-1.0), None);
        assert_eq!(coord.validate(), Err(CoordError::InvalidAccuracy(-1.0)));
    }

    #[test]
    fn test_coord_display_hemispheres() {
        assert_eq!(Coord::new(40.0, -74.0).to_string(), "40.0000°N 74.0000°W");
        assert_eq!(Coord::new(-33.8688, 151.2093).to_string(), "33.8688°S 151.2093°E");
    }

    #[test]
    fn test_anchor_constructors() {
        let c = Coord::new(1.0, 2.0);
        assert_eq!(Anchor::device(c).source, AnchorSource::Device);
        assert_eq!(Anchor::manual(c).source, AnchorSource::Manual);
    }
}

#[cfg(test)]
mod provider_tests {
    use crate::geo::geoclue::classify_error_name;
    use crate::geo::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_error_codes_map_to_kinds() {
        assert_eq!(GeoError::from_code(1), GeoError::PermissionDenied);
        assert_eq!(GeoError::from_code(2), GeoError::Unavailable);
        assert_eq!(GeoError::from_code(3), GeoError::Timeout);
        assert_eq!(GeoError::from_code(0), GeoError::Unknown);
        assert_eq!(GeoError::from_code(42), GeoError::Unknown);

        for code in 1..=3 {
            assert_eq!(GeoError::from_code(code).code(), code);
        }
    }

    #[test]
    fn test_only_denied_and_unsupported_are_permanent() {
        assert!(GeoError::PermissionDenied.is_permanent());
        assert!(GeoError::Unsupported.is_permanent());
        assert!(!GeoError::Unavailable.is_permanent());
        assert!(!GeoError::Timeout.is_permanent());
        assert!(!GeoError::Unknown.is_permanent());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            GeoError::PermissionDenied.to_string(),
            "Location access denied. Please enable permissions in system settings"
        );
        assert_eq!(
            GeoError::Timeout.to_string(),
            "Location request timed out. Try again in better reception area"
        );
    }

    #[test]
    fn test_default_options() {
        let acquire = PositionOptions::for_acquire();
        assert!(acquire.high_accuracy);
        assert_eq!(acquire.timeout.as_millis(), 15_000);
        assert!(acquire.max_cached_age.is_zero());

        let watch = PositionOptions::for_watch();
        assert_eq!(watch.timeout.as_millis(), 10_000);
        assert_eq!(watch.max_cached_age.as_millis(), 30_000);
    }

    #[test]
    fn test_dbus_error_classification() {
        assert_eq!(
            classify_error_name("org.freedesktop.DBus.Error.AccessDenied"),
            GeoError::PermissionDenied
        );
        assert_eq!(
            classify_error_name("org.freedesktop.DBus.Error.ServiceUnknown"),
            GeoError::Unsupported
        );
        assert_eq!(
            classify_error_name("org.freedesktop.DBus.Error.NoReply"),
            GeoError::Timeout
        );
        assert_eq!(
            classify_error_name("org.freedesktop.GeoClue2.Error.Whatever"),
            GeoError::Unavailable
        );
    }

    #[test]
    fn test_fixed_provider_without_coordinates_is_unsupported() {
        let provider = FixedProvider::new(None);
        assert_eq!(
            provider.acquire(&PositionOptions::for_acquire()),
            Err(GeoError::Unsupported)
        );
        let result = provider.watch(&PositionOptions::for_watch(), Box::new(|_| {}));
        assert_eq!(result, Err(GeoError::Unsupported));
    }

    #[test]
    fn test_fixed_provider_reports_fresh_fix() {
        let provider = FixedProvider::new(Some(Coord::new(40.0, -74.0)));
        let fix = provider.acquire(&PositionOptions::for_acquire()).unwrap();
        assert!(fix.same_position(&Coord::new(40.0, -74.0)));
        assert!(fix.timestamp_ms.is_some());
        assert_eq!(fix.accuracy_m, Some(0.0));
    }

    #[test]
    fn test_fixed_provider_watch_and_idempotent_unwatch() {
        let provider = FixedProvider::new(Some(Coord::new(1.0, 2.0)));
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink_store = Arc::clone(&received);

        let handle = provider
            .watch(
                &PositionOptions::for_watch(),
                Box::new(move |fix| sink_store.lock().unwrap().push(fix)),
            )
            .unwrap();

        assert_eq!(received.lock().unwrap().len(), 1);
        assert_eq!(provider.active_watches(), 1);

        provider.unwatch(handle);
        provider.unwatch(handle);
        provider.unwatch(WatchHandle(999));
        assert_eq!(provider.active_watches(), 0);
    }
}

use hospital_locator::geo::{Coord, distance_km, round_for_display};
use proptest::prelude::*;

/// Generate valid coordinates
fn coord_strategy() -> impl Strategy<Value = Coord> {
    (-90.0..=90.0f64, -180.0..=180.0f64).prop_map(|(lat, lng)| Coord::new(lat, lng))
}

proptest! {
    #[test]
    fn test_distance_is_symmetric(a in coord_strategy(), b in coord_strategy()) {
        prop_assert_eq!(distance_km(&a, &b), distance_km(&b, &a));
    }

    #[test]
    fn test_distance_to_self_is_zero(a in coord_strategy()) {
        prop_assert!(distance_km(&a, &a).abs() < 1e-9);
    }

    #[test]
    fn test_distance_is_bounded(a in coord_strategy(), b in coord_strategy()) {
        let d = distance_km(&a, &b);
        prop_assert!(d >= 0.0);
        // Half the circumference of a 6371 km sphere
        prop_assert!(d <= std::f64::consts::PI * 6371.0 + 1e-6);
    }

    #[test]
    fn test_triangle_inequality(
        a in coord_strategy(),
        b in coord_strategy(),
        c in coord_strategy()
    ) {
        let direct = distance_km(&a, &c);
        let detour = distance_km(&a, &b) + distance_km(&b, &c);
        prop_assert!(direct <= detour + 1e-6, "{} > {}", direct, detour);
    }

    #[test]
    fn test_display_rounding_stays_within_half_a_step(km in 0.0..20000.0f64) {
        let shown = round_for_display(km);
        prop_assert!((shown - km).abs() <= 0.05 + 1e-9);
    }
}

//! Controller invariants under arbitrary interleavings of user actions and
//! out-of-order completions.

use hospital_locator::auth::AuthState;
use hospital_locator::discovery::{Controller, Effect, Event, SearchToken};
use hospital_locator::geo::{Coord, GeoError, distance_km};
use hospital_locator::search::{Facility, FacilityId, Place, SearchError};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Step {
    SignIn,
    SignOut,
    Edit(&'static str),
    Submit,
    Reload,
    Select(usize),
    ClearSelection,
    /// Deliver the outstanding request at this index, successfully or not.
    Deliver { index: usize, succeed: bool },
    /// Deliver a reply for a token that was never issued.
    Forged(u64),
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        1 => Just(Step::SignIn),
        1 => Just(Step::SignOut),
        2 => prop_oneof![Just(""), Just("Boston"), Just("  "), Just("Paris")].prop_map(Step::Edit),
        2 => Just(Step::Submit),
        1 => Just(Step::Reload),
        2 => (0usize..8).prop_map(Step::Select),
        1 => Just(Step::ClearSelection),
        6 => (0usize..4, proptest::bool::weighted(0.8))
            .prop_map(|(index, succeed)| Step::Deliver { index, succeed }),
        1 => (0u64..50).prop_map(Step::Forged),
    ]
}

fn device() -> Coord {
    Coord::new(40.7128, -74.0060)
}

/// Facilities scattered around `anchor`; ids are unique per token.
///
/// The last one shares the first one's position and sorts before it by
/// name, so every reply contains a distance tie.
fn facilities_near(anchor: &Coord, token: SearchToken) -> Vec<Facility> {
    (0..4u64)
        .map(|i| {
            let slot = if i == 3 { 0 } else { i };
            let offset = ((token.0 * 7 + slot * 13) % 10) as f64 / 100.0;
            let coord = Coord::new(anchor.lat + offset - 0.05, anchor.lng + 0.05 - offset / 2.0);
            Facility {
                id: FacilityId(token.0 * 10 + i),
                name: format!("Hospital {}", (b'D' - i as u8) as char),
                address: String::new(),
                coord,
                distance_km: distance_km(anchor, &coord),
            }
        })
        .collect()
}

/// The completion event for a request, as the runtime would report it.
fn complete(effect: &Effect, succeed: bool) -> Option<Event> {
    match effect {
        Effect::AcquirePosition { token } => Some(Event::PositionAcquired {
            token: *token,
            result: if succeed {
                Ok(device())
            } else {
                Err(GeoError::Timeout)
            },
        }),
        Effect::ForwardGeocode { token, .. } => Some(Event::GeocodeCompleted {
            token: *token,
            result: if succeed {
                Ok(vec![Place {
                    name: "Boston".into(),
                    address: String::new(),
                    coord: Coord::new(42.3601, -71.0589),
                }])
            } else {
                Err(SearchError::Network("offline".into()))
            },
        }),
        Effect::SearchNear { token, anchor, .. } => Some(Event::SearchCompleted {
            token: *token,
            result: if succeed {
                Ok(facilities_near(anchor, *token))
            } else {
                Err(SearchError::Empty)
            },
        }),
        Effect::StartWatch | Effect::StopWatch => None,
    }
}

fn check_invariants(controller: &Controller) -> Result<(), TestCaseError> {
    let results = controller.results();

    if let Some(selected) = controller.selection() {
        prop_assert!(
            results.iter().any(|f| f.id == selected),
            "selection {:?} not among results",
            selected
        );
    }

    for pair in results.windows(2) {
        prop_assert!(pair[0].distance_km <= pair[1].distance_km);
        prop_assert!(
            pair[0].distance_km < pair[1].distance_km || pair[0].name <= pair[1].name,
            "equal distances out of name order: {} before {}",
            pair[0].name,
            pair[1].name
        );
    }

    if let Some(anchor) = controller.anchor() {
        for facility in results {
            let expected = distance_km(&anchor.coord, &facility.coord);
            prop_assert!((facility.distance_km - expected).abs() <= 0.05);
        }
    }

    if controller.status().is_loading() {
        prop_assert_eq!(controller.pending(), Some(controller.last_token()));
    }
    if let Some(pending) = controller.pending() {
        prop_assert_eq!(pending, controller.last_token());
    }

    if !controller.auth().authenticated {
        prop_assert!(results.is_empty());
        prop_assert!(controller.anchor().is_none());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn test_invariants_hold_for_any_interleaving(
        steps in proptest::collection::vec(step_strategy(), 1..60)
    ) {
        let mut controller = Controller::new(false);
        let mut outstanding: Vec<Effect> = Vec::new();

        for step in steps {
            let previous_token = controller.last_token();

            let effects = match step {
                Step::SignIn => controller.handle(Event::AuthChanged(AuthState::signed_in("alice"))),
                Step::SignOut => controller.handle(Event::AuthChanged(AuthState::signed_out())),
                Step::Edit(text) => controller.handle(Event::QueryEdited(text.to_string())),
                Step::Submit => controller.handle(Event::SearchSubmitted),
                Step::Reload => controller.handle(Event::Reload),
                Step::Select(index) => {
                    let id = controller
                        .results()
                        .get(index)
                        .map(|f| f.id)
                        .unwrap_or(FacilityId(u64::MAX));
                    controller.handle(Event::Selected(id))
                }
                Step::ClearSelection => controller.handle(Event::SelectionCleared),
                Step::Deliver { index, succeed } => {
                    if outstanding.is_empty() {
                        Vec::new()
                    } else {
                        let effect = outstanding.remove(index % outstanding.len());
                        let stale = effect.token() != controller.pending();
                        let before = controller.snapshot();
                        match complete(&effect, succeed) {
                            Some(event) => {
                                let effects = controller.handle(event);
                                if stale {
                                    prop_assert!(effects.is_empty());
                                    prop_assert_eq!(&controller.snapshot(), &before);
                                }
                                effects
                            }
                            None => Vec::new(),
                        }
                    }
                }
                Step::Forged(n) => {
                    let token = SearchToken(n);
                    let expected = controller.pending();
                    let effects = controller.handle(Event::SearchCompleted {
                        token,
                        result: Ok(facilities_near(&device(), token)),
                    });
                    if expected != Some(token) {
                        prop_assert!(effects.is_empty());
                    }
                    effects
                }
            };

            prop_assert!(controller.last_token() >= previous_token);
            for effect in &effects {
                if let Some(token) = effect.token() {
                    prop_assert!(token > previous_token);
                }
            }
            outstanding.extend(effects);
            check_invariants(&controller)?;
        }
    }
}

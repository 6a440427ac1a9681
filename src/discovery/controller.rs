//! The discovery state machine.
//!
//! [`Controller`] owns every piece of discovery state and never performs I/O.
//! Each event returns the [`Effect`]s the runtime must execute; their
//! completions come back as token-tagged events. Only a completion carrying
//! the outstanding token is applied, so a slow reply to an abandoned request
//! can never overwrite newer results.

use std::collections::HashSet;

use super::state::{SearchToken, Snapshot, Status, StatusError};
use super::{Effect, Event};
use crate::auth::AuthState;
use crate::geo::{Anchor, Coord, GeoError, distance_km};
use crate::search::{Facility, FacilityId, Place, SearchError};

#[derive(Debug, Clone)]
pub struct Controller {
    follow_device: bool,
    auth: AuthState,
    anchor: Option<Anchor>,
    query_text: String,
    results: Vec<Facility>,
    selection: Option<FacilityId>,
    status: Status,
    last_token: SearchToken,
    pending: Option<SearchToken>,
    /// Query text captured when the current flow started.
    flow_text: String,
    device_position: Option<Coord>,
    watching: bool,
}

impl Controller {
    /// Create a signed-out controller.
    ///
    /// With `follow_device` the controller asks for a position watch for the
    /// duration of each signed-in session.
    pub fn new(follow_device: bool) -> Self {
        Self {
            follow_device,
            auth: AuthState::signed_out(),
            anchor: None,
            query_text: String::new(),
            results: Vec::new(),
            selection: None,
            status: Status::Idle,
            last_token: SearchToken::default(),
            pending: None,
            flow_text: String::new(),
            device_position: None,
            watching: false,
        }
    }

    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        match event {
            Event::AuthChanged(state) => self.auth_changed(state),
            Event::SignInFailed(message) => {
                self.sign_in_failed(message);
                Vec::new()
            }
            _ if !self.auth.authenticated => Vec::new(),
            Event::QueryEdited(text) => {
                self.query_text = text;
                Vec::new()
            }
            Event::SearchSubmitted => self.submit_search(),
            Event::Reload => self.reload(),
            Event::Selected(id) => {
                self.select(id);
                Vec::new()
            }
            Event::SelectionCleared => {
                self.selection = None;
                Vec::new()
            }
            Event::PositionAcquired { token, result } => self.position_acquired(token, result),
            Event::GeocodeCompleted { token, result } => self.geocode_completed(token, result),
            Event::SearchCompleted { token, result } => self.search_completed(token, result),
            Event::DevicePositionUpdated(coord) => {
                if self.watching {
                    self.device_position = Some(coord);
                }
                Vec::new()
            }
        }
    }

    // Accessors

    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    pub fn anchor(&self) -> Option<&Anchor> {
        self.anchor.as_ref()
    }

    pub fn query(&self) -> &str {
        &self.query_text
    }

    pub fn results(&self) -> &[Facility] {
        &self.results
    }

    pub fn selection(&self) -> Option<FacilityId> {
        self.selection
    }

    pub fn selected_facility(&self) -> Option<&Facility> {
        let id = self.selection?;
        self.results.iter().find(|f| f.id == id)
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn last_token(&self) -> SearchToken {
        self.last_token
    }

    pub fn pending(&self) -> Option<SearchToken> {
        self.pending
    }

    pub fn device_position(&self) -> Option<&Coord> {
        self.device_position.as_ref()
    }

    pub fn is_watching(&self) -> bool {
        self.watching
    }

    /// No request is outstanding.
    pub fn is_settled(&self) -> bool {
        self.pending.is_none()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            auth: self.auth.clone(),
            anchor: self.anchor,
            query: self.query_text.clone(),
            results: self.results.clone(),
            selection: self.selection,
            status: self.status.clone(),
            last_token: self.last_token,
            device_position: self.device_position,
        }
    }

    // Transitions

    fn auth_changed(&mut self, state: AuthState) -> Vec<Effect> {
        if state == self.auth {
            return Vec::new();
        }

        if !state.authenticated {
            let was_watching = self.watching;
            self.reset(state);
            return if was_watching {
                vec![Effect::StopWatch]
            } else {
                Vec::new()
            };
        }

        // A different user replaces the previous session entirely
        let mut effects = Vec::new();
        if self.auth.authenticated && self.watching {
            effects.push(Effect::StopWatch);
        }
        self.reset(state);

        effects.extend(self.refresh_from_device());
        if self.follow_device {
            self.watching = true;
            effects.push(Effect::StartWatch);
        }
        effects
    }

    /// Clear all session state. The token counter survives.
    fn reset(&mut self, auth: AuthState) {
        self.auth = auth;
        self.anchor = None;
        self.query_text.clear();
        self.results.clear();
        self.selection = None;
        self.status = Status::Idle;
        self.pending = None;
        self.flow_text.clear();
        self.device_position = None;
        self.watching = false;
    }

    fn sign_in_failed(&mut self, message: String) {
        if !self.auth.authenticated {
            self.status = Status::Error(StatusError::auth_failed(message));
        }
    }

    fn submit_search(&mut self) -> Vec<Effect> {
        let text = self.query_text.trim().to_string();
        if text.is_empty() {
            self.refresh_from_device()
        } else {
            self.forward_geocode(text)
        }
    }

    fn reload(&mut self) -> Vec<Effect> {
        self.anchor = None;
        self.refresh_from_device()
    }

    fn select(&mut self, id: FacilityId) {
        if self.results.iter().any(|f| f.id == id) {
            self.selection = Some(id);
        }
    }

    fn refresh_from_device(&mut self) -> Vec<Effect> {
        self.status = Status::Loading;
        self.selection = None;
        self.flow_text = self.query_text.trim().to_string();

        match self.anchor {
            Some(anchor) => vec![self.search_near(anchor.coord)],
            None => {
                let token = self.issue_token();
                vec![Effect::AcquirePosition { token }]
            }
        }
    }

    fn forward_geocode(&mut self, text: String) -> Vec<Effect> {
        self.status = Status::Loading;
        self.flow_text = text.clone();
        let token = self.issue_token();
        vec![Effect::ForwardGeocode { token, text }]
    }

    /// Bounded search with the text the current flow was started with, so
    /// edits made while a request is in flight do not leak into it.
    fn search_near(&mut self, anchor: Coord) -> Effect {
        self.status = Status::Loading;
        let token = self.issue_token();
        Effect::SearchNear {
            token,
            anchor,
            text: self.flow_text.clone(),
        }
    }

    fn issue_token(&mut self) -> SearchToken {
        self.last_token = self.last_token.next();
        self.pending = Some(self.last_token);
        self.last_token
    }

    /// Consume the outstanding token if `token` is it.
    fn accept(&mut self, token: SearchToken) -> bool {
        if self.pending == Some(token) && token == self.last_token {
            self.pending = None;
            true
        } else {
            false
        }
    }

    fn position_acquired(
        &mut self,
        token: SearchToken,
        result: Result<Coord, GeoError>,
    ) -> Vec<Effect> {
        if !self.accept(token) {
            return Vec::new();
        }

        match result {
            Ok(coord) => {
                self.anchor = Some(Anchor::device(coord));
                vec![self.search_near(coord)]
            }
            Err(error) => {
                self.status = Status::Error(error.into());
                Vec::new()
            }
        }
    }

    fn geocode_completed(
        &mut self,
        token: SearchToken,
        result: Result<Vec<Place>, SearchError>,
    ) -> Vec<Effect> {
        if !self.accept(token) {
            return Vec::new();
        }

        match result.ok().and_then(|places| places.into_iter().next()) {
            Some(place) => {
                self.anchor = Some(Anchor::manual(place.coord));
                vec![self.search_near(place.coord)]
            }
            None => {
                self.status = Status::Error(StatusError::invalid_location());
                Vec::new()
            }
        }
    }

    fn search_completed(
        &mut self,
        token: SearchToken,
        result: Result<Vec<Facility>, SearchError>,
    ) -> Vec<Effect> {
        if !self.accept(token) {
            return Vec::new();
        }

        match result {
            Ok(facilities) => {
                let anchor = self.anchor.map(|a| a.coord);
                self.replace_results(rank(facilities, anchor.as_ref()));
                self.status = Status::Ok;
            }
            Err(SearchError::Empty) => {
                self.replace_results(Vec::new());
                self.status = Status::Error(StatusError::from(&SearchError::Empty));
            }
            Err(error) => {
                self.status = Status::Error(StatusError::from(&error));
            }
        }
        Vec::new()
    }

    fn replace_results(&mut self, results: Vec<Facility>) {
        self.results = results;
        self.selection = None;
    }
}

/// Order facilities by distance then name, keeping the first of each id.
///
/// Distances are re-measured against `anchor` when one is given.
pub fn rank(mut facilities: Vec<Facility>, anchor: Option<&Coord>) -> Vec<Facility> {
    if let Some(anchor) = anchor {
        for facility in &mut facilities {
            facility.distance_km = distance_km(anchor, &facility.coord);
        }
    }

    facilities.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut seen = HashSet::new();
    facilities.retain(|f| seen.insert(f.id));
    facilities
}

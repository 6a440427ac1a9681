//! Session runtime: executes controller effects and feeds completions back.
//!
//! A [`Session`] owns the [`Controller`] and everything with side effects:
//! the auth gate, the position source, the search client, and the watch
//! subscription. Every input (key presses, auth transitions, request
//! completions, watch fixes, and shutdown signals) arrives as a [`Message`]
//! on one channel and is processed on the thread that owns the session.
//!
//! Requests run on short-lived worker threads, one per effect. Nothing is
//! cancelled; a reply that arrives after a newer request was issued is
//! discarded by the controller's token check.

pub mod terminal;

use anyhow::Result;
use crossterm::event::KeyEvent;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender, channel};
use std::thread;

use crate::auth::AuthGate;
use crate::common::constants::FORWARD_GEOCODE_LIMIT;
use crate::config::Config;
use crate::discovery::{Controller, Effect, Event};
use crate::geo::{Coord, GeoError, GeoProvider, PositionOptions, WatchHandle, WatchSink};
use crate::presenter::{self, Action, ViewState};
use crate::search::PlaceSearch;

#[cfg(test)]
mod tests;

/// Input for the session loop.
#[derive(Debug)]
pub enum Message {
    Event(Event),
    Key(KeyEvent),
    /// Termination requested by a signal.
    Shutdown,
}

/// Whether the loop keeps going after a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Session {
    controller: Controller,
    view: ViewState,
    auth: AuthGate,
    geo: Arc<dyn GeoProvider>,
    search: Arc<dyn PlaceSearch>,
    acquire_options: PositionOptions,
    watch_options: PositionOptions,
    result_limit: usize,
    watch: Option<WatchHandle>,
    sender: Sender<Message>,
    receiver: Receiver<Message>,
    debug_enabled: bool,
}

impl Session {
    /// Wire a session together. Auth transitions are forwarded to the
    /// session channel from here on.
    pub fn new(
        config: &Config,
        auth: AuthGate,
        geo: Arc<dyn GeoProvider>,
        search: Arc<dyn PlaceSearch>,
        debug_enabled: bool,
    ) -> Self {
        let (sender, receiver) = channel();

        let auth_sender = sender.clone();
        auth.observe(move |state| {
            let _ = auth_sender.send(Message::Event(Event::AuthChanged(state.clone())));
        });

        Self {
            controller: Controller::new(config.follow_device()),
            view: ViewState::default(),
            auth,
            geo,
            search,
            acquire_options: config.acquire_options(),
            watch_options: config.watch_options(),
            result_limit: config.result_limit(),
            watch: None,
            sender,
            receiver,
            debug_enabled,
        }
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// A sender for feeding messages from other threads.
    pub fn sender(&self) -> Sender<Message> {
        self.sender.clone()
    }

    /// The watch subscription is active.
    pub fn is_watching(&self) -> bool {
        self.watch.is_some()
    }

    /// Lines for the current screen.
    pub fn render(&self) -> Vec<String> {
        presenter::render_screen(&self.controller, &self.view)
    }

    /// Block for the next message. `None` once every sender is gone.
    pub fn next_message(&self) -> Option<Message> {
        self.receiver.recv().ok()
    }

    pub fn process(&mut self, message: Message) -> Flow {
        match message {
            Message::Event(event) => {
                self.dispatch(event);
                Flow::Continue
            }
            Message::Key(key) => {
                let action = presenter::map_key(
                    key,
                    self.controller.auth().authenticated,
                    self.controller.query(),
                );
                self.apply(action)
            }
            Message::Shutdown => Flow::Quit,
        }
    }

    pub fn apply(&mut self, action: Action) -> Flow {
        match action {
            Action::Controller(event) => self.dispatch(event),
            Action::SignIn => self.sign_in(),
            Action::SignOut => self.sign_out(),
            Action::ToggleFilter => self.view.toggle_filter(),
            Action::SelectPrevious => self.step_selection(false),
            Action::SelectNext => self.step_selection(true),
            Action::Quit => return Flow::Quit,
            Action::None => {}
        }
        Flow::Continue
    }

    /// Move the selection through the facilities currently displayed.
    fn step_selection(&mut self, forward: bool) {
        let visible = presenter::visible_results(
            self.controller.results(),
            self.controller.query(),
            self.view.filter_enabled,
        );
        if let Some(id) = presenter::step_selection(&visible, self.controller.selection(), forward)
        {
            self.dispatch(Event::Selected(id));
        }
    }

    /// Ask the auth gate for a session. Success arrives later as an
    /// `AuthChanged` message; failure is reported immediately.
    pub fn sign_in(&mut self) {
        match self.auth.sign_in() {
            Ok(state) => {
                if self.debug_enabled {
                    log_pipe!();
                    log_debug!(
                        "Signed in through '{}' as {}",
                        self.auth.provider_name(),
                        state.user_id.as_deref().unwrap_or("unknown")
                    );
                }
            }
            Err(e) => {
                if self.debug_enabled {
                    log_pipe!();
                    log_debug!("{}", e);
                }
                self.dispatch(Event::SignInFailed(e.to_string()));
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.auth.sign_out();
    }

    /// Feed one event to the controller and start the resulting work.
    pub fn dispatch(&mut self, event: Event) {
        let effects = self.controller.handle(event);
        for effect in effects {
            self.run_effect(effect);
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        if self.debug_enabled {
            log_debug!("Effect: {:?}", effect);
        }

        match effect {
            Effect::AcquirePosition { token } => {
                let geo = Arc::clone(&self.geo);
                let options = self.acquire_options;
                let sender = self.sender.clone();
                thread::spawn(move || {
                    let result = geo.acquire(&options);
                    let _ = sender.send(Message::Event(Event::PositionAcquired { token, result }));
                });
            }
            Effect::ForwardGeocode { token, text } => {
                let search = Arc::clone(&self.search);
                let sender = self.sender.clone();
                thread::spawn(move || {
                    let result = search.forward_geocode(&text, FORWARD_GEOCODE_LIMIT);
                    let _ = sender.send(Message::Event(Event::GeocodeCompleted { token, result }));
                });
            }
            Effect::SearchNear {
                token,
                anchor,
                text,
            } => {
                let search = Arc::clone(&self.search);
                let limit = self.result_limit;
                let sender = self.sender.clone();
                thread::spawn(move || {
                    let result = search.search_near(&anchor, &text, limit);
                    let _ = sender.send(Message::Event(Event::SearchCompleted { token, result }));
                });
            }
            Effect::StartWatch => self.start_watch(),
            Effect::StopWatch => self.release_watch(),
        }
    }

    fn start_watch(&mut self) {
        self.release_watch();

        let sender = self.sender.clone();
        let debug_enabled = self.debug_enabled;
        let sink: WatchSink = Box::new(move |fix: Result<Coord, GeoError>| match fix {
            Ok(coord) => {
                let _ = sender.send(Message::Event(Event::DevicePositionUpdated(coord)));
            }
            Err(e) => {
                if debug_enabled {
                    log_debug!("Position watch error: {}", e);
                }
            }
        });

        match self.geo.watch(&self.watch_options, sink) {
            Ok(handle) => self.watch = Some(handle),
            Err(e) => {
                log_pipe!();
                log_error!("Could not follow the device position: {}", e);
            }
        }
    }

    fn release_watch(&mut self) {
        if let Some(handle) = self.watch.take() {
            self.geo.unwatch(handle);
        }
    }

    /// Process messages until signed in and no request is outstanding.
    ///
    /// With `place`, the query is submitted as soon as the session starts,
    /// superseding the device lookup.
    pub fn run_until_settled(&mut self, place: Option<&str>) -> Result<()> {
        let mut submitted = place.is_none();

        loop {
            if self.controller.auth().authenticated {
                if let Some(text) = place
                    && !submitted
                {
                    self.dispatch(Event::QueryEdited(text.to_string()));
                    self.dispatch(Event::SearchSubmitted);
                    submitted = true;
                }
                if self.controller.is_settled() {
                    return Ok(());
                }
            } else if self.controller.status().error().is_some() {
                // Sign-in failed
                return Ok(());
            }

            let Some(message) = self.next_message() else {
                anyhow::bail!("session channel closed");
            };
            if self.process(message) == Flow::Quit {
                anyhow::bail!("interrupted");
            }
        }
    }

    /// Sign in and run one discovery to completion.
    pub fn search_once(&mut self, place: Option<&str>) -> Result<()> {
        self.sign_in();
        self.run_until_settled(place)
    }

    /// Release everything scoped to the session.
    pub fn teardown(&mut self) {
        self.release_watch();
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.release_watch();
    }
}

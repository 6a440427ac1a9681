//! Terminal rendering of the discovery state.
//!
//! Everything here is a pure function of a [`Controller`] and the
//! presenter-only [`ViewState`]: renderers return lines of text and the
//! session decides where they go. The cosmetic name filter lives in
//! `ViewState` and never touches controller state.
//!
//! ## Module Structure
//!
//! - [`list`]: the facility list
//! - [`map`]: the character-cell map and info bubble
//! - [`keys`]: key events to session actions

pub mod keys;
pub mod list;
pub mod map;

pub use keys::{Action, map_key};

use crate::common::constants::{MAP_HEIGHT, MAP_WIDTH, MESSAGE_MANUAL_HINT};
use crate::discovery::{Controller, Status};
use crate::geo::AnchorSource;
use crate::search::{Facility, FacilityId};

const MARKER_DIGITS: &[u8] = b"123456789";
const MARKER_LETTERS: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const OVERFLOW_MARKER: char = '+';

/// Presenter-only state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ViewState {
    /// Hide facilities whose name does not contain the query text.
    pub filter_enabled: bool,
}

impl ViewState {
    pub fn toggle_filter(&mut self) {
        self.filter_enabled = !self.filter_enabled;
    }
}

/// Marker for the facility at `index` in display order: `1`-`9`, then `a`-`z`.
pub fn marker_for(index: usize) -> char {
    if let Some(digit) = MARKER_DIGITS.get(index) {
        return *digit as char;
    }
    MARKER_LETTERS
        .get(index - MARKER_DIGITS.len())
        .map(|letter| *letter as char)
        .unwrap_or(OVERFLOW_MARKER)
}

/// Facilities to display, in controller order.
///
/// With the filter on, only names containing `query` (case-insensitive) are
/// kept. A blank query shows everything.
pub fn visible_results<'a>(results: &'a [Facility], query: &str, filter: bool) -> Vec<&'a Facility> {
    let needle = query.trim().to_lowercase();
    if !filter || needle.is_empty() {
        return results.iter().collect();
    }
    results
        .iter()
        .filter(|facility| facility.name.to_lowercase().contains(&needle))
        .collect()
}

/// Facility to select after moving one step through `visible`.
///
/// Without a current selection, forward starts at the first facility and
/// backward at the last. Movement stops at either end.
pub fn step_selection(
    visible: &[&Facility],
    current: Option<FacilityId>,
    forward: bool,
) -> Option<FacilityId> {
    if visible.is_empty() {
        return None;
    }
    let last = visible.len() - 1;

    let position = current.and_then(|id| visible.iter().position(|f| f.id == id));
    let next = match (position, forward) {
        (None, true) => 0,
        (None, false) => last,
        (Some(index), true) => (index + 1).min(last),
        (Some(index), false) => index.saturating_sub(1),
    };
    Some(visible[next].id)
}

/// Query line, location chip with account, and status line.
pub fn header_lines(controller: &Controller, view: &ViewState) -> Vec<String> {
    let mut top = format!("Search: {}", controller.query());
    if let Some(anchor) = controller.anchor() {
        let chip = match anchor.source {
            AnchorSource::Device => "[Live Location]",
            AnchorSource::Manual => "[Manual Location]",
        };
        top.push_str("   ");
        top.push_str(chip);
    }

    let mut account = String::new();
    if let Some(user) = &controller.auth().user_id {
        account.push_str(&format!("Signed in as {user}"));
    }
    if view.filter_enabled {
        if !account.is_empty() {
            account.push_str("   ");
        }
        account.push_str("[Filter]");
    }

    let mut lines = vec![top];
    if !account.is_empty() {
        lines.push(account);
    }
    lines.extend(status_lines(controller.status(), controller.results().len()));
    lines
}

/// Human-readable status. Permanent errors add the manual entry hint.
pub fn status_lines(status: &Status, result_count: usize) -> Vec<String> {
    match status {
        Status::Idle => Vec::new(),
        Status::Loading => vec!["Loading...".to_string()],
        Status::Ok => {
            let noun = if result_count == 1 {
                "facility"
            } else {
                "facilities"
            };
            vec![format!("{result_count} {noun} found")]
        }
        Status::Error(error) => {
            let mut lines = vec![format!("Error: {}", error.message)];
            if error.permanent {
                lines.push(MESSAGE_MANUAL_HINT.to_string());
            }
            lines
        }
    }
}

/// Sign-in screen with the last sign-in failure, if any.
pub fn login_lines(controller: &Controller) -> Vec<String> {
    let mut lines = vec![
        "Hospital Locator".to_string(),
        String::new(),
        "Sign in to find hospitals near you.".to_string(),
        "Press Enter to sign in, Ctrl-C to quit".to_string(),
    ];
    if let Some(error) = controller.status().error() {
        lines.push(String::new());
        lines.push(format!("Error: {}", error.message));
    }
    lines
}

const FOOTER: &str = "Enter search · ↑/↓ select · Esc clear · Tab filter · Ctrl-R reload · Ctrl-O sign out · Ctrl-C quit";

/// Whole screen for the current state.
pub fn render_screen(controller: &Controller, view: &ViewState) -> Vec<String> {
    if !controller.auth().authenticated {
        return login_lines(controller);
    }

    let visible = visible_results(controller.results(), controller.query(), view.filter_enabled);
    let mut lines = header_lines(controller, view);

    if let Some(anchor) = controller.anchor() {
        lines.push(String::new());
        lines.extend(map::map_lines(
            anchor,
            &visible,
            controller.selection(),
            MAP_WIDTH,
            MAP_HEIGHT,
        ));
    }

    if let Some(facility) = controller.selected_facility() {
        lines.push(String::new());
        lines.extend(map::info_bubble(facility, MAP_WIDTH));
    }

    if !visible.is_empty() {
        lines.push(String::new());
        lines.extend(list::list_lines(&visible, controller.selection()));
    }

    lines.push(String::new());
    lines.push(FOOTER.to_string());
    lines
}

//! Key bindings.
//!
//! Keys become [`Action`]s. Most actions are controller events; the rest
//! (sign-in, filter, selection movement, quit) are handled by the session
//! because they need the auth gate or the presenter's view of the results.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::discovery::Event;

/// Result of a key press.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Controller(Event),
    SignIn,
    SignOut,
    ToggleFilter,
    SelectPrevious,
    SelectNext,
    Quit,
    None,
}

/// Map a key press to an action.
///
/// `query` is the current query text; edits produce the full new text.
pub fn map_key(key: KeyEvent, authenticated: bool, query: &str) -> Action {
    if key.kind != KeyEventKind::Press {
        return Action::None;
    }

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => Action::Quit,
            KeyCode::Char('r') if authenticated => Action::Controller(Event::Reload),
            KeyCode::Char('o') if authenticated => Action::SignOut,
            _ => Action::None,
        };
    }

    if !authenticated {
        return match key.code {
            KeyCode::Enter => Action::SignIn,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Char(c) => {
            let mut text = query.to_string();
            text.push(c);
            Action::Controller(Event::QueryEdited(text))
        }
        KeyCode::Backspace => {
            let mut text = query.to_string();
            if text.pop().is_none() {
                return Action::None;
            }
            Action::Controller(Event::QueryEdited(text))
        }
        KeyCode::Enter => Action::Controller(Event::SearchSubmitted),
        KeyCode::Up => Action::SelectPrevious,
        KeyCode::Down => Action::SelectNext,
        KeyCode::Esc => Action::Controller(Event::SelectionCleared),
        KeyCode::Tab => Action::ToggleFilter,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_typing_edits_query() {
        assert_eq!(
            map_key(press(KeyCode::Char('x')), true, "Bosto"),
            Action::Controller(Event::QueryEdited("Bostox".into()))
        );
        assert_eq!(
            map_key(
                KeyEvent::new(KeyCode::Char('B'), KeyModifiers::SHIFT),
                true,
                ""
            ),
            Action::Controller(Event::QueryEdited("B".into()))
        );
        assert_eq!(
            map_key(press(KeyCode::Backspace), true, "ab"),
            Action::Controller(Event::QueryEdited("a".into()))
        );
        assert_eq!(map_key(press(KeyCode::Backspace), true, ""), Action::None);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(
            map_key(press(KeyCode::Enter), true, ""),
            Action::Controller(Event::SearchSubmitted)
        );
        assert_eq!(map_key(press(KeyCode::Up), true, ""), Action::SelectPrevious);
        assert_eq!(map_key(press(KeyCode::Down), true, ""), Action::SelectNext);
        assert_eq!(
            map_key(press(KeyCode::Esc), true, ""),
            Action::Controller(Event::SelectionCleared)
        );
        assert_eq!(map_key(press(KeyCode::Tab), true, ""), Action::ToggleFilter);
    }

    #[test]
    fn test_control_keys() {
        assert_eq!(map_key(ctrl('c'), true, ""), Action::Quit);
        assert_eq!(map_key(ctrl('c'), false, ""), Action::Quit);
        assert_eq!(
            map_key(ctrl('r'), true, ""),
            Action::Controller(Event::Reload)
        );
        assert_eq!(map_key(ctrl('o'), true, ""), Action::SignOut);
        assert_eq!(map_key(ctrl('x'), true, ""), Action::None);
    }

    #[test]
    fn test_login_screen_only_signs_in() {
        assert_eq!(map_key(press(KeyCode::Enter), false, ""), Action::SignIn);
        assert_eq!(map_key(press(KeyCode::Char('a')), false, ""), Action::None);
        assert_eq!(map_key(ctrl('r'), false, ""), Action::None);
        assert_eq!(map_key(ctrl('o'), false, ""), Action::None);
    }

    #[test]
    fn test_release_events_ignored() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert_eq!(map_key(release, true, ""), Action::None);
    }
}

mod chat;
mod key_action;

pub use key_action::KeyAction;

use crate::state::{AppState, View};

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

use self::chat::handle_chat_key;

/// Event handler for the TUI application
pub struct EventHandler;

impl EventHandler {
    /// Read a single event from the terminal, waiting at most `timeout`
    ///
    /// Returns `None` on timeout. Terminal errors are logged and swallowed;
    /// a dead terminal surfaces on the next draw.
    pub fn read(timeout: Duration) -> Option<Event> {
        match crossterm::event::poll(timeout) {
            Ok(true) => match crossterm::event::read() {
                Ok(event) => Some(event),
                Err(e) => {
                    tracing::error!(error = %e, "Terminal read error");
                    None
                }
            },
            Ok(false) => None,
            Err(e) => {
                tracing::error!(error = %e, "Event poll error");
                None
            }
        }
    }

    /// Handle a keyboard event
    pub fn handle_key_event(event: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        if state.has_alert() {
            return Some(KeyAction::DismissAlert);
        }

        match state.view {
            View::Login => handle_login_key(event, state),
            View::Chat => handle_chat_key(event, state),
        }
    }

    pub fn handle_event(event: &Event, state: &mut AppState) -> Option<KeyAction> {
        match event {
            Event::Key(key_event) => Self::handle_key_event(*key_event, state),
            Event::Paste(text) if state.view == View::Chat && state.controls.input_enabled => {
                text.chars().for_each(|c| state.input.insert_char(c));
                None
            }
            _ => None,
        }
    }
}

fn handle_login_key(event: KeyEvent, state: &AppState) -> Option<KeyAction> {
    match event.code {
        KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('c') if event.modifiers.contains(KeyModifiers::CONTROL) => Some(KeyAction::Quit),
        KeyCode::Enter => state.login.enabled.then_some(KeyAction::Login),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::LoginState;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn chat_state(mic_visible: bool) -> AppState {
        let mut state = AppState::new(LoginState::available(), mic_visible, "gemini");
        state.view = View::Chat;
        state
    }

    #[test]
    fn test_login_enter() {
        let mut state = AppState::default();
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Enter), &mut state), Some(KeyAction::Login));
    }

    #[test]
    fn test_login_disabled_without_credential() {
        let mut state = AppState::new(LoginState::blocked("missing"), false, "gemini");
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Enter), &mut state), None);
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Esc), &mut state), Some(KeyAction::Quit));
    }

    #[test]
    fn test_typing_and_submit() {
        let mut state = chat_state(false);
        for c in "Hi".chars() {
            assert_eq!(EventHandler::handle_key_event(key(KeyCode::Char(c)), &mut state), None);
        }
        assert_eq!(state.input.buffer, "Hi");
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Enter), &mut state), Some(KeyAction::Submit));
    }

    #[test]
    fn test_shift_enter_inserts_newline() {
        let mut state = chat_state(false);
        state.input.set("a");
        let event = KeyEvent::new(KeyCode::Enter, KeyModifiers::SHIFT);
        assert_eq!(EventHandler::handle_key_event(event, &mut state), None);
        assert_eq!(state.input.buffer, "a\n");

        let event = KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT);
        assert_eq!(EventHandler::handle_key_event(event, &mut state), None);
        assert_eq!(state.input.buffer, "a\n\n");
    }

    #[test]
    fn test_locked_controls_ignore_input() {
        let mut state = chat_state(true);
        state.controls.lock();

        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Char('x')), &mut state), None);
        assert_eq!(EventHandler::handle_key_event(key(KeyCode::Enter), &mut state), None);
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);
        assert_eq!(EventHandler::handle_key_event(ctrl_r, &mut state), None);
        assert!(state.input.buffer.is_empty());

        assert_eq!(EventHandler::handle_key_event(key(KeyCode::PageUp), &mut state), Some(KeyAction::ScrollUp));
    }

    #[test]
    fn test_mic_toggle_requires_visible_mic() {
        let ctrl_r = KeyEvent::new(KeyCode::Char('r'), KeyModifiers::CONTROL);

        let mut hidden = chat_state(false);
        assert_eq!(EventHandler::handle_key_event(ctrl_r, &mut hidden), None);

        let mut visible = chat_state(true);
        assert_eq!(EventHandler::handle_key_event(ctrl_r, &mut visible), Some(KeyAction::ToggleMic));
    }

    #[test]
    fn test_alert_swallows_keys() {
        let mut state = chat_state(false);
        state.show_alert("boom");
        assert_eq!(
            EventHandler::handle_key_event(key(KeyCode::Char('x')), &mut state),
            Some(KeyAction::DismissAlert)
        );
        assert!(state.input.buffer.is_empty());
    }

    #[test]
    fn test_release_events_ignored() {
        let mut state = AppState::default();
        let mut event = key(KeyCode::Enter);
        event.kind = KeyEventKind::Release;
        assert_eq!(EventHandler::handle_key_event(event, &mut state), None);
    }

    #[test]
    fn test_paste_inserts_text() {
        let mut state = chat_state(false);
        let action = EventHandler::handle_event(&Event::Paste("pasted".to_string()), &mut state);
        assert_eq!(action, None);
        assert_eq!(state.input.buffer, "pasted");
    }
}

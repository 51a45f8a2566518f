use super::KeyAction;
use crate::state::AppState;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Keys on the chat screen. Editing keys mutate the composer directly.
pub(super) fn handle_chat_key(event: KeyEvent, state: &mut AppState) -> Option<KeyAction> {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);

    match event.code {
        KeyCode::Esc => Some(KeyAction::Quit),
        KeyCode::Char('c') if ctrl => Some(KeyAction::Quit),
        KeyCode::Char('r') if ctrl => state.controls.mic_usable().then_some(KeyAction::ToggleMic),
        KeyCode::PageUp => Some(KeyAction::ScrollUp),
        KeyCode::PageDown => Some(KeyAction::ScrollDown),
        KeyCode::Enter if event.modifiers.intersects(KeyModifiers::SHIFT | KeyModifiers::ALT) => {
            if state.controls.input_enabled {
                state.input.insert_newline();
            }
            None
        }
        KeyCode::Enter => state.controls.send_enabled.then_some(KeyAction::Submit),
        _ if !state.controls.input_enabled => None,
        KeyCode::Char(c) if !ctrl => {
            state.input.insert_char(c);
            None
        }
        KeyCode::Backspace => {
            state.input.backspace();
            None
        }
        KeyCode::Delete => {
            state.input.delete();
            None
        }
        KeyCode::Left => {
            state.input.move_left();
            None
        }
        KeyCode::Right => {
            state.input.move_right();
            None
        }
        KeyCode::Home => {
            state.input.move_home();
            None
        }
        KeyCode::End => {
            state.input.move_end();
            None
        }
        _ => None,
    }
}

mod controls;
mod input;

pub use controls::Controls;
pub use input::InputState;

/// Which screen is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Login,
    Chat,
}

/// Login screen state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginState {
    pub enabled: bool,
    /// Shown instead of the login prompt when login is unavailable
    pub diagnostic: Option<String>,
}

impl LoginState {
    pub fn available() -> Self {
        Self { enabled: true, diagnostic: None }
    }

    pub fn blocked(diagnostic: impl Into<String>) -> Self {
        Self { enabled: false, diagnostic: Some(diagnostic.into()) }
    }
}

/// Main application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub login: LoginState,
    pub input: InputState,
    pub controls: Controls,
    /// Blocking alert; any key dismisses it
    pub alert: Option<String>,
    /// Provider/model label for the header
    pub model_label: String,
    /// Render ticks, drives the typing indicator
    pub tick: u64,
    pub should_quit: bool,
}

impl AppState {
    pub fn new(login: LoginState, mic_visible: bool, model_label: impl Into<String>) -> Self {
        Self {
            view: View::Login,
            login,
            input: InputState::new(),
            controls: Controls::new(mic_visible),
            alert: None,
            model_label: model_label.into(),
            tick: 0,
            should_quit: false,
        }
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
    }

    pub fn dismiss_alert(&mut self) -> bool {
        self.alert.take().is_some()
    }

    pub fn has_alert(&self) -> bool {
        self.alert.is_some()
    }

    pub fn advance_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }

    pub fn is_chat(&self) -> bool {
        self.view == View::Chat
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(LoginState::available(), false, "gemini")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_state_starts_on_login() {
        let state = AppState::default();
        assert_eq!(state.view, View::Login);
        assert!(state.login.enabled);
        assert!(!state.has_alert());
        assert!(!state.controls.mic_visible);
    }

    #[test]
    fn test_blocked_login() {
        let login = LoginState::blocked("no key");
        assert!(!login.enabled);
        assert_eq!(login.diagnostic.as_deref(), Some("no key"));
    }

    #[test]
    fn test_alert_dismissal() {
        let mut state = AppState::default();
        state.show_alert("Microphone access was denied.");
        assert!(state.has_alert());
        assert!(state.dismiss_alert());
        assert!(!state.dismiss_alert());
    }
}

mod event_loop;
mod rendering;

pub use event_loop::run;

use crate::event_handler::{EventHandler, KeyAction};
use crate::state::{AppState, LoginState, View};
use crate::transcript::{BubbleId, Sender, Transcript};

use crossterm::event::Event;
use lumen_core::{Config, Error};
use lumen_providers::Provider;
use lumen_session::{ChatSessionManager, ReplyStream, SessionSettings};
use lumen_voice::{VoiceEvent, VoiceInput};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Text of the bubble shown when a reply fails
pub const ERROR_TEXT: &str = "An error occurred while contacting the assistant. Please check the logs for details.";

/// Lines moved per PageUp/PageDown
const SCROLL_STEP: usize = 5;

/// Startup settings for the chat UI
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub session: SessionSettings,
    pub greeting_prompt: String,
    pub greeting_delay: Duration,
    /// `provider/model` shown in the header
    pub model_label: String,
}

impl AppSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            session: SessionSettings::from_config(config),
            greeting_prompt: config.assistant.greeting_prompt.clone(),
            greeting_delay: config.assistant.greeting_delay(),
            model_label: format!("{}/{}", config.provider.name(), config.provider.model()),
        }
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

/// Progress of the reply in flight
#[derive(Debug)]
pub enum TurnUpdate {
    Fragment(String),
    Completed,
    Failed(Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TurnKind {
    User,
    Greeting,
}

struct ActiveTurn {
    bubble: BubbleId,
    reply: ReplyStream,
    text: String,
}

/// Chat UI controller
///
/// Owns the screen state, the transcript, the session manager and the voice
/// adapter. All mutation happens on the event loop.
pub struct App {
    state: AppState,
    transcript: Transcript,
    settings: AppSettings,
    /// `None` when no provider could be built; login is blocked then
    session: Option<ChatSessionManager>,
    voice: VoiceInput,
    turn: Option<ActiveTurn>,
    greeting_at: Option<Instant>,
}

impl App {
    /// Build the controller. `provider` carries the login diagnostic when the
    /// provider is unavailable.
    pub fn new(settings: AppSettings, provider: Result<Arc<dyn Provider>, String>, voice: VoiceInput) -> Self {
        let (login, session) = match provider {
            Ok(provider) => (LoginState::available(), Some(ChatSessionManager::new(provider, settings.session.clone()))),
            Err(diagnostic) => {
                tracing::warn!(%diagnostic, "Login disabled");
                (LoginState::blocked(diagnostic), None)
            }
        };

        let state = AppState::new(login, voice.is_available(), settings.model_label.clone());
        Self { state, transcript: Transcript::new(), settings, session, voice, turn: None, greeting_at: None }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut AppState {
        &mut self.state
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn session(&self) -> Option<&ChatSessionManager> {
        self.session.as_ref()
    }

    pub fn is_turn_active(&self) -> bool {
        self.turn.is_some()
    }

    pub fn greeting_pending(&self) -> bool {
        self.greeting_at.is_some()
    }

    pub fn should_quit(&self) -> bool {
        self.state.should_quit
    }

    /// Login view → chat view. Creates the session and schedules the greeting.
    pub fn login(&mut self) {
        if !self.state.login.enabled || self.state.view == View::Chat {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };

        session.ensure_session();
        self.state.view = View::Chat;
        self.greeting_at = Some(Instant::now() + self.settings.greeting_delay);
        tracing::info!(delay_ms = self.settings.greeting_delay.as_millis() as u64, "Logged in");
    }

    /// Send the composer contents as a user turn
    pub fn submit(&mut self) {
        if self.state.view != View::Chat || !self.state.controls.send_enabled || self.turn.is_some() {
            return;
        }
        if self.state.input.is_blank() {
            return;
        }

        let message = self.state.input.take().trim().to_string();
        self.begin_turn(&message, TurnKind::User);
    }

    /// Run the greeting turn if it is still scheduled
    pub fn fire_greeting(&mut self) {
        if self.greeting_at.take().is_none() {
            return;
        }
        if self.turn.is_some() {
            tracing::info!("Skipping greeting: a reply is already streaming");
            return;
        }

        let prompt = self.settings.greeting_prompt.clone();
        self.begin_turn(&prompt, TurnKind::Greeting);
    }

    fn begin_turn(&mut self, message: &str, kind: TurnKind) {
        self.state.controls.lock();

        if kind == TurnKind::User {
            self.transcript.append_message(Sender::User, Some(message));
            self.state.input.clear();
        }

        let bubble = self.transcript.show_typing();
        tracing::debug!(?kind, "Turn started");

        let reply = match self.session.as_mut() {
            Some(session) => session.send_and_stream(message),
            None => Err(Error::Config("no provider configured".to_string())),
        };

        match reply {
            Ok(reply) => self.turn = Some(ActiveTurn { bubble, reply, text: String::new() }),
            Err(e) => self.fail_turn(bubble, &e),
        }
    }

    /// Apply one update from the reply in flight
    pub fn apply_turn_update(&mut self, update: TurnUpdate) {
        let Some(turn) = self.turn.as_mut() else {
            return;
        };

        match update {
            TurnUpdate::Fragment(fragment) => {
                turn.text.push_str(&fragment);
                self.transcript.update_text(turn.bubble, &turn.text);
            }
            TurnUpdate::Completed => {
                self.transcript.finish(turn.bubble);
                tracing::debug!(chars = turn.text.chars().count(), "Turn completed");
                self.end_turn();
            }
            TurnUpdate::Failed(e) => {
                let bubble = turn.bubble;
                self.fail_turn(bubble, &e);
            }
        }
    }

    fn fail_turn(&mut self, bubble: BubbleId, error: &Error) {
        tracing::error!(error = %error, "Assistant reply failed");
        self.transcript.update_text(bubble, ERROR_TEXT);
        self.transcript.mark_error(bubble);
        self.end_turn();
    }

    fn end_turn(&mut self) {
        self.turn = None;
        self.state.controls.unlock();
    }

    /// Start or stop dictation from the mic control
    pub fn toggle_mic(&mut self) {
        if !self.state.controls.mic_usable() {
            return;
        }

        if let Err(e) = self.voice.toggle() {
            self.state.show_alert(e.to_string());
        }
        self.state.controls.listening = self.voice.is_listening();
    }

    pub fn handle_voice_event(&mut self, event: VoiceEvent) {
        match event {
            VoiceEvent::Started => self.state.controls.listening = true,
            VoiceEvent::Result(text) => {
                self.state.controls.listening = self.voice.is_listening();
                self.state.input.set(&text);
                self.submit();
            }
            VoiceEvent::Error(e) => {
                self.state.controls.listening = false;
                self.state.show_alert(e.to_string());
            }
            VoiceEvent::Ended => self.state.controls.listening = false,
        }
    }

    pub fn handle_event(&mut self, event: &Event) {
        if let Some(action) = EventHandler::handle_event(event, &mut self.state) {
            self.handle_action(action);
        }
    }

    pub fn handle_action(&mut self, action: KeyAction) {
        match action {
            KeyAction::Login => self.login(),
            KeyAction::Submit => self.submit(),
            KeyAction::ToggleMic => self.toggle_mic(),
            KeyAction::ScrollUp => self.transcript.scroll_up(SCROLL_STEP),
            KeyAction::ScrollDown => self.transcript.scroll_down(SCROLL_STEP),
            KeyAction::DismissAlert => {
                self.state.dismiss_alert();
            }
            KeyAction::Quit => self.state.should_quit = true,
        }
    }

    /// Advance animations
    pub fn tick(&mut self) {
        self.state.advance_tick();
    }

    /// Drive the reply in flight until it completes or fails
    pub async fn wait_for_reply(&mut self) {
        while self.turn.is_some() {
            let update = next_turn_update(&mut self.turn).await;
            self.apply_turn_update(update);
        }
    }

    /// Wait for the greeting timer and run the greeting
    pub async fn wait_for_greeting(&mut self) {
        if self.greeting_at.is_none() {
            return;
        }
        greeting_due(self.greeting_at).await;
        self.fire_greeting();
    }

    /// Wait for the next voice event and apply it
    pub async fn process_voice_event(&mut self) {
        let event = self.voice.recv().await;
        self.handle_voice_event(event);
    }

    /// Release background work before exit
    pub fn shutdown(&mut self) {
        if let Some(session) = &self.session {
            session.cancel();
        }
        self.voice.stop();
        self.state.controls.listening = false;
    }
}

/// Next update of the reply in flight; pending while no reply is active
async fn next_turn_update(turn: &mut Option<ActiveTurn>) -> TurnUpdate {
    let Some(turn) = turn.as_mut() else {
        return std::future::pending().await;
    };

    match turn.reply.next().await {
        Some(Ok(fragment)) => TurnUpdate::Fragment(fragment),
        Some(Err(e)) => TurnUpdate::Failed(e),
        None => TurnUpdate::Completed,
    }
}

/// Resolves when the greeting is due; pending while none is scheduled
async fn greeting_due(at: Option<Instant>) {
    match at {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transcript::BubbleStatus;
    use lumen_providers::{MockProvider, MockResponse};
    use lumen_voice::testing::ScriptedEngine;
    use lumen_voice::VoiceInputError;

    fn settings() -> AppSettings {
        AppSettings { greeting_delay: Duration::from_millis(10), ..AppSettings::default() }
    }

    fn app_with(responses: Vec<MockResponse>) -> App {
        let provider: Arc<dyn Provider> = Arc::new(MockProvider::from_responses(responses));
        App::new(settings(), Ok(provider), VoiceInput::disabled())
    }

    fn logged_in(responses: Vec<MockResponse>) -> App {
        let mut app = app_with(responses);
        app.login();
        app.greeting_at = None;
        app
    }

    fn text(content: &str) -> MockResponse {
        MockResponse::Text { content: content.to_string() }
    }

    #[test]
    fn test_missing_provider_blocks_login() {
        let mut app = App::new(settings(), Err("API Key is missing.".to_string()), VoiceInput::disabled());
        assert!(!app.state().login.enabled);

        app.login();
        assert_eq!(app.state().view, View::Login);
        assert!(!app.greeting_pending());
    }

    #[tokio::test]
    async fn test_login_schedules_greeting() {
        let mut app = app_with(vec![]);
        app.login();

        assert_eq!(app.state().view, View::Chat);
        assert!(app.session().is_some_and(|s| s.has_session()));
        assert!(app.greeting_pending());
        assert!(app.transcript().is_empty());
    }

    #[tokio::test]
    async fn test_submit_runs_lifecycle() {
        let mut app = logged_in(vec![text("Hi there")]);
        app.state_mut().input.set("Hello");
        app.submit();

        assert!(app.state().controls.is_locked());
        assert!(!app.state().controls.input_enabled);
        assert!(app.state().input.buffer.is_empty());
        assert_eq!(app.transcript().len(), 2);
        assert!(app.transcript().last().unwrap().is_loading());

        app.wait_for_reply().await;

        let bubbles = app.transcript().bubbles();
        assert_eq!(bubbles[0].content, "Hello");
        assert_eq!(bubbles[1].content, "Hi there");
        assert_eq!(bubbles[1].status, BubbleStatus::Normal);
        assert!(app.state().controls.send_enabled && app.state().controls.input_enabled);
    }

    #[tokio::test]
    async fn test_blank_submission_ignored() {
        let mut app = logged_in(vec![]);
        app.state_mut().input.set("   \n ");
        app.submit();
        assert!(app.transcript().is_empty());
        assert!(!app.state().controls.is_locked());
    }

    #[tokio::test]
    async fn test_submission_ignored_while_in_flight() {
        let mut app = logged_in(vec![text("first"), text("second")]);
        app.state_mut().input.set("one");
        app.submit();
        app.state_mut().input.set("two");
        app.submit();

        assert_eq!(app.transcript().count_from(Sender::User), 1);
        app.wait_for_reply().await;
        assert_eq!(app.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_failure_shows_error_bubble() {
        let mut app = logged_in(vec![MockResponse::Error { message: "quota exceeded".to_string() }]);
        app.state_mut().input.set("Hello");
        app.submit();
        app.wait_for_reply().await;

        let last = app.transcript().last().unwrap();
        assert_eq!(last.content, ERROR_TEXT);
        assert!(last.is_error());
        assert!(!app.state().controls.is_locked());
    }

    #[tokio::test]
    async fn test_greeting_turn_has_no_user_bubble() {
        let mut app = app_with(vec![text("Greetings, traveler.")]);
        app.login();
        app.wait_for_greeting().await;
        app.wait_for_reply().await;

        assert_eq!(app.transcript().len(), 1);
        assert_eq!(app.transcript().count_from(Sender::User), 0);
        assert_eq!(app.transcript().last().unwrap().content, "Greetings, traveler.");
        assert!(!app.greeting_pending());
    }

    #[tokio::test]
    async fn test_greeting_skipped_during_turn() {
        let mut app = app_with(vec![text("reply")]);
        app.login();
        app.state_mut().input.set("quick");
        app.submit();

        app.fire_greeting();
        assert!(!app.greeting_pending());
        app.wait_for_reply().await;
        assert_eq!(app.transcript().len(), 2);
    }

    #[tokio::test]
    async fn test_mic_toggle_without_capability() {
        let mut app = logged_in(vec![]);
        let before = app.state().controls;

        app.toggle_mic();
        app.toggle_mic();

        assert_eq!(app.state().controls, before);
        assert!(!app.state().has_alert());
    }

    #[tokio::test]
    async fn test_voice_result_is_submitted() {
        let (engine, handle) = ScriptedEngine::new();
        let provider: Arc<dyn Provider> = Arc::new(MockProvider::from_responses(vec![text("Sure")]));
        let mut app = App::new(settings(), Ok(provider), VoiceInput::new(Box::new(engine)));
        app.login();
        app.greeting_at = None;

        app.toggle_mic();
        assert!(app.state().controls.listening);
        app.process_voice_event().await;

        handle.final_result("what time is it");
        app.process_voice_event().await;

        assert_eq!(app.transcript().bubbles()[0].content, "what time is it");
        assert!(app.is_turn_active());
        app.wait_for_reply().await;
        assert_eq!(app.transcript().last().unwrap().content, "Sure");
    }

    #[tokio::test]
    async fn test_voice_error_shows_alert() {
        let (engine, handle) = ScriptedEngine::new();
        let provider: Arc<dyn Provider> = Arc::new(MockProvider::from_responses(vec![]));
        let mut app = App::new(settings(), Ok(provider), VoiceInput::new(Box::new(engine)));
        app.login();

        app.toggle_mic();
        app.process_voice_event().await;
        handle.error("not-allowed");
        app.process_voice_event().await;

        assert_eq!(app.state().alert.as_deref(), Some(VoiceInputError::PermissionDenied.to_string().as_str()));
        assert!(!app.state().controls.listening);

        app.handle_action(KeyAction::DismissAlert);
        assert!(!app.state().has_alert());
    }

    #[tokio::test]
    async fn test_failed_start_shows_alert() {
        let (engine, _handle) = ScriptedEngine::failing();
        let provider: Arc<dyn Provider> = Arc::new(MockProvider::from_responses(vec![]));
        let mut app = App::new(settings(), Ok(provider), VoiceInput::new(Box::new(engine)));
        app.login();

        app.toggle_mic();
        assert_eq!(app.state().alert.as_deref(), Some(VoiceInputError::StartFailed.to_string().as_str()));
        assert!(!app.state().controls.listening);
    }

    #[tokio::test]
    async fn test_quit_action() {
        let mut app = app_with(vec![]);
        app.handle_action(KeyAction::Quit);
        assert!(app.should_quit());
        app.shutdown();
    }
}

use tokio::sync::mpsc;

use crate::engine::{EngineEvent, NullEngine, SpeechEngine};
use crate::error::VoiceInputError;

/// Adapter state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VoiceState {
    #[default]
    Idle,
    Listening,
}

impl std::fmt::Display for VoiceState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceState::Idle => write!(f, "Idle"),
            VoiceState::Listening => write!(f, "Listening"),
        }
    }
}

/// Events surfaced to the UI
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEvent {
    Started,
    /// A finalized, non-blank utterance
    Result(String),
    /// Recognition failed; the adapter is back to Idle
    Error(VoiceInputError),
    /// The engine ended on its own; the adapter is back to Idle
    Ended,
}

/// Idle/Listening wrapper around a [`SpeechEngine`].
///
/// Each `start` opens a fresh event channel, so events from a recognition
/// run that was already stopped never reach the UI.
pub struct VoiceInput {
    engine: Box<dyn SpeechEngine>,
    available: bool,
    state: VoiceState,
    events: Option<mpsc::UnboundedReceiver<EngineEvent>>,
}

impl VoiceInput {
    pub fn new(engine: Box<dyn SpeechEngine>) -> Self {
        let available = engine.is_available();
        if !available {
            tracing::info!("Speech recognition unavailable; voice input disabled");
        }
        Self { engine, available, state: VoiceState::Idle, events: None }
    }

    /// Inert adapter with no recognition capability
    pub fn disabled() -> Self {
        Self::new(Box::new(NullEngine))
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn state(&self) -> VoiceState {
        self.state
    }

    pub fn is_listening(&self) -> bool {
        self.state == VoiceState::Listening
    }

    /// Idle → Listening. A no-op when unavailable or already listening.
    pub fn start(&mut self) -> Result<(), VoiceInputError> {
        if !self.available || self.is_listening() {
            return Ok(());
        }

        let (tx, rx) = mpsc::unbounded_channel();
        match self.engine.start(tx) {
            Ok(()) => {
                tracing::debug!("Voice recognition started");
                self.events = Some(rx);
                self.state = VoiceState::Listening;
                Ok(())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Voice recognition failed to start");
                Err(VoiceInputError::StartFailed)
            }
        }
    }

    /// Listening → Idle
    pub fn stop(&mut self) {
        if self.is_listening() {
            self.engine.stop();
            tracing::debug!("Voice recognition stopped");
        }
        self.state = VoiceState::Idle;
        self.events = None;
    }

    /// Start when Idle, stop when Listening
    pub fn toggle(&mut self) -> Result<(), VoiceInputError> {
        if self.is_listening() {
            self.stop();
            Ok(())
        } else {
            self.start()
        }
    }

    /// Wait for the next event worth showing. Pending while no recognition
    /// run is active.
    pub async fn recv(&mut self) -> VoiceEvent {
        loop {
            let Some(events) = self.events.as_mut() else {
                return std::future::pending().await;
            };

            match events.recv().await {
                Some(event) => {
                    if let Some(out) = self.handle_engine_event(event) {
                        return out;
                    }
                }
                None => {
                    self.events = None;
                    if self.is_listening() {
                        self.state = VoiceState::Idle;
                        return VoiceEvent::Ended;
                    }
                }
            }
        }
    }

    fn handle_engine_event(&mut self, event: EngineEvent) -> Option<VoiceEvent> {
        match event {
            EngineEvent::Started => self.is_listening().then_some(VoiceEvent::Started),
            EngineEvent::Result { transcript, is_final } => {
                let text = transcript.trim();
                if !self.is_listening() || !is_final || text.is_empty() {
                    return None;
                }
                Some(VoiceEvent::Result(text.to_string()))
            }
            EngineEvent::Error(code) => {
                tracing::warn!(code = %code, "Voice recognition error");
                if self.is_listening() {
                    self.engine.stop();
                }
                self.state = VoiceState::Idle;
                self.events = None;
                Some(VoiceEvent::Error(VoiceInputError::from_code(&code)))
            }
            EngineEvent::Ended => {
                if !self.is_listening() {
                    return None;
                }
                self.state = VoiceState::Idle;
                self.events = None;
                Some(VoiceEvent::Ended)
            }
        }
    }
}

impl Drop for VoiceInput {
    fn drop(&mut self) {
        if self.is_listening() {
            self.engine.stop();
        }
    }
}

use tokio::sync::mpsc;

use crate::error::VoiceInputError;

/// Raw notifications from a recognition engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Started,
    /// A recognized utterance; interim guesses have `is_final == false`
    Result { transcript: String, is_final: bool },
    /// Error code such as `not-allowed` or `audio-capture`
    Error(String),
    Ended,
}

/// A speech-recognition capability with start/stop semantics.
///
/// `start` must return quickly; recognition runs in the background and
/// reports through `events` until `stop` is called or the engine ends.
pub trait SpeechEngine: Send {
    fn is_available(&self) -> bool;

    fn start(&mut self, events: mpsc::UnboundedSender<EngineEvent>) -> Result<(), VoiceInputError>;

    fn stop(&mut self);
}

/// Engine used when no recognizer is configured
#[derive(Debug, Default)]
pub struct NullEngine;

impl SpeechEngine for NullEngine {
    fn is_available(&self) -> bool {
        false
    }

    fn start(&mut self, _events: mpsc::UnboundedSender<EngineEvent>) -> Result<(), VoiceInputError> {
        Err(VoiceInputError::StartFailed)
    }

    fn stop(&mut self) {}
}

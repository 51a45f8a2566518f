//! Scripted engine for driving [`VoiceInput`](crate::VoiceInput) without a
//! microphone.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

use crate::engine::{EngineEvent, SpeechEngine};
use crate::error::VoiceInputError;

#[derive(Debug, Default)]
struct Shared {
    sender: Mutex<Option<mpsc::UnboundedSender<EngineEvent>>>,
    starts: AtomicUsize,
    stops: AtomicUsize,
}

/// Engine whose events are pushed by the test through a [`ScriptedEngineHandle`]
#[derive(Debug)]
pub struct ScriptedEngine {
    available: bool,
    fail_start: bool,
    shared: Arc<Shared>,
}

/// Test-side handle of a [`ScriptedEngine`]
#[derive(Debug, Clone)]
pub struct ScriptedEngineHandle {
    shared: Arc<Shared>,
}

impl ScriptedEngine {
    pub fn new() -> (Self, ScriptedEngineHandle) {
        let shared = Arc::new(Shared::default());
        let handle = ScriptedEngineHandle { shared: Arc::clone(&shared) };
        (Self { available: true, fail_start: false, shared }, handle)
    }

    pub fn unavailable() -> (Self, ScriptedEngineHandle) {
        let (engine, handle) = Self::new();
        (Self { available: false, ..engine }, handle)
    }

    /// Engine that rejects every start
    pub fn failing() -> (Self, ScriptedEngineHandle) {
        let (engine, handle) = Self::new();
        (Self { fail_start: true, ..engine }, handle)
    }
}

impl SpeechEngine for ScriptedEngine {
    fn is_available(&self) -> bool {
        self.available
    }

    fn start(&mut self, events: mpsc::UnboundedSender<EngineEvent>) -> Result<(), VoiceInputError> {
        if self.fail_start {
            return Err(VoiceInputError::StartFailed);
        }
        self.shared.starts.fetch_add(1, Ordering::SeqCst);
        let _ = events.send(EngineEvent::Started);
        if let Ok(mut sender) = self.shared.sender.lock() {
            *sender = Some(events);
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.stops.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut sender) = self.shared.sender.lock() {
            sender.take();
        }
    }
}

impl ScriptedEngineHandle {
    /// Deliver an event as if the engine produced it. Returns false when the
    /// engine is not running.
    pub fn emit(&self, event: EngineEvent) -> bool {
        self.shared
            .sender
            .lock()
            .ok()
            .and_then(|sender| sender.as_ref().map(|tx| tx.send(event).is_ok()))
            .unwrap_or(false)
    }

    pub fn final_result(&self, transcript: &str) -> bool {
        self.emit(EngineEvent::Result { transcript: transcript.to_string(), is_final: true })
    }

    pub fn interim_result(&self, transcript: &str) -> bool {
        self.emit(EngineEvent::Result { transcript: transcript.to_string(), is_final: false })
    }

    pub fn error(&self, code: &str) -> bool {
        self.emit(EngineEvent::Error(code.to_string()))
    }

    pub fn starts(&self) -> usize {
        self.shared.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.shared.stops.load(Ordering::SeqCst)
    }

    pub fn is_running(&self) -> bool {
        self.shared.sender.lock().map(|sender| sender.is_some()).unwrap_or(false)
    }
}

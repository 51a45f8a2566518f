//! Voice dictation for Lumen.
//!
//! - [`SpeechEngine`]: a recognition capability with start/stop semantics that
//!   reports [`EngineEvent`]s over a channel
//! - [`VoiceInput`]: the Idle/Listening adapter the UI talks to; it keeps only
//!   finalized utterances and turns engine errors into [`VoiceInputError`]s
//! - [`WhisperEngine`]: records with sox (`rec`) and transcribes with
//!   `whisper-cli` from whisper.cpp

mod adapter;
mod engine;
mod error;
#[cfg(any(test, feature = "testing"))]
pub mod testing;
mod whisper;

pub use adapter::{VoiceEvent, VoiceInput, VoiceState};
pub use engine::{EngineEvent, NullEngine, SpeechEngine};
pub use error::VoiceInputError;
pub use whisper::{Availability, WhisperEngine, WhisperSettings, check_availability};

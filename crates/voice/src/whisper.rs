//! Continuous dictation with sox and whisper.cpp.
//!
//! Each utterance is recorded with `rec` until the speaker pauses, written to
//! a temporary 16 kHz mono WAV, and transcribed with `whisper-cli`. Whisper
//! output is complete by construction, so every result is final.

use std::path::{Path, PathBuf};
use std::process::{Command as StdCommand, Stdio};
use tokio::io::AsyncReadExt;
use tokio::process::Command;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::engine::{EngineEvent, SpeechEngine};
use crate::error::{PERMISSION_DENIED_CODE, VoiceInputError};
use lumen_core::VoiceConfig;

/// Recording and transcription parameters
#[derive(Debug, Clone, PartialEq)]
pub struct WhisperSettings {
    pub model_path: PathBuf,
    pub language: String,
    pub silence_secs: f32,
    pub max_utterance_secs: u32,
}

impl From<&VoiceConfig> for WhisperSettings {
    fn from(config: &VoiceConfig) -> Self {
        Self {
            model_path: config.resolved_model_path(),
            language: config.language.clone(),
            silence_secs: config.silence_secs,
            max_utterance_secs: config.max_utterance_secs,
        }
    }
}

/// Result of probing for the external tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    pub available: bool,
    pub detail: String,
}

/// Check for `rec`, `whisper-cli` and the model file
pub fn check_availability(model_path: &Path) -> Availability {
    if !binary_on_path("rec") {
        return Availability { available: false, detail: "sox not found (the `rec` command is required)".to_string() };
    }

    if !binary_on_path("whisper-cli") {
        return Availability { available: false, detail: "whisper-cli not found (install whisper.cpp)".to_string() };
    }

    if !model_path.exists() {
        return Availability {
            available: false,
            detail: format!("Whisper model not found at {}", model_path.display()),
        };
    }

    Availability { available: true, detail: "Voice input ready".to_string() }
}

fn binary_on_path(name: &str) -> bool {
    StdCommand::new("which")
        .arg(name)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// [`SpeechEngine`] backed by `rec` + `whisper-cli`
pub struct WhisperEngine {
    settings: WhisperSettings,
    availability: Availability,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl WhisperEngine {
    pub fn new(settings: WhisperSettings) -> Self {
        let availability = check_availability(&settings.model_path);
        tracing::debug!(available = availability.available, detail = %availability.detail, "Probed voice tools");
        Self { settings, availability, cancel: CancellationToken::new(), task: None }
    }

    pub fn from_config(config: &VoiceConfig) -> Self {
        Self::new(WhisperSettings::from(config))
    }

    pub fn availability(&self) -> &Availability {
        &self.availability
    }

    fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl SpeechEngine for WhisperEngine {
    fn is_available(&self) -> bool {
        self.availability.available
    }

    fn start(&mut self, events: mpsc::UnboundedSender<EngineEvent>) -> Result<(), VoiceInputError> {
        if !self.is_available() || self.is_running() {
            return Err(VoiceInputError::StartFailed);
        }

        let runtime = tokio::runtime::Handle::try_current().map_err(|_| VoiceInputError::StartFailed)?;
        let workdir = tempfile::tempdir().map_err(|e| {
            tracing::warn!(error = %e, "Could not create recording directory");
            VoiceInputError::StartFailed
        })?;

        self.cancel = CancellationToken::new();
        let cancel = self.cancel.clone();
        let settings = self.settings.clone();

        self.task = Some(runtime.spawn(async move {
            let _ = events.send(EngineEvent::Started);
            recognition_loop(&settings, workdir.path(), &cancel, &events).await;
            let _ = events.send(EngineEvent::Ended);
        }));

        Ok(())
    }

    fn stop(&mut self) {
        self.cancel.cancel();
        self.task = None;
    }
}

impl Drop for WhisperEngine {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn recognition_loop(
    settings: &WhisperSettings, workdir: &Path, cancel: &CancellationToken, events: &mpsc::UnboundedSender<EngineEvent>,
) {
    let mut utterance = 0usize;

    while !cancel.is_cancelled() {
        utterance += 1;
        let wav = workdir.join(format!("utterance-{}.wav", utterance));

        match record_utterance(settings, &wav, cancel).await {
            Ok(true) => {}
            Ok(false) => return,
            Err(code) => {
                let _ = events.send(EngineEvent::Error(code));
                return;
            }
        }

        let transcript = tokio::select! {
            result = transcribe(settings, &wav) => result,
            _ = cancel.cancelled() => return,
        };
        let _ = tokio::fs::remove_file(&wav).await;

        match transcript {
            Ok(text) if !text.is_empty() => {
                tracing::debug!(chars = text.chars().count(), "Utterance transcribed");
                let _ = events.send(EngineEvent::Result { transcript: text, is_final: true });
            }
            Ok(_) => tracing::trace!("Utterance contained no speech"),
            Err(code) => {
                let _ = events.send(EngineEvent::Error(code));
                return;
            }
        }
    }
}

/// Record one utterance. `Ok(false)` means recording was cancelled.
async fn record_utterance(settings: &WhisperSettings, wav: &Path, cancel: &CancellationToken) -> Result<bool, String> {
    let silence = format!("{}", settings.silence_secs);
    let max_duration = settings.max_utterance_secs.to_string();
    let wav_arg = wav.to_string_lossy().to_string();

    let mut child = Command::new("rec")
        .args(["-q", "-r", "16000", "-c", "1", "-b", "16"])
        .arg(&wav_arg)
        .args(["silence", "1", "0.1", "3%", "1", &silence, "3%"])
        .args(["trim", "0", &max_duration])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to start rec");
            "audio-capture".to_string()
        })?;

    let mut stderr = child.stderr.take();

    let status = tokio::select! {
        status = child.wait() => status.map_err(|_| "audio-capture".to_string())?,
        _ = cancel.cancelled() => {
            let _ = child.kill().await;
            return Ok(false);
        }
    };

    if status.success() {
        return Ok(true);
    }

    let mut message = String::new();
    if let Some(stderr) = stderr.as_mut() {
        let _ = stderr.read_to_string(&mut message).await;
    }
    tracing::warn!(%status, stderr = %message.trim(), "rec exited with an error");
    Err(classify_recording_error(&message))
}

async fn transcribe(settings: &WhisperSettings, wav: &Path) -> Result<String, String> {
    let output = Command::new("whisper-cli")
        .arg("-m")
        .arg(&settings.model_path)
        .arg("-f")
        .arg(wav)
        .args(["--no-timestamps", "-l", &settings.language])
        .stdin(Stdio::null())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|e| {
            tracing::warn!(error = %e, "Failed to run whisper-cli");
            "transcription-failed".to_string()
        })?;

    if !output.status.success() {
        tracing::warn!(stderr = %String::from_utf8_lossy(&output.stderr).trim(), "whisper-cli failed");
        return Err("transcription-failed".to_string());
    }

    Ok(clean_transcript(&String::from_utf8_lossy(&output.stdout)))
}

/// Map `rec` diagnostics onto recognition error codes
fn classify_recording_error(stderr: &str) -> String {
    let lower = stderr.to_lowercase();
    if lower.contains("permission denied") || lower.contains("not permitted") {
        PERMISSION_DENIED_CODE.to_string()
    } else {
        "audio-capture".to_string()
    }
}

/// Join whisper's output lines and drop annotations like `[BLANK_AUDIO]`
fn clean_transcript(raw: &str) -> String {
    let mut text = String::new();
    let mut depth = 0usize;
    for ch in raw.chars() {
        match ch {
            '[' => depth += 1,
            ']' => depth = depth.saturating_sub(1),
            _ if depth == 0 => text.push(ch),
            _ => {}
        }
    }
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_transcript() {
        assert_eq!(clean_transcript("  Hello there.\n How are you?\n"), "Hello there. How are you?");
        assert_eq!(clean_transcript("[BLANK_AUDIO]\n"), "");
        assert_eq!(clean_transcript(" [Music] open the door "), "open the door");
    }

    #[test]
    fn test_classify_recording_error() {
        assert_eq!(classify_recording_error("rec FAIL: Permission denied"), "not-allowed");
        assert_eq!(classify_recording_error("Operation not permitted"), "not-allowed");
        assert_eq!(classify_recording_error("can't open input `default'"), "audio-capture");
    }

    #[test]
    fn test_missing_model_is_unavailable() {
        let availability = check_availability(Path::new("/nonexistent/ggml-model.bin"));
        assert!(!availability.available);
    }

    #[test]
    fn test_settings_from_config() {
        let config = VoiceConfig { language: "de".to_string(), silence_secs: 2.0, ..Default::default() };
        let settings = WhisperSettings::from(&config);
        assert_eq!(settings.language, "de");
        assert_eq!(settings.silence_secs, 2.0);
        assert_eq!(settings.max_utterance_secs, 30);
        assert!(settings.model_path.ends_with("ggml-base.en.bin"));
    }

    #[test]
    fn test_unavailable_engine_refuses_start() {
        let mut engine = WhisperEngine::new(WhisperSettings {
            model_path: PathBuf::from("/nonexistent/ggml-model.bin"),
            language: "en".to_string(),
            silence_secs: 1.5,
            max_utterance_secs: 30,
        });
        let (tx, _rx) = mpsc::unbounded_channel();

        assert!(!engine.is_available());
        assert_eq!(engine.start(tx), Err(VoiceInputError::StartFailed));
    }
}

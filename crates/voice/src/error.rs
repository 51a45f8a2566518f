use thiserror::Error;

/// Engine error code for a refused microphone
pub const PERMISSION_DENIED_CODE: &str = "not-allowed";

/// Failures surfaced to the user as a blocking alert
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoiceInputError {
    #[error(
        "Microphone access was denied. To use voice input, please enable microphone permissions for your terminal in your system settings."
    )]
    PermissionDenied,

    /// Any other engine error code
    #[error("An error occurred with voice recognition: {0}")]
    Engine(String),

    #[error("Failed to start voice recognition. It might be already active or an issue occurred.")]
    StartFailed,
}

impl VoiceInputError {
    /// Map an engine error code to the user-facing error
    pub fn from_code(code: &str) -> Self {
        match code {
            PERMISSION_DENIED_CODE => VoiceInputError::PermissionDenied,
            other => VoiceInputError::Engine(other.to_string()),
        }
    }
}

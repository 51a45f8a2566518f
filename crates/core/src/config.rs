use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;

/// Model used when the config does not name one
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Persona handed to the model as its system instruction
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = "You are a futuristic, highly intelligent AI assistant. Your personality is sleek, efficient, and insightful. Your responses are concise but informative. You are built into a beautiful, modern interface.";

/// Internal prompt for the automatic opening turn after login
pub const DEFAULT_GREETING_PROMPT: &str =
    "Generate a short, friendly, futuristic-sounding greeting to start our conversation.";

/// Delay between entering the chat view and requesting the greeting
pub const DEFAULT_GREETING_DELAY_MS: u64 = 500;

/// Environment variables consulted for the API key, in priority order
pub const API_KEY_ENV_VARS: &[&str] = &["LUMEN_API_KEY", "GEMINI_API_KEY"];

/// Default config file name, relative to the working directory
pub const DEFAULT_CONFIG_FILE: &str = "lumen.toml";

const MAX_GREETING_DELAY_MS: u64 = 10_000;

/// Provider-specific configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "provider", rename_all = "lowercase")]
pub enum ProviderConfig {
    /// Google Gemini over the public REST API
    #[serde(rename = "gemini")]
    Gemini {
        /// API key; environment variables take precedence
        #[serde(default, skip_serializing_if = "Option::is_none")]
        api_key: Option<String>,
        /// Model name (e.g., "gemini-2.5-flash")
        #[serde(default = "default_model")]
        model: String,
        /// Base URL for the API
        #[serde(default = "default_gemini_base_url")]
        base_url: String,
    },
    /// Scripted responses for offline runs and demos
    #[serde(rename = "mock")]
    Mock {
        /// TOML file with `[[responses]]` entries
        #[serde(default, skip_serializing_if = "Option::is_none")]
        responses_file: Option<PathBuf>,
    },
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Gemini { api_key: None, model: default_model(), base_url: default_gemini_base_url() }
    }
}

impl ProviderConfig {
    pub fn name(&self) -> &'static str {
        match self {
            ProviderConfig::Gemini { .. } => "gemini",
            ProviderConfig::Mock { .. } => "mock",
        }
    }

    pub fn model(&self) -> &str {
        match self {
            ProviderConfig::Gemini { model, .. } => model,
            ProviderConfig::Mock { .. } => "mock",
        }
    }

    /// Whether the provider cannot start without a credential
    pub fn requires_api_key(&self) -> bool {
        matches!(self, ProviderConfig::Gemini { .. })
    }
}

/// Persona and turn parameters for the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AssistantConfig {
    pub system_instruction: String,
    pub greeting_prompt: String,
    pub greeting_delay_ms: u64,
    /// Upper bound on reply length, forwarded to the model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_output_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            greeting_prompt: DEFAULT_GREETING_PROMPT.to_string(),
            greeting_delay_ms: DEFAULT_GREETING_DELAY_MS,
            max_output_tokens: Some(8192),
            temperature: None,
        }
    }
}

impl AssistantConfig {
    pub fn greeting_delay(&self) -> Duration {
        Duration::from_millis(self.greeting_delay_ms)
    }
}

/// Voice dictation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VoiceConfig {
    /// Hide the microphone control entirely when false
    pub enabled: bool,
    /// Whisper language code
    pub language: String,
    /// Path to the whisper.cpp model (`~/` is expanded)
    pub model_path: PathBuf,
    /// Trailing silence that ends an utterance
    pub silence_secs: f32,
    /// Hard cap on a single utterance recording
    pub max_utterance_secs: u32,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            language: "en".to_string(),
            model_path: PathBuf::from("~/.lumen/models/ggml-base.en.bin"),
            silence_secs: 1.5,
            max_utterance_secs: 30,
        }
    }
}

impl VoiceConfig {
    /// Model path with a leading `~/` resolved against the home directory
    pub fn resolved_model_path(&self) -> PathBuf {
        expand_home(&self.model_path)
    }
}

/// File logging settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: true, level: "debug".to_string() }
    }
}

/// How message content may appear in logs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PrivacySettings {
    /// "none", "truncate" or "full"
    pub log_content: String,
    pub truncate_length: usize,
}

impl Default for PrivacySettings {
    fn default() -> Self {
        Self { log_content: "truncate".to_string(), truncate_length: 200 }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    pub format: String,
    pub file: FileLoggingConfig,
    pub privacy: PrivacySettings,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            file: FileLoggingConfig::default(),
            privacy: PrivacySettings::default(),
        }
    }
}

/// Root configuration structure for lumen.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub provider: ProviderConfig,
    pub assistant: AssistantConfig,
    pub voice: VoiceConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str).map_err(ConfigError::from)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Load configuration from a file, falling back to defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            tracing::debug!(path = %path.display(), "loading config");
            Self::from_file(path)
        } else {
            tracing::debug!(path = %path.display(), "config not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Resolve the API key from the environment, then the config file
    pub fn api_key(&self) -> std::result::Result<String, ConfigError> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// Credential lookup with an injectable environment
    pub fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> std::result::Result<String, ConfigError> {
        let from_env = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| env(name))
            .find(|value| !value.trim().is_empty());

        if let Some(key) = from_env {
            return Ok(key.trim().to_string());
        }

        match &self.provider {
            ProviderConfig::Gemini { api_key: Some(key), .. } if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::MissingApiKey),
        }
    }

    /// Whether the chat view may be entered with this configuration
    pub fn has_credential(&self) -> bool {
        !self.provider.requires_api_key() || self.api_key().is_ok()
    }

    fn validate(&self) -> Result<()> {
        if let ProviderConfig::Gemini { model, base_url, .. } = &self.provider {
            if model.trim().is_empty() {
                return Err(ConfigError::InvalidValue { field: "provider.model", reason: "must not be empty" }.into());
            }
            if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
                return Err(
                    ConfigError::InvalidValue { field: "provider.base_url", reason: "must be an http(s) URL" }.into(),
                );
            }
        }

        if self.assistant.greeting_delay_ms > MAX_GREETING_DELAY_MS {
            return Err(ConfigError::InvalidValue {
                field: "assistant.greeting_delay_ms",
                reason: "must be at most 10000",
            }
            .into());
        }

        if self.assistant.max_output_tokens == Some(0) {
            return Err(ConfigError::InvalidValue {
                field: "assistant.max_output_tokens",
                reason: "must be greater than zero",
            }
            .into());
        }

        if self.voice.silence_secs <= 0.0 {
            return Err(
                ConfigError::InvalidValue { field: "voice.silence_secs", reason: "must be greater than zero" }.into(),
            );
        }

        if self.voice.max_utterance_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "voice.max_utterance_secs",
                reason: "must be greater than zero",
            }
            .into());
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# Lumen configuration
# Every section is optional; missing values fall back to the defaults shown.

[provider]
# Provider type: "gemini" or "mock"
provider = "gemini"
model = "gemini-2.5-flash"
# The API key is read from LUMEN_API_KEY or GEMINI_API_KEY first.
# api_key = "your-api-key-here"
# base_url = "https://generativelanguage.googleapis.com/v1beta"

[assistant]
greeting_delay_ms = 500
max_output_tokens = 8192
# temperature = 0.7
# system_instruction = "..."
# greeting_prompt = "..."

[voice]
# Requires sox (`rec`) and whisper-cli on PATH
enabled = true
language = "en"
model_path = "~/.lumen/models/ggml-base.en.bin"
silence_secs = 1.5
max_utterance_secs = 30

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = true
level = "debug"

[logging.privacy]
# "none", "truncate" or "full"
log_content = "truncate"
truncate_length = 200
"#
    }
}

/// Base directory for Lumen's own files (`~/.lumen`)
pub fn lumen_home() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")).join(".lumen")
}

/// Expand a leading `~/` against the home directory
pub fn expand_home(path: &Path) -> PathBuf {
    match (path.strip_prefix("~"), dirs::home_dir()) {
        (Ok(rest), Some(home)) => home.join(rest),
        _ => path.to_path_buf(),
    }
}

/// Configuration-specific errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// No credential for a provider that needs one
    #[error(
        "API Key is missing. Please set the LUMEN_API_KEY environment variable or provider.api_key in lumen.toml."
    )]
    MissingApiKey,

    /// A value failed validation
    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: &'static str },

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

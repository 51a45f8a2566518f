pub mod config;
pub mod error;
pub mod logging;

pub use config::{
    AssistantConfig, Config, ConfigError, FileLoggingConfig, PrivacySettings, ProviderConfig, VoiceConfig,
};
pub use error::{Error, Result};
